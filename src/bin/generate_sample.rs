use anyhow::{Context, Result};

const REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const PRODUCTS: [(&str, f64); 5] = [
    ("Widget", 4.5),
    ("Gadget", 12.0),
    ("Gizmo", 7.25),
    ("Doohickey", 2.0),
    ("Thingamajig", 19.99),
];
const ROWS: usize = 240;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_sales.csv".to_string());
    let mut rng = SimpleRng::new(42);

    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;
    writer
        .write_record(["region", "product", "units", "price", "revenue"])
        .context("writing header")?;

    let mut blanks = 0usize;
    let mut outliers = 0usize;
    for i in 0..ROWS {
        let region = REGIONS[rng.below(REGIONS.len())];
        let (product, base_price) = PRODUCTS[rng.below(PRODUCTS.len())];

        let mut units = rng.gauss(40.0, 8.0).round().max(1.0);
        // A handful of bulk orders far outside the usual spread.
        if rng.next_f64() < 0.03 {
            units *= 12.0;
            outliers += 1;
        }
        let price = (base_price * rng.gauss(1.0, 0.05) * 100.0).round() / 100.0;
        let revenue = (units * price * 100.0).round() / 100.0;

        let mut fields = [
            region.to_string(),
            product.to_string(),
            units.to_string(),
            format!("{price:.2}"),
            format!("{revenue:.2}"),
        ];
        // Blank out some cells so the missing-value checks have work to do.
        if rng.next_f64() < 0.05 {
            let col = rng.below(fields.len());
            fields[col].clear();
            blanks += 1;
        }
        writer
            .write_record(&fields)
            .with_context(|| format!("writing row {i}"))?;
    }
    writer.flush().context("flushing CSV")?;

    log::info!("{blanks} blank cells, {outliers} bulk orders");
    println!("Wrote {ROWS} rows to {output_path}");
    Ok(())
}
