/// Data layer: core types, type inference, loading, filtering and export.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode file → Dataset (cells resolved to CellValue)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Row>, ordered column list
///   └──────────┘
///        │
///        ├──────────────► types   → ColumnTypeMap
///        ▼
///   ┌──────────┐
///   │  filter   │  column predicates + search → filtered indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  filtered rows → .csv / .json
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod types;
