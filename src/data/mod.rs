/// Data layer: core types, loading, filtering and derived numbers.
///
/// Architecture:
/// ```text
///  example / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ SalaryDataset │  schema check, numeric coercion
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  department selection + sort order → view records
///   └──────────┘
///        │
///        ├──▶ summary   (mean / min / max of the view)
///        └──▶ simulate  (triangular samples per department)
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod simulate;
pub mod summary;
