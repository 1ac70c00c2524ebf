/// Data layer: table type, loading, schemas and row filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  schema   │  rename headers, check allow-list
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  sources  │  AMSET checks + unit fixes, Phono3py kappa / CRTA
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  n / t bounds → row indices
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
pub mod sources;
