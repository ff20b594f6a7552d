/// Data layer: CSV loading and cell decoding.
///
/// Architecture:
/// ```text
///  data/*.csv, final_data/StartTimes.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read CSV, pick a decoding per column
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  literal  │  "(0.1, 2.0, 3.5)" → Literal::Tuple
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  Table: index, columns, rows of Literal
///   └──────────┘
/// ```

pub mod literal;
pub mod loader;
pub mod model;
