//! Thermoelectric figure-of-merit workflow.
//!
//! Reads AMSET electronic transport and Phono3py lattice thermal
//! conductivity tables, combines them into ZT datasets, reshapes tables onto
//! (n, T) grids and matches calculated surfaces against experimental data.

pub mod analysis;
pub mod color;
pub mod data;
pub mod error;

pub use analysis::dataset::{zt_dataset_from_data, zt_dataset_from_files};
pub use analysis::grid::{dataset_to_2d, Grid2d};
pub use analysis::matching::{match_data, MatchMode, MatchResult, MatchTarget, Matcher};
pub use analysis::zt_max::{get_zt_max, ZtMaxRecord};
pub use data::filter::RowBounds;
pub use data::model::Table;
pub use error::{Result, ZtError};
