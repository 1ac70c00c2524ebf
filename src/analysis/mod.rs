//! Dataset combination, 2D reshaping, interpolation and matching.

pub mod dataset;
pub mod grid;
pub mod interp;
pub mod matching;
pub mod optimize;
pub mod zt_max;
