//! Wildland-Urban Interface classification of co-registered raster tiles.
//!
//! The classifier is a pure function of seven aligned input layers and a set
//! of [`Thresholds`]. Raster I/O lives in the `wui-mapper` tool.
pub mod class;
pub mod classify;
pub mod error;
pub mod grid;
pub mod params;
pub mod summary;
pub mod tile;

pub use class::{WuiClass, OUTPUT_NODATA};
pub use classify::{classify, classify_into, classify_pixel, explain_pixel, WuiInputs};
pub use error::{Result, WuiError};
pub use grid::{ClassGrid, Grid};
pub use params::{vegetation_threshold, NoDataPolicy, Thresholds};
pub use summary::ClassSummary;
pub use tile::{Layer, Region, TileId, TileLayout};
