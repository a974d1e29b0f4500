//! Whole-grid WUI classification.
//!
//! Every pixel depends only on the co-located cells of the input layers, so
//! rows are independent. With the `threading` feature rows are evaluated in
//! parallel; the result is identical to the sequential path.
pub mod predicates;
pub mod rules;

use crate::error::{Result, WuiError};
use crate::grid::{ClassGrid, Grid};
use crate::params::Thresholds;
use crate::tile::Layer;

pub use predicates::{PixelInputs, Predicates};
pub use rules::{classify_pixel, explain_pixel, RuleTrace};

/// The seven co-registered input layers of one tile.
///
/// Only constructible through [`WuiInputs::new`], which checks that every
/// layer has the building-density layer's shape.
#[derive(Debug, Clone, Copy)]
pub struct WuiInputs<'a> {
    building_density: &'a Grid,
    wild_vegetation: &'a Grid,
    fsw_vegetation: &'a Grid,
    water: &'a Grid,
    land_cover: &'a Grid,
    buffered_vegetation: &'a Grid,
    buffered_fsw_vegetation: &'a Grid,
}

impl<'a> WuiInputs<'a> {
    pub fn new(
        building_density: &'a Grid,
        wild_vegetation: &'a Grid,
        fsw_vegetation: &'a Grid,
        water: &'a Grid,
        land_cover: &'a Grid,
        buffered_vegetation: &'a Grid,
        buffered_fsw_vegetation: &'a Grid,
    ) -> Result<Self> {
        let inputs = Self {
            building_density,
            wild_vegetation,
            fsw_vegetation,
            water,
            land_cover,
            buffered_vegetation,
            buffered_fsw_vegetation,
        };
        let expected = building_density.shape();
        for (layer, grid) in inputs.layers() {
            if grid.shape() != expected || grid.len() != expected.0 * expected.1 {
                return Err(WuiError::ShapeMismatch {
                    layer,
                    expected,
                    found: grid.shape(),
                });
            }
        }
        Ok(inputs)
    }

    pub fn layers(&self) -> [(Layer, &'a Grid); 7] {
        [
            (Layer::BuildingDensity, self.building_density),
            (Layer::WildVegetation, self.wild_vegetation),
            (Layer::FswVegetation, self.fsw_vegetation),
            (Layer::Water, self.water),
            (Layer::LandCover, self.land_cover),
            (Layer::BufferedVegetation, self.buffered_vegetation),
            (Layer::BufferedFswVegetation, self.buffered_fsw_vegetation),
        ]
    }

    /// (width, height)
    pub fn shape(&self) -> (usize, usize) {
        self.building_density.shape()
    }

    #[inline]
    pub fn pixel(&self, idx: usize) -> PixelInputs {
        PixelInputs {
            building_density: self.building_density.data[idx],
            wild_vegetation: self.wild_vegetation.data[idx],
            fsw_vegetation: self.fsw_vegetation.data[idx],
            buffered_vegetation: self.buffered_vegetation.data[idx],
            buffered_fsw_vegetation: self.buffered_fsw_vegetation.data[idx],
            water: self.water.data[idx],
            land_cover: self.land_cover.data[idx],
        }
    }
}

/// Classify every pixel of a tile into a fresh output grid.
pub fn classify(inputs: &WuiInputs<'_>, thresholds: &Thresholds) -> ClassGrid {
    let (width, height) = inputs.shape();
    let mut out = ClassGrid::zeroed(width, height);
    classify_into(inputs, thresholds, &mut out);
    out
}

/// Classify into a caller-owned grid, reshaping and resetting it first so an
/// allocation can be reused across tiles.
pub fn classify_into(inputs: &WuiInputs<'_>, thresholds: &Thresholds, out: &mut ClassGrid) {
    let (width, height) = inputs.shape();
    out.width = width;
    out.height = height;
    out.data.clear();
    out.data.resize(width * height, 0);
    if out.data.is_empty() {
        return;
    }

    log::debug!("classifying {width}x{height} grid");
    fill_rows(inputs, thresholds, width, &mut out.data);
}

#[cfg(feature = "threading")]
fn fill_rows(inputs: &WuiInputs<'_>, thresholds: &Thresholds, width: usize, data: &mut [u8]) {
    use rayon::prelude::*;
    data.par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, cells)| classify_row(inputs, thresholds, row, cells));
}

#[cfg(not(feature = "threading"))]
fn fill_rows(inputs: &WuiInputs<'_>, thresholds: &Thresholds, width: usize, data: &mut [u8]) {
    for (row, cells) in data.chunks_mut(width).enumerate() {
        classify_row(inputs, thresholds, row, cells);
    }
}

fn classify_row(inputs: &WuiInputs<'_>, thresholds: &Thresholds, row: usize, cells: &mut [u8]) {
    let base = row * cells.len();
    for (col, cell) in cells.iter_mut().enumerate() {
        *cell = classify_pixel(&inputs.pixel(base + col), thresholds);
    }
}
