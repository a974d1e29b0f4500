//! Per-class pixel counts of a classified tile.
use serde::{Deserialize, Serialize};

use crate::class::{WuiClass, OUTPUT_NODATA};
use crate::grid::ClassGrid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSummary {
    /// Pixel count for codes 0..=8, indexed by code.
    pub counts: [u64; 9],
    pub nodata: u64,
    /// Codes outside 0..=8 that are not the no-data value.
    pub invalid: u64,
    pub total: u64,
}

impl ClassSummary {
    pub fn from_grid(grid: &ClassGrid) -> Self {
        let mut counts = [0u64; 9];
        let mut nodata = 0u64;
        let mut invalid = 0u64;
        for &code in &grid.data {
            match code {
                0..=8 => counts[code as usize] += 1,
                OUTPUT_NODATA => nodata += 1,
                _ => invalid += 1,
            }
        }
        Self {
            counts,
            nodata,
            invalid,
            total: grid.data.len() as u64,
        }
    }

    pub fn count(&self, class: WuiClass) -> u64 {
        self.counts[class.code() as usize]
    }

    /// Pixels in the four WUI classes.
    pub fn wui_pixels(&self) -> u64 {
        WuiClass::ALL.iter().filter(|c| c.is_wui()).map(|&c| self.count(c)).sum()
    }

    /// WUI share of classified land pixels (excludes water and no-data).
    /// 0.0 when there is no land.
    pub fn wui_fraction(&self) -> f64 {
        let land = self.total - self.count(WuiClass::Water) - self.nodata - self.invalid;
        if land == 0 {
            return 0.0;
        }
        self.wui_pixels() as f64 / land as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_code() {
        let grid = ClassGrid {
            data: vec![0, 1, 1, 2, 4, 7, 8, 8, 255, 42],
            width: 5,
            height: 2,
        };
        let s = ClassSummary::from_grid(&grid);
        assert_eq!(s.count(WuiClass::IntermixForest), 2);
        assert_eq!(s.count(WuiClass::Other), 2);
        assert_eq!(s.nodata, 1);
        assert_eq!(s.invalid, 1);
        assert_eq!(s.total, 10);
        assert_eq!(s.wui_pixels(), 4);
        // 10 total - 1 water - 1 nodata - 1 invalid = 7 land pixels.
        assert!((s.wui_fraction() - 4.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn all_water_has_zero_fraction() {
        let grid = ClassGrid::zeroed(3, 3);
        let s = ClassSummary::from_grid(&grid);
        assert_eq!(s.count(WuiClass::Water), 9);
        assert_eq!(s.wui_fraction(), 0.0);
    }
}
