//! Per-pixel boolean predicates the rule chain is built from.
use crate::params::Thresholds;

/// Co-located input values for one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelInputs {
    /// Built-up area (%) within the analysis radius.
    pub building_density: f32,
    /// Wildland vegetation pixel count (all types) within the radius.
    pub wild_vegetation: f32,
    /// Forest/shrubland/wetland pixel count within the radius.
    pub fsw_vegetation: f32,
    /// 1 inside the buffer of a large wildland patch.
    pub buffered_vegetation: f32,
    /// 1 inside the buffer of a large FSW patch.
    pub buffered_fsw_vegetation: f32,
    /// Water cover (%).
    pub water: f32,
    pub land_cover: f32,
}

impl PixelInputs {
    /// Grassland share of the wildland count.
    #[inline]
    pub fn grass_vegetation(&self) -> f32 {
        self.wild_vegetation - self.fsw_vegetation
    }

    /// True when any density, vegetation or buffer input is NaN or infinite.
    pub fn has_non_finite(&self) -> bool {
        [
            self.building_density,
            self.wild_vegetation,
            self.fsw_vegetation,
            self.buffered_vegetation,
            self.buffered_fsw_vegetation,
        ]
        .iter()
        .any(|v| !v.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Predicates {
    pub is_built: bool,
    pub is_dense_built: bool,
    /// Vegetation cover above half the window and building density below the
    /// guard. Both cannot exceed half of the same footprint.
    pub high_wild_veg: bool,
    pub low_wild_veg: bool,
    pub near_wild_patch: bool,
    /// The FSW buffer does not reach this pixel, so any patch proximity comes
    /// from grassland.
    pub near_only_via_grass: bool,
    pub dominant_fsw: bool,
    pub dominant_grass: bool,
    pub is_water: bool,
}

impl Predicates {
    #[inline]
    pub fn evaluate(p: &PixelInputs, t: &Thresholds) -> Self {
        let grass = p.grass_vegetation();
        Self {
            is_built: p.building_density > t.building_density,
            is_dense_built: p.building_density > t.dense_building_density,
            high_wild_veg: p.wild_vegetation > t.vegetation_pixels
                && p.building_density < t.max_building_for_vegetation,
            low_wild_veg: p.wild_vegetation <= t.vegetation_pixels,
            near_wild_patch: p.buffered_vegetation == 1.0,
            near_only_via_grass: p.buffered_fsw_vegetation == 0.0,
            dominant_fsw: grass <= p.fsw_vegetation,
            dominant_grass: grass > p.fsw_vegetation,
            is_water: p.water > t.water_fraction
                || p.land_cover == f32::from(t.landcover_water_code)
                || p.land_cover == f32::from(t.landcover_nodata_code),
        }
    }

    #[inline]
    pub fn intermix(&self) -> bool {
        self.is_built && self.high_wild_veg
    }

    #[inline]
    pub fn interface(&self) -> bool {
        self.is_built && self.low_wild_veg && self.near_wild_patch
    }

    #[inline]
    pub fn grass_interface(&self) -> bool {
        self.interface() && self.near_only_via_grass
    }

    #[inline]
    pub fn urban_intermix(&self) -> bool {
        self.intermix() && self.is_dense_built
    }

    #[inline]
    pub fn urban_interface(&self) -> bool {
        self.is_built && self.urban_intermix() && self.near_wild_patch
    }

    #[inline]
    pub fn urban_grass_interface(&self) -> bool {
        self.urban_interface() && self.near_only_via_grass
    }
}
