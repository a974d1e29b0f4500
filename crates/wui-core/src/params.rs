use serde::{Deserialize, Serialize};

use crate::error::{Result, WuiError};

/// Pixels within the 500 m analysis radius at 10 m resolution.
pub const PIXELS_IN_500M_RADIUS: u32 = 7845;

/// What to do with pixels whose density or vegetation inputs are not finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoDataPolicy {
    /// Run the rule chain anyway. NaN fails every comparison, so such pixels
    /// fall through to the catch-all class.
    #[default]
    Ignore,
    /// Emit the output no-data code (255) before the water override.
    MarkNonFinite,
}

/// Classification thresholds. Defaults reproduce the 500 m / 10 m reference
/// deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Building density (%) above which a pixel counts as built.
    pub building_density: f32,
    /// Building density (%) above which a pixel counts as dense built-up.
    pub dense_building_density: f32,
    /// Wildland vegetation pixel count above which cover exceeds 50%.
    pub vegetation_pixels: f32,
    /// High vegetation is impossible at or above this building density (%).
    pub max_building_for_vegetation: f32,
    /// Water cover (%) above which a pixel is water.
    pub water_fraction: f32,
    pub landcover_water_code: u16,
    pub landcover_nodata_code: u16,
    pub nodata_policy: NoDataPolicy,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            building_density: 0.5,
            dense_building_density: 15.0,
            vegetation_pixels: (PIXELS_IN_500M_RADIUS / 2) as f32,
            max_building_for_vegetation: 50.0,
            water_fraction: 20.0,
            landcover_water_code: 80,
            landcover_nodata_code: 255,
            nodata_policy: NoDataPolicy::Ignore,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        let percentages = [
            ("building_density", self.building_density),
            ("dense_building_density", self.dense_building_density),
            ("max_building_for_vegetation", self.max_building_for_vegetation),
            ("water_fraction", self.water_fraction),
        ];
        for (name, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(WuiError::InvalidThreshold {
                    name,
                    value: f64::from(value),
                    reason: "must be a percentage in [0, 100]",
                });
            }
        }
        if !self.vegetation_pixels.is_finite() || self.vegetation_pixels < 0.0 {
            return Err(WuiError::InvalidThreshold {
                name: "vegetation_pixels",
                value: f64::from(self.vegetation_pixels),
                reason: "must be a finite, non-negative pixel count",
            });
        }
        if self.dense_building_density < self.building_density {
            return Err(WuiError::InvalidThreshold {
                name: "dense_building_density",
                value: f64::from(self.dense_building_density),
                reason: "must not be below building_density",
            });
        }
        Ok(())
    }
}

/// Largest analysis radius, in pixels, accepted by [`pixels_in_radius`].
pub const MAX_RADIUS_PX: f64 = 100_000.0;

/// Count of pixels whose centre lies within `radius_px` of a pixel centre,
/// i.e. integer offsets (i, j) with i² + j² ≤ r².
///
/// Counts one column span per row, so the cost is linear in the radius.
pub fn pixels_in_radius(radius_px: f64) -> Result<u64> {
    if !(radius_px.is_finite() && (0.0..=MAX_RADIUS_PX).contains(&radius_px)) {
        return Err(WuiError::InvalidThreshold {
            name: "radius_px",
            value: radius_px,
            reason: "must be within [0, 100000] pixels",
        });
    }
    let r2 = radius_px * radius_px;
    let reach = radius_px.floor() as i64;
    let count = (-reach..=reach)
        .map(|i| {
            let rest = r2 - (i * i) as f64;
            // sqrt may land one off an exact square; settle on the integer bound.
            let mut half = rest.sqrt().floor() as i64;
            while (((half + 1) * (half + 1)) as f64) <= rest {
                half += 1;
            }
            while half > 0 && ((half * half) as f64) > rest {
                half -= 1;
            }
            (2 * half + 1) as u64
        })
        .sum();
    Ok(count)
}

/// Vegetation threshold for a circular analysis window: half of the pixel
/// count inside the radius, rounded down.
///
/// 500 m at 10 m resolution gives 7845 pixels and a threshold of 3922.
pub fn vegetation_threshold(radius_m: f64, resolution_m: f64) -> Result<f32> {
    if !(resolution_m.is_finite() && resolution_m > 0.0) {
        return Err(WuiError::InvalidThreshold {
            name: "resolution_m",
            value: resolution_m,
            reason: "must be positive",
        });
    }
    if !(radius_m.is_finite() && radius_m >= 0.0) {
        return Err(WuiError::InvalidThreshold {
            name: "radius_m",
            value: radius_m,
            reason: "must be non-negative",
        });
    }
    Ok((pixels_in_radius(radius_m / resolution_m)? / 2) as f32)
}
