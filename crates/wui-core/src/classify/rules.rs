//! The ordered rule chain for a single pixel.
//!
//! Rules are applied as successive overwrites of one class code, in this order:
//!
//! | step | rule                                             | writes |
//! |------|--------------------------------------------------|--------|
//! | 1    | intermix, FSW / grass dominant                   | 1 / 3  |
//! | 2    | interface                                        | 2      |
//! | 3    | interface reached only through a grassland patch | 4      |
//! | 4    | intermix on dense built-up                       | 7      |
//! | 5    | dense intermix next to a wildland patch          | 2      |
//! | 6    | same, reached only through a grassland patch     | 4      |
//! | 7    | still unset: 5 / 6 / 7 / 8 by first match       |        |
//! | 8    | water or land-cover water/no-data                | 0      |
//!
//! A later step wins for any pixel several steps select. Step 8 always wins.
use crate::class::{WuiClass, OUTPUT_NODATA};
use crate::params::{NoDataPolicy, Thresholds};

use super::predicates::{PixelInputs, Predicates};

/// Which steps matched for one pixel, and the resulting code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleTrace {
    pub predicates: Predicates,
    pub intermix: bool,
    pub interface: bool,
    pub grass_interface: bool,
    pub urban_intermix: bool,
    pub urban_interface: bool,
    pub urban_grass_interface: bool,
    /// Non-WUI class chosen in step 7, if the pixel was still unset.
    pub non_wui: Option<WuiClass>,
    pub marked_nodata: bool,
    pub water_override: bool,
    pub class: u8,
}

/// Run the whole rule chain for one pixel and record every step.
#[inline]
pub fn explain_pixel(p: &PixelInputs, t: &Thresholds) -> RuleTrace {
    let pred = Predicates::evaluate(p, t);

    let intermix = pred.intermix();
    let interface = pred.interface();
    let grass_interface = pred.grass_interface();
    let urban_intermix = pred.urban_intermix();
    let urban_interface = pred.urban_interface();
    let urban_grass_interface = pred.urban_grass_interface();

    let mut class = 0u8;
    // A NaN vegetation share makes neither dominance hold; such a pixel
    // stays unset here and falls through to step 7.
    if intermix && pred.dominant_fsw {
        class = WuiClass::IntermixForest.code();
    }
    if intermix && pred.dominant_grass {
        class = WuiClass::IntermixGrass.code();
    }
    if interface {
        class = WuiClass::InterfaceForest.code();
    }
    if grass_interface {
        class = WuiClass::InterfaceGrass.code();
    }
    if urban_intermix {
        class = WuiClass::BuiltUp.code();
    }
    if urban_interface {
        class = WuiClass::InterfaceForest.code();
    }
    if urban_grass_interface {
        class = WuiClass::InterfaceGrass.code();
    }

    let mut non_wui = None;
    if class == 0 {
        let fallback = if pred.high_wild_veg && pred.dominant_fsw {
            WuiClass::WildlandForest
        } else if pred.high_wild_veg && pred.dominant_grass {
            WuiClass::WildlandGrass
        } else if pred.is_dense_built {
            WuiClass::BuiltUp
        } else {
            WuiClass::Other
        };
        class = fallback.code();
        non_wui = Some(fallback);
    }

    let marked_nodata = t.nodata_policy == NoDataPolicy::MarkNonFinite && p.has_non_finite();
    if marked_nodata {
        class = OUTPUT_NODATA;
    }

    if pred.is_water {
        class = WuiClass::Water.code();
    }

    RuleTrace {
        predicates: pred,
        intermix,
        interface,
        grass_interface,
        urban_intermix,
        urban_interface,
        urban_grass_interface,
        non_wui,
        marked_nodata,
        water_override: pred.is_water,
        class,
    }
}

#[inline]
pub fn classify_pixel(p: &PixelInputs, t: &Thresholds) -> u8 {
    explain_pixel(p, t).class
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PixelInputs {
        PixelInputs {
            building_density: 10.0,
            wild_vegetation: 5000.0,
            fsw_vegetation: 5000.0,
            buffered_vegetation: 0.0,
            buffered_fsw_vegetation: 0.0,
            water: 0.0,
            land_cover: 1.0,
        }
    }

    fn class_of(p: PixelInputs) -> u8 {
        classify_pixel(&p, &Thresholds::default())
    }

    #[test]
    fn fsw_intermix() {
        assert_eq!(class_of(base()), 1);
    }

    #[test]
    fn interface_through_fsw_buffer() {
        let p = PixelInputs {
            wild_vegetation: 2000.0,
            fsw_vegetation: 2000.0,
            buffered_vegetation: 1.0,
            buffered_fsw_vegetation: 1.0,
            ..base()
        };
        assert_eq!(class_of(p), 2);
    }

    #[test]
    fn interface_only_through_grass_buffer() {
        let p = PixelInputs {
            wild_vegetation: 2000.0,
            fsw_vegetation: 2000.0,
            buffered_vegetation: 1.0,
            buffered_fsw_vegetation: 0.0,
            ..base()
        };
        assert_eq!(class_of(p), 4);
    }

    #[test]
    fn dense_grass_intermix_becomes_built_up() {
        let p = PixelInputs {
            building_density: 20.0,
            fsw_vegetation: 2000.0,
            ..base()
        };
        let trace = explain_pixel(&p, &Thresholds::default());
        assert!(trace.intermix && trace.predicates.dominant_grass);
        assert!(trace.urban_intermix);
        assert!(!trace.urban_interface);
        assert_eq!(trace.class, 7);
        assert_eq!(trace.non_wui, None);
    }

    #[test]
    fn water_overrides_intermix() {
        let p = PixelInputs { water: 25.0, ..base() };
        let trace = explain_pixel(&p, &Thresholds::default());
        assert!(trace.intermix);
        assert!(trace.water_override);
        assert_eq!(trace.class, 0);
    }

    #[test]
    fn grass_intermix_without_dense_buildings() {
        let p = PixelInputs { fsw_vegetation: 2000.0, ..base() };
        assert_eq!(class_of(p), 3);
    }

    #[test]
    fn dense_intermix_near_patch_reverts_to_interface() {
        let near_fsw = PixelInputs {
            building_density: 20.0,
            buffered_vegetation: 1.0,
            buffered_fsw_vegetation: 1.0,
            ..base()
        };
        assert_eq!(class_of(near_fsw), 2);

        let near_grass_only = PixelInputs {
            buffered_fsw_vegetation: 0.0,
            ..near_fsw
        };
        let trace = explain_pixel(&near_grass_only, &Thresholds::default());
        assert!(trace.urban_grass_interface);
        assert!(!trace.predicates.low_wild_veg);
        assert_eq!(trace.class, 4);
    }

    #[test]
    fn non_wui_fallbacks() {
        let green = PixelInputs { building_density: 0.0, ..base() };
        assert_eq!(class_of(green), 5);

        let yellow = PixelInputs { building_density: 0.0, fsw_vegetation: 1000.0, ..base() };
        assert_eq!(class_of(yellow), 6);

        // Density at the guard: no high vegetation, dense, not near a patch.
        let red = PixelInputs { building_density: 60.0, ..base() };
        assert_eq!(class_of(red), 7);

        let grey = PixelInputs { building_density: 0.0, wild_vegetation: 100.0, fsw_vegetation: 50.0, ..base() };
        assert_eq!(class_of(grey), 8);
    }

    #[test]
    fn sparse_built_far_from_patches_is_other() {
        let p = PixelInputs { building_density: 5.0, wild_vegetation: 1000.0, fsw_vegetation: 500.0, ..base() };
        let trace = explain_pixel(&p, &Thresholds::default());
        assert!(trace.predicates.is_built);
        assert_eq!(trace.non_wui, Some(WuiClass::Other));
        assert_eq!(trace.class, 8);
    }

    #[test]
    fn interface_needs_buffer_even_near_fsw() {
        // FSW buffer set but the general buffer unset: not an interface.
        let p = PixelInputs {
            wild_vegetation: 2000.0,
            buffered_vegetation: 0.0,
            buffered_fsw_vegetation: 1.0,
            ..base()
        };
        assert_eq!(class_of(p), 8);
    }

    #[test]
    fn landcover_sentinels_force_water() {
        assert_eq!(class_of(PixelInputs { land_cover: 80.0, ..base() }), 0);
        assert_eq!(class_of(PixelInputs { land_cover: 255.0, ..base() }), 0);
        assert_eq!(class_of(PixelInputs { land_cover: 50.0, ..base() }), 1);
    }

    #[test]
    fn nodata_policy_marks_non_finite_but_water_still_wins() {
        let t = Thresholds { nodata_policy: NoDataPolicy::MarkNonFinite, ..Thresholds::default() };
        let nan = PixelInputs { wild_vegetation: f32::NAN, ..base() };
        assert_eq!(classify_pixel(&nan, &t), OUTPUT_NODATA);
        assert_eq!(classify_pixel(&PixelInputs { water: 90.0, ..nan }, &t), 0);

        // Default policy: NaN vegetation is neither high nor low, built pixel falls through.
        assert_eq!(classify_pixel(&nan, &Thresholds::default()), 8);
    }

    #[test]
    fn nan_fsw_share_skips_intermix_codes() {
        let p = PixelInputs { fsw_vegetation: f32::NAN, ..base() };
        let trace = explain_pixel(&p, &Thresholds::default());
        assert!(trace.intermix);
        assert_eq!(trace.non_wui, Some(WuiClass::Other));
        assert_eq!(trace.class, 8);
    }
}
