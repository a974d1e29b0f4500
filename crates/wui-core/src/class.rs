use serde::{Deserialize, Serialize};

/// Declared no-data value of the output raster. No rule emits it unless
/// `NoDataPolicy::MarkNonFinite` is selected.
pub const OUTPUT_NODATA: u8 = 255;

/// The nine output classes. Discriminants are the raster codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum WuiClass {
    Water = 0,
    IntermixForest = 1,
    InterfaceForest = 2,
    IntermixGrass = 3,
    InterfaceGrass = 4,
    WildlandForest = 5,
    WildlandGrass = 6,
    BuiltUp = 7,
    Other = 8,
}

impl WuiClass {
    pub const ALL: [WuiClass; 9] = [
        WuiClass::Water,
        WuiClass::IntermixForest,
        WuiClass::InterfaceForest,
        WuiClass::IntermixGrass,
        WuiClass::InterfaceGrass,
        WuiClass::WildlandForest,
        WuiClass::WildlandGrass,
        WuiClass::BuiltUp,
        WuiClass::Other,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// True for the four WUI classes (intermix and interface, both dominances).
    pub fn is_wui(self) -> bool {
        matches!(
            self,
            WuiClass::IntermixForest
                | WuiClass::InterfaceForest
                | WuiClass::IntermixGrass
                | WuiClass::InterfaceGrass
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            WuiClass::Water => "water",
            WuiClass::IntermixForest => "WUI intermix (forest/shrubland/wetland)",
            WuiClass::InterfaceForest => "WUI interface (forest/shrubland/wetland)",
            WuiClass::IntermixGrass => "WUI intermix (grassland)",
            WuiClass::InterfaceGrass => "WUI interface (grassland)",
            WuiClass::WildlandForest => "non-WUI wildland vegetation (forest/shrubland/wetland)",
            WuiClass::WildlandGrass => "non-WUI wildland vegetation (grassland)",
            WuiClass::BuiltUp => "non-WUI dense built-up",
            WuiClass::Other => "non-WUI other land cover",
        }
    }
}
