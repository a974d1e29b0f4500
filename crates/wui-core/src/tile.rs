//! EQUI7 region/tile addressing and the on-disk layout of per-tile layers.
//! Path construction only; nothing here touches the filesystem.
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WuiError;

/// EQUI7 continental sub-grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    AF,
    AS,
    EU,
    NA,
    OC,
    SA,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::AF => "AF",
            Region::AS => "AS",
            Region::EU => "EU",
            Region::NA => "NA",
            Region::OC => "OC",
            Region::SA => "SA",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = WuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match first_token(s) {
            "AF" => Ok(Region::AF),
            "AS" => Ok(Region::AS),
            "EU" => Ok(Region::EU),
            "NA" => Ok(Region::NA),
            "OC" => Ok(Region::OC),
            "SA" => Ok(Region::SA),
            other => Err(WuiError::InvalidRegion(other.to_string())),
        }
    }
}

/// EQUI7 tile code, e.g. `X0062_Y0061`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileId {
    pub x: u16,
    pub y: u16,
}

impl TileId {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{:04}_Y{:04}", self.x, self.y)
    }
}

impl FromStr for TileId {
    type Err = WuiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = first_token(s);
        let invalid = || WuiError::InvalidTile(token.to_string());

        let (xs, ys) = token.split_once('_').ok_or_else(invalid)?;
        let digits = |part: &str, prefix: char| -> Option<u16> {
            let rest = part.strip_prefix(prefix)?;
            if rest.len() != 4 || !rest.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            rest.parse().ok()
        };
        let x = digits(xs, 'X').ok_or_else(invalid)?;
        let y = digits(ys, 'Y').ok_or_else(invalid)?;
        Ok(Self { x, y })
    }
}

/// First whitespace-delimited token of a command-line argument. Trailing
/// tokens are ignored.
pub fn first_token(arg: &str) -> &str {
    arg.split_whitespace().next().unwrap_or("")
}

/// The seven per-tile input rasters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    BuildingDensity,
    WildVegetation,
    FswVegetation,
    Water,
    LandCover,
    BufferedVegetation,
    BufferedFswVegetation,
}

impl Layer {
    pub const ALL: [Layer; 7] = [
        Layer::BuildingDensity,
        Layer::WildVegetation,
        Layer::FswVegetation,
        Layer::Water,
        Layer::LandCover,
        Layer::BufferedVegetation,
        Layer::BufferedFswVegetation,
    ];

    /// Theme directory under the input root.
    pub fn theme(self) -> &'static str {
        match self {
            Layer::BuildingDensity => "bldDensity",
            Layer::Water => "water",
            Layer::WildVegetation
            | Layer::FswVegetation
            | Layer::LandCover
            | Layer::BufferedVegetation
            | Layer::BufferedFswVegetation => "landcover",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Layer::BuildingDensity => "bldDensity_500.tif",
            Layer::WildVegetation => "allWildVeg_500.tif",
            Layer::FswVegetation => "fswWildVeg_500.tif",
            Layer::Water => "water.tif",
            Layer::LandCover => "worldcover.tif",
            Layer::BufferedVegetation => "bufferedVeg_2400.tif",
            Layer::BufferedFswVegetation => "bufferedFSWVeg_2400.tif",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layer::BuildingDensity => "building-density",
            Layer::WildVegetation => "wild-vegetation",
            Layer::FswVegetation => "fsw-vegetation",
            Layer::Water => "water",
            Layer::LandCover => "land-cover",
            Layer::BufferedVegetation => "buffered-vegetation",
            Layer::BufferedFswVegetation => "buffered-fsw-vegetation",
        };
        f.write_str(name)
    }
}

pub const OUTPUT_FILE_NAME: &str = "WUI.tif";
pub const MANIFEST_FILE_NAME: &str = "WUI.json";

/// Directory roots for inputs and outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayout {
    pub input_root: PathBuf,
    pub output_root: PathBuf,
}

impl Default for TileLayout {
    fn default() -> Self {
        Self {
            input_root: PathBuf::from("/dir"),
            output_root: PathBuf::from("/dir/wui"),
        }
    }
}

impl TileLayout {
    pub fn new(input_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
        }
    }

    /// `<input_root>/<theme>/<region>/<tile>/<file>`
    pub fn input_path(&self, layer: Layer, region: Region, tile: TileId) -> PathBuf {
        self.input_root
            .join(layer.theme())
            .join(region.as_str())
            .join(tile.to_string())
            .join(layer.file_name())
    }

    /// `<output_root>/<region>/<tile>`
    pub fn output_dir(&self, region: Region, tile: TileId) -> PathBuf {
        self.output_root.join(region.as_str()).join(tile.to_string())
    }

    pub fn output_path(&self, region: Region, tile: TileId) -> PathBuf {
        self.output_dir(region, tile).join(OUTPUT_FILE_NAME)
    }

    pub fn manifest_path(&self, region: Region, tile: TileId) -> PathBuf {
        self.output_dir(region, tile).join(MANIFEST_FILE_NAME)
    }
}
