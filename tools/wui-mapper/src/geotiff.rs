//! Single-band GeoTIFF read/write for WUI tiles.
//!
//! Inputs of any integer or float sample type decode to an f32 [`Grid`].
//! The output is Gray8, LZW-compressed, with the reference layer's GeoTIFF
//! tags copied over and GDAL_NODATA set.
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek};
use std::path::Path;

use serde::Serialize;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::encoder::{colortype, compression::Lzw, TiffEncoder};
use tiff::tags::Tag;
use tiff::{ColorType, TiffError, TiffResult};
use wui_core::{ClassGrid, Grid, Layer, WuiError};

/// GeoTIFF georeferencing tags, carried verbatim from input to output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeoReference {
    pub pixel_scale: Option<Vec<f64>>,
    pub tiepoint: Option<Vec<f64>>,
    pub transformation: Option<Vec<f64>>,
    pub geo_keys: Option<Vec<u16>>,
    pub geo_doubles: Option<Vec<f64>>,
    pub geo_ascii: Option<String>,
}

impl GeoReference {
    /// GDAL-style affine transform
    /// `[origin_x, pixel_w, row_rot, origin_y, col_rot, pixel_h]`.
    pub fn geo_transform(&self) -> Option<[f64; 6]> {
        if let Some(m) = self.transformation.as_deref().filter(|m| m.len() >= 8) {
            return Some([m[3], m[0], m[1], m[7], m[4], m[5]]);
        }
        let tp = self.tiepoint.as_deref().filter(|t| t.len() >= 6)?;
        let scale = self.pixel_scale.as_deref().filter(|s| s.len() >= 2)?;
        let (i, j, x, y) = (tp[0], tp[1], tp[3], tp[4]);
        let (sx, sy) = (scale[0], scale[1]);
        Some([x - i * sx, sx, 0.0, y + j * sy, 0.0, -sy])
    }

    pub fn is_empty(&self) -> bool {
        *self == GeoReference::default()
    }

    /// True when both transforms are known and differ.
    pub fn disagrees_with(&self, other: &GeoReference) -> bool {
        match (self.geo_transform(), other.geo_transform()) {
            (Some(a), Some(b)) => a.iter().zip(b.iter()).any(|(p, q)| (p - q).abs() > 1e-9),
            _ => false,
        }
    }

    fn read<R: Read + Seek>(decoder: &mut Decoder<R>) -> TiffResult<Self> {
        Ok(Self {
            pixel_scale: decoder.find_tag(Tag::ModelPixelScaleTag)?.map(|v| v.into_f64_vec()).transpose()?,
            tiepoint: decoder.find_tag(Tag::ModelTiepointTag)?.map(|v| v.into_f64_vec()).transpose()?,
            transformation: decoder
                .find_tag(Tag::ModelTransformationTag)?
                .map(|v| v.into_f64_vec())
                .transpose()?,
            geo_keys: decoder
                .find_tag(Tag::GeoKeyDirectoryTag)?
                .map(|v| v.into_u32_vec())
                .transpose()?
                .map(|keys| keys.into_iter().map(|k| k as u16).collect()),
            geo_doubles: decoder.find_tag(Tag::GeoDoubleParamsTag)?.map(|v| v.into_f64_vec()).transpose()?,
            geo_ascii: decoder.find_tag(Tag::GeoAsciiParamsTag)?.map(|v| v.into_string()).transpose()?,
        })
    }
}

/// Decode one single-band input layer.
pub fn read_layer(path: &Path, layer: Layer) -> Result<(Grid, GeoReference), WuiError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => WuiError::InputNotFound {
            layer,
            path: path.to_path_buf(),
        },
        _ => decode_error(path, e),
    })?;
    decode_grid(path, BufReader::new(file))
}

fn decode_error(path: &Path, err: impl std::fmt::Display) -> WuiError {
    WuiError::Decode {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn decode_grid<R: Read + Seek>(path: &Path, reader: R) -> Result<(Grid, GeoReference), WuiError> {
    let tiff_err = |e: TiffError| decode_error(path, e);

    // A 10000x10000 f32 band exceeds the decoder's default buffer limit.
    let mut decoder = Decoder::new(reader).map_err(tiff_err)?.with_limits(Limits::unlimited());
    let (width, height) = decoder.dimensions().map_err(tiff_err)?;
    match decoder.colortype().map_err(tiff_err)? {
        ColorType::Gray(_) => {}
        other => return Err(decode_error(path, format!("expected a single-band raster, found {other:?}"))),
    }
    let geo = GeoReference::read(&mut decoder).map_err(tiff_err)?;

    #[allow(unreachable_patterns)]
    let data: Vec<f32> = match decoder.read_image().map_err(tiff_err)? {
        DecodingResult::U8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::U32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::U64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I8(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I16(v) => v.into_iter().map(f32::from).collect(),
        DecodingResult::I32(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::I64(v) => v.into_iter().map(|x| x as f32).collect(),
        DecodingResult::F32(v) => v,
        DecodingResult::F64(v) => v.into_iter().map(|x| x as f32).collect(),
        _ => return Err(decode_error(path, "unsupported sample format")),
    };

    let grid = Grid::from_vec(width as usize, height as usize, data)
        .ok_or_else(|| decode_error(path, "decoded sample count does not match image dimensions"))?;
    Ok((grid, geo))
}

/// Write the class grid as an LZW-compressed Gray8 GeoTIFF.
pub fn write_class_grid(
    path: &Path,
    grid: &ClassGrid,
    geo: &GeoReference,
    nodata: u8,
) -> Result<(), WuiError> {
    let write_failure = |source: io::Error| WuiError::IoWriteFailure {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_failure)?;
    let mut writer = BufWriter::new(file);
    encode_class_grid(&mut writer, grid, geo, nodata).map_err(|e| write_failure(into_io(e)))?;
    io::Write::flush(&mut writer).map_err(write_failure)
}

fn encode_class_grid<W: io::Write + Seek>(
    writer: W,
    grid: &ClassGrid,
    geo: &GeoReference,
    nodata: u8,
) -> TiffResult<()> {
    let mut tiff = TiffEncoder::new(writer)?;
    let mut image = tiff.new_image_with_compression::<colortype::Gray8, _>(
        grid.width as u32,
        grid.height as u32,
        Lzw,
    )?;

    let dir = image.encoder();
    if let Some(v) = &geo.pixel_scale {
        dir.write_tag(Tag::ModelPixelScaleTag, &v[..])?;
    }
    if let Some(v) = &geo.tiepoint {
        dir.write_tag(Tag::ModelTiepointTag, &v[..])?;
    }
    if let Some(v) = &geo.transformation {
        dir.write_tag(Tag::ModelTransformationTag, &v[..])?;
    }
    if let Some(v) = &geo.geo_keys {
        dir.write_tag(Tag::GeoKeyDirectoryTag, &v[..])?;
    }
    if let Some(v) = &geo.geo_doubles {
        dir.write_tag(Tag::GeoDoubleParamsTag, &v[..])?;
    }
    if let Some(s) = &geo.geo_ascii {
        dir.write_tag(Tag::GeoAsciiParamsTag, s.as_str())?;
    }
    dir.write_tag(Tag::GdalNodata, nodata.to_string().as_str())?;

    image.write_data(&grid.data)
}

fn into_io(err: TiffError) -> io::Error {
    match err {
        TiffError::IoError(e) => e,
        other => io::Error::other(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_geo() -> GeoReference {
        GeoReference {
            pixel_scale: Some(vec![10.0, 10.0, 0.0]),
            tiepoint: Some(vec![0.0, 0.0, 0.0, 4_200_000.0, 5_300_000.0, 0.0]),
            transformation: None,
            geo_keys: Some(vec![1, 1, 0, 1, 1024, 0, 1, 1]),
            geo_doubles: None,
            geo_ascii: Some("EQUI7 NA|".to_string()),
        }
    }

    fn write_f32(path: &Path, grid: &Grid, geo: &GeoReference) {
        let file = File::create(path).unwrap();
        let mut tiff = TiffEncoder::new(BufWriter::new(file)).unwrap();
        let mut image = tiff
            .new_image::<colortype::Gray32Float>(grid.width as u32, grid.height as u32)
            .unwrap();
        if let Some(v) = &geo.pixel_scale {
            image.encoder().write_tag(Tag::ModelPixelScaleTag, &v[..]).unwrap();
        }
        if let Some(v) = &geo.tiepoint {
            image.encoder().write_tag(Tag::ModelTiepointTag, &v[..]).unwrap();
        }
        image.write_data(&grid.data).unwrap();
    }

    #[test]
    fn geo_transform_from_tiepoint_and_scale() {
        let gt = sample_geo().geo_transform().unwrap();
        assert_eq!(gt, [4_200_000.0, 10.0, 0.0, 5_300_000.0, 0.0, -10.0]);
    }

    #[test]
    fn geo_transform_prefers_matrix() {
        let geo = GeoReference {
            transformation: Some(vec![
                20.0, 0.0, 0.0, 100.0, //
                0.0, -20.0, 0.0, 200.0, //
                0.0, 0.0, 0.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ]),
            ..sample_geo()
        };
        assert_eq!(geo.geo_transform().unwrap(), [100.0, 20.0, 0.0, 200.0, 0.0, -20.0]);
        assert!(geo.disagrees_with(&sample_geo()));
        assert!(!GeoReference::default().disagrees_with(&sample_geo()));
    }

    #[test]
    fn missing_file_is_input_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.tif");
        match read_layer(&path, Layer::Water) {
            Err(WuiError::InputNotFound { layer, path: p }) => {
                assert_eq!(layer, Layer::Water);
                assert_eq!(p, path);
            }
            other => panic!("expected InputNotFound, got {other:?}"),
        }
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.tif");
        std::fs::write(&path, b"not a tiff").unwrap();
        assert!(matches!(read_layer(&path, Layer::LandCover), Err(WuiError::Decode { .. })));
    }

    #[test]
    fn float_layer_reads_back_with_georeference() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("density.tif");
        let mut grid = Grid::new(5, 3, 0.0);
        grid.set(2, 4, 17.25);
        grid.set(0, 1, 0.5);
        write_f32(&path, &grid, &sample_geo());

        let (read, geo) = read_layer(&path, Layer::BuildingDensity).unwrap();
        assert_eq!(read, grid);
        assert_eq!(geo.pixel_scale, sample_geo().pixel_scale);
        assert_eq!(geo.tiepoint, sample_geo().tiepoint);
        assert_eq!(geo.transformation, None);
    }

    #[test]
    fn class_grid_round_trip_keeps_tags_and_nodata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("WUI.tif");
        let grid = ClassGrid {
            data: (0..24).map(|i| (i % 9) as u8).collect(),
            width: 6,
            height: 4,
        };
        write_class_grid(&path, &grid, &sample_geo(), 255).unwrap();

        let file = File::open(&path).unwrap();
        let mut decoder = Decoder::new(BufReader::new(file)).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (6, 4));
        assert_eq!(decoder.get_tag_ascii_string(Tag::GdalNodata).unwrap(), "255");
        let geo = GeoReference::read(&mut decoder).unwrap();
        assert_eq!(geo, sample_geo());
        match decoder.read_image().unwrap() {
            DecodingResult::U8(v) => assert_eq!(v, grid.data),
            _ => panic!("expected u8 samples"),
        }
    }

    #[test]
    fn unwritable_path_is_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-subdir").join("WUI.tif");
        let grid = ClassGrid::zeroed(2, 2);
        assert!(matches!(
            write_class_grid(&path, &grid, &GeoReference::default(), 255),
            Err(WuiError::IoWriteFailure { .. })
        ));
    }
}
