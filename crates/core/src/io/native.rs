//! Native GeoTIFF reading/writing (without GDAL dependency)
//!
//! Uses the `tiff` crate. Rasters are written as a single band of 64-bit
//! floats with the GeoTIFF tags needed to georeference them: pixel scale,
//! tiepoint, a key directory and the WKT as an ASCII citation.

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray64Float;
use tiff::encoder::compression::{Deflate, Lzw};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GEO_ASCII_PARAMS: u16 = 34737;
const GDAL_NODATA: u16 = 42113;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GT_CITATION_KEY: u16 = 1026;
const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;

/// Compression applied to the image strips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    #[default]
    None,
    Deflate,
    Lzw,
}

/// Options for writing GeoTIFF files
#[derive(Debug, Clone, Default)]
pub struct GeoTiffOptions {
    pub compression: Compression,
}

fn sink_error(context: &str) -> impl Fn(tiff::TiffError) -> Error + '_ {
    move |e| Error::SinkWrite(format!("{}: {}", context, e))
}

/// Read a GeoTIFF file into a Raster
///
/// Reads band 1 and whatever georeferencing the writer below produces.
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file, band)
}

/// Read a GeoTIFF from an in-memory buffer into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8], band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data), band)
}

fn decode_geotiff<T, R>(reader: R, _band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader)
        .map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;

    let rows = height as usize;
    let cols = width as usize;

    let image = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match image {
        DecodingResult::F64(buf) => buf.into_iter().map(T::from_f64_or_nodata).collect(),
        DecodingResult::F32(buf) => buf.into_iter().map(|v| T::from_f64_or_nodata(v as f64)).collect(),
        DecodingResult::U8(buf) => buf.into_iter().map(|v| T::from_f64_or_nodata(v as f64)).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(|v| T::from_f64_or_nodata(v as f64)).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(|v| T::from_f64_or_nodata(v as f64)).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(|v| T::from_f64_or_nodata(v as f64)).collect(),
        _ => return Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".to_string())),
    };

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_crs(read_citation(&mut decoder).map(CRS::from_wkt));

    if let Ok(text) = decoder.get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_NODATA)) {
        if let Ok(nodata) = text.trim_end_matches('\0').trim().parse::<f64>() {
            raster.set_nodata(Some(T::from_f64_or_nodata(nodata)));
        }
    }

    Ok(raster)
}

/// GeoTransform from ModelPixelScaleTag + ModelTiepointTag
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE)).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT)).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// WKT stored as the GTCitationGeoKey
fn read_citation<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<String> {
    let keys = decoder.get_tag_u16_vec(Tag::from_u16_exhaustive(GEO_KEY_DIRECTORY)).ok()?;
    let ascii = decoder.get_tag_ascii_string(Tag::from_u16_exhaustive(GEO_ASCII_PARAMS)).ok()?;

    // header is 4 shorts, then one [id, location, count, offset] entry per key
    let entry = keys
        .get(4..)?
        .chunks_exact(4)
        .find(|k| k[0] == GT_CITATION_KEY && k[1] == GEO_ASCII_PARAMS)?;
    let (count, offset) = (entry[2] as usize, entry[3] as usize);

    let text: String = ascii.chars().skip(offset).take(count).collect();
    let wkt = text.trim_end_matches('\0').trim_end_matches('|');
    (!wkt.is_empty()).then(|| wkt.to_string())
}

/// Write a Raster to a GeoTIFF file.
///
/// The image is encoded into a temporary file next to `path` and renamed
/// over it only once fully written, so a failure never leaves a partial file.
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P, options: Option<GeoTiffOptions>) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let opts = options.unwrap_or_default();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".gridwell-")
        .suffix(".tif.part")
        .tempfile_in(dir)
        .map_err(|e| Error::SinkWrite(format!("cannot create output in {}: {}", dir.display(), e)))?;

    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        encode_geotiff(raster, &mut writer, &opts)?;
        writer
            .flush()
            .map_err(|e| Error::SinkWrite(format!("cannot flush output: {}", e)))?;
    }

    tmp.persist(path).map_err(|e| {
        Error::SinkWrite(format!("cannot move output into place at {}: {}", path.display(), e.error))
    })?;

    Ok(())
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>, options: Option<GeoTiffOptions>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut cursor = Cursor::new(Vec::new());
    encode_geotiff(raster, &mut cursor, &options.unwrap_or_default())?;
    Ok(cursor.into_inner())
}

/// GeoKeyDirectory and GeoAsciiParams contents for a raster's CRS.
///
/// The WKT lands in a TIFF ASCII tag whose length is a 16-bit geokey count,
/// so it must be plain ASCII and shorter than 65535 bytes.
fn geokeys(crs: Option<&CRS>) -> Result<(Vec<u16>, Option<String>)> {
    let model = match crs {
        Some(c) if c.is_geographic() => MODEL_TYPE_GEOGRAPHIC,
        _ => MODEL_TYPE_PROJECTED,
    };
    let citation = crs.map(|c| format!("{}|", c.wkt()));

    if let Some(text) = &citation {
        if !text.is_ascii() {
            return Err(Error::SinkWrite(
                "projection WKT contains non-ASCII characters, which GeoTIFF ASCII tags cannot hold".into(),
            ));
        }
        if text.len() > u16::MAX as usize {
            return Err(Error::SinkWrite(format!(
                "projection WKT is {} bytes, over the GeoTIFF limit of {}",
                text.len() - 1,
                u16::MAX as usize - 1
            )));
        }
    }

    let mut entries = vec![
        [GT_MODEL_TYPE_KEY, 0, 1, model],
        [GT_RASTER_TYPE_KEY, 0, 1, RASTER_PIXEL_IS_AREA],
    ];
    if let Some(text) = &citation {
        entries.push([GT_CITATION_KEY, GEO_ASCII_PARAMS, text.len() as u16, 0]);
    }

    let mut keys = vec![1, 1, 0, entries.len() as u16];
    keys.extend(entries.into_iter().flatten());
    Ok((keys, citation))
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, opts: &GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer).map_err(sink_error("TIFF encoder error"))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f64> = raster.data().iter().map(|v| v.as_f64()).collect();

    let gt = raster.transform();
    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    let (keys, citation) = geokeys(raster.crs())?;
    let nodata = raster.nodata().map(|nd| {
        let v = nd.as_f64();
        if v.is_nan() { "nan".to_string() } else { v.to_string() }
    });

    // ImageEncoder's type depends on the compression, so the body is shared by macro
    macro_rules! write_image {
        ($image:expr) => {{
            let mut image = $image.map_err(sink_error("Cannot create TIFF image"))?;
            let dir = image.encoder();
            dir.write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &scale[..])
                .map_err(sink_error("Cannot write pixel scale tag"))?;
            dir.write_tag(Tag::Unknown(MODEL_TIEPOINT), &tiepoint[..])
                .map_err(sink_error("Cannot write tiepoint tag"))?;
            dir.write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), keys.as_slice())
                .map_err(sink_error("Cannot write geokey directory"))?;
            if let Some(text) = &citation {
                dir.write_tag(Tag::Unknown(GEO_ASCII_PARAMS), text.as_str())
                    .map_err(sink_error("Cannot write geo ascii params"))?;
            }
            if let Some(text) = &nodata {
                dir.write_tag(Tag::Unknown(GDAL_NODATA), text.as_str())
                    .map_err(sink_error("Cannot write nodata tag"))?;
            }
            image
                .write_data(&data)
                .map_err(sink_error("Cannot write image data"))?;
        }};
    }

    let (width, height) = (cols as u32, rows as u32);
    match opts.compression {
        Compression::None => write_image!(encoder.new_image::<Gray64Float>(width, height)),
        Compression::Deflate => write_image!(encoder
            .new_image_with_compression::<Gray64Float, _>(width, height, Deflate::default())),
        Compression::Lzw => write_image!(encoder
            .new_image_with_compression::<Gray64Float, _>(width, height, Lzw::default())),
    }

    Ok(())
}
