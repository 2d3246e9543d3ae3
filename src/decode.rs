//! Asynchronous decoding of rendered image sources into displayable images.
//!
//! Inside a tokio runtime, decoding runs on the blocking pool so a large PNG
//! never stalls the caller's scheduler thread. Polled from any other executor
//! it decodes inline. Either way the returned future resolves or fails exactly
//! once; dropping it abandons the decode without side effects.

use crate::errors::RenderError;
use crate::render::backend::RgbaImage;
use crate::render::image::{parse_data_uri, OutputFormat};

/// A decoded image, ready to be shown.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayImage {
    /// Straight RGBA8 pixels
    Bitmap(RgbaImage),
    /// Validated SVG markup with the size declared on its root element
    Vector { width: u32, height: u32, markup: String },
}

impl DisplayImage {
    pub fn width(&self) -> u32 {
        match self {
            DisplayImage::Bitmap(img) => img.width,
            DisplayImage::Vector { width, .. } => *width,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            DisplayImage::Bitmap(img) => img.height,
            DisplayImage::Vector { height, .. } => *height,
        }
    }
}

/// Decodes a data URI as produced by [`RenderedImage::data_uri`](crate::render::RenderedImage::data_uri).
pub async fn decode(src: String) -> Result<DisplayImage, RenderError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle
            .spawn_blocking(move || decode_blocking(&src))
            .await
            .map_err(|e| RenderError::DecodeFailure(format!("decode task failed: {e}")))?,
        Err(_) => {
            log::trace!("decode: no tokio runtime, decoding inline");
            decode_blocking(&src)
        }
    }
}

fn decode_blocking(src: &str) -> Result<DisplayImage, RenderError> {
    let (format, bytes) = parse_data_uri(src)?;
    let image = match format {
        OutputFormat::Raster => DisplayImage::Bitmap(decode_png(&bytes)?),
        OutputFormat::Vector => decode_svg(bytes)?,
    };
    log::trace!("decoded {:?} image {}x{}", format, image.width(), image.height());
    Ok(image)
}

fn decode_png(bytes: &[u8]) -> Result<RgbaImage, RenderError> {
    let fail = |e: png::DecodingError| RenderError::DecodeFailure(format!("invalid png: {e}"));

    let mut decoder = png::Decoder::new(bytes);
    decoder.set_transformations(png::Transformations::normalize_to_color8());
    let mut reader = decoder.read_info().map_err(fail)?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(fail)?;
    buf.truncate(info.buffer_size());

    // Normalize everything to RGBA8.
    let pixels = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => buf.chunks_exact(3).flat_map(|p| [p[0], p[1], p[2], 255]).collect(),
        png::ColorType::GrayscaleAlpha => buf.chunks_exact(2).flat_map(|p| [p[0], p[0], p[0], p[1]]).collect(),
        png::ColorType::Grayscale => buf.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => {
            return Err(RenderError::DecodeFailure(format!("unsupported png color type {other:?}")));
        }
    };

    Ok(RgbaImage::from_raw(pixels, info.width, info.height, info.width * 4))
}

fn decode_svg(bytes: Vec<u8>) -> Result<DisplayImage, RenderError> {
    let markup = String::from_utf8(bytes)
        .map_err(|e| RenderError::DecodeFailure(format!("svg is not UTF-8: {e}")))?;

    let start = markup
        .find("<svg")
        .ok_or_else(|| RenderError::DecodeFailure("missing <svg> root element".to_string()))?;
    let root_end = markup[start..]
        .find('>')
        .map(|i| start + i)
        .ok_or_else(|| RenderError::DecodeFailure("malformed <svg> tag".to_string()))?;
    let root = &markup[start..root_end];
    let self_closing = root.ends_with('/') && markup[root_end + 1..].trim().is_empty();
    if !self_closing && !markup.trim_end().ends_with("</svg>") {
        return Err(RenderError::DecodeFailure("unterminated <svg> root element".to_string()));
    }

    let width = root_dimension(root, "width")?;
    let height = root_dimension(root, "height")?;
    Ok(DisplayImage::Vector { width, height, markup })
}

/// Reads an integer `name="..."` attribute from the root tag.
fn root_dimension(root: &str, name: &str) -> Result<u32, RenderError> {
    let needle = format!(" {name}=\"");
    let value = root
        .find(&needle)
        .map(|i| &root[i + needle.len()..])
        .and_then(|rest| rest.split('"').next())
        .ok_or_else(|| RenderError::DecodeFailure(format!("svg root has no {name}")))?;
    value
        .parse()
        .map_err(|_| RenderError::DecodeFailure(format!("svg {name} {value:?} is not a pixel size")))
}
