//! Rendered image payloads and their data URI form.

use crate::errors::RenderError;
use crate::render::backend::SurfaceSize;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Everything `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Which backend produces the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// SVG markup
    Vector,
    /// PNG bitmap
    Raster,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Vector => "image/svg+xml",
            OutputFormat::Raster => "image/png",
        }
    }

    /// Everything in a data URI before the payload.
    fn uri_prefix(self) -> String {
        match self {
            OutputFormat::Vector => format!("data:{};charset=utf-8,", self.mime_type()),
            OutputFormat::Raster => format!("data:{};base64,", self.mime_type()),
        }
    }
}

/// An encoded image: SVG document bytes or PNG file bytes.
#[derive(Clone, PartialEq)]
pub struct RenderedImage {
    pub format: OutputFormat,
    pub size: SurfaceSize,
    pub bytes: Vec<u8>,
}

impl RenderedImage {
    pub fn new(format: OutputFormat, size: SurfaceSize, bytes: Vec<u8>) -> Self {
        Self { format, size, bytes }
    }

    /// Self-describing URI for the payload: percent-encoded SVG or base64 PNG.
    pub fn data_uri(&self) -> String {
        let prefix = self.format.uri_prefix();
        match self.format {
            OutputFormat::Vector => {
                let markup = String::from_utf8_lossy(&self.bytes);
                format!("{prefix}{}", utf8_percent_encode(&markup, URI_COMPONENT))
            }
            OutputFormat::Raster => format!("{prefix}{}", STANDARD.encode(&self.bytes)),
        }
    }

    /// The SVG document, for vector images.
    pub fn markup(&self) -> Option<&str> {
        match self.format {
            OutputFormat::Vector => std::str::from_utf8(&self.bytes).ok(),
            OutputFormat::Raster => None,
        }
    }
}

impl std::fmt::Debug for RenderedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedImage")
            .field("format", &self.format)
            .field("size", &self.size)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Splits a data URI produced by [`RenderedImage::data_uri`] back into its format and raw payload.
pub(crate) fn parse_data_uri(src: &str) -> Result<(OutputFormat, Vec<u8>), RenderError> {
    if let Some(encoded) = src.strip_prefix(OutputFormat::Vector.uri_prefix().as_str()) {
        let markup = percent_decode_str(encoded)
            .decode_utf8()
            .map_err(|e| RenderError::DecodeFailure(format!("svg payload is not UTF-8: {e}")))?;
        return Ok((OutputFormat::Vector, markup.into_owned().into_bytes()));
    }
    if let Some(encoded) = src.strip_prefix(OutputFormat::Raster.uri_prefix().as_str()) {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| RenderError::DecodeFailure(format!("bad base64 payload: {e}")))?;
        return Ok((OutputFormat::Raster, bytes));
    }
    let head: String = src.chars().take(32).collect();
    Err(RenderError::DecodeFailure(format!("unsupported image source {head:?}")))
}
