//! Renders robot travel paths from map data into overlay images.
//!
//! Paths come in as map entities (a kind plus a flat point array in map
//! units) and go out either as SVG markup or as a crisp, non anti-aliased PNG,
//! both wrapped in data URIs that a map view can layer on top of its base map.
//!
//! - [`render::PathRenderer`] validates, projects and dispatches to a backend.
//! - [`drawer::PathDrawer`] adds the asynchronous decode step on top.

pub mod config;
pub mod decode;
pub mod drawer;
pub mod entity;
pub mod errors;
pub mod render;

pub use config::RenderConfig;
pub use decode::DisplayImage;
pub use drawer::PathDrawer;
pub use entity::{EntityKind, MapEntity, Path, PathKind, Point};
pub use errors::RenderError;
pub use render::{Frame, OutputFormat, PathRenderer, RenderedImage};
