use crate::config::RenderConfig;
use crate::errors::RenderError;
use crate::render::backend::{RenderBackend, SurfaceSize};
use crate::render::image::{OutputFormat, RenderedImage};
use crate::render::stroke::{ProjectedPath, StrokeStyle};
use simple_xml_builder::XMLElement;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Vector backend that writes every path as an SVG `<path>` element.
///
/// The backend keeps no drawing state, so identical input always yields a
/// byte-identical document.
pub struct VectorBackend {
    config: RenderConfig,
}

impl VectorBackend {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Builds the complete SVG document for `paths`.
    pub fn document(&self, paths: &[ProjectedPath], size: SurfaceSize, color: &str) -> String {
        let mut root = svg_root(size);
        for path in paths {
            if path.points.is_empty() {
                log::trace!("VectorBackend: skipping path without points");
                continue;
            }
            let style = StrokeStyle::for_kind(path.kind, color, &self.config);
            root.add_child(self.path_elem(path, &style));
        }
        root.to_string()
    }

    fn path_elem(&self, path: &ProjectedPath, style: &StrokeStyle) -> XMLElement {
        let d: String = path
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{} {} {} ", if i == 0 { 'M' } else { 'L' }, p.x, p.y))
            .collect();

        let mut elem = XMLElement::new("path");
        elem.add_attribute("d", &d);
        elem.add_attribute("fill", "none"); // no fill, only the stroke
        elem.add_attribute("stroke", &style.color);
        elem.add_attribute("stroke-width", &self.config.vector_stroke_width.to_string());
        elem.add_attribute("stroke-linecap", "round");
        elem.add_attribute("stroke-linejoin", "round");
        if style.is_dashed() {
            let dash = style.dash.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(",");
            elem.add_attribute("stroke-dasharray", &dash);
        }
        elem
    }
}

impl RenderBackend for VectorBackend {
    fn name(&self) -> &str {
        "VectorBackend"
    }

    fn render(
        &mut self,
        paths: &[ProjectedPath],
        size: SurfaceSize,
        color: &str,
    ) -> Result<RenderedImage, RenderError> {
        let svg = self.document(paths, size, color);
        log::debug!("VectorBackend: {} path(s), {} bytes of markup", paths.len(), svg.len());
        Ok(RenderedImage::new(OutputFormat::Vector, size, svg.into_bytes()))
    }

    fn empty(&self, size: SurfaceSize) -> Result<RenderedImage, RenderError> {
        let svg = svg_root(size).to_string();
        Ok(RenderedImage::new(OutputFormat::Vector, size, svg.into_bytes()))
    }
}

fn svg_root(size: SurfaceSize) -> XMLElement {
    let SurfaceSize { width, height } = size;
    let mut root = XMLElement::new("svg");
    root.add_attribute("xmlns", SVG_NS);
    root.add_attribute("width", &width.to_string());
    root.add_attribute("height", &height.to_string());
    root.add_attribute("viewBox", &format!("0 0 {width} {height}"));
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{PathKind, Point};

    fn l_path(kind: PathKind) -> ProjectedPath {
        ProjectedPath {
            kind,
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
        }
    }

    #[test]
    fn actual_path_is_solid() {
        let backend = VectorBackend::new(RenderConfig::default());
        let svg = backend.document(&[l_path(PathKind::Actual)], SurfaceSize::new(20, 20), "#ffffff");
        assert!(svg.contains("<svg"));
        assert!(svg.contains("xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("viewBox=\"0 0 20 20\""));
        assert!(svg.contains("d=\"M 0 0 L 10 0 L 10 10 \""));
        assert!(svg.contains("fill=\"none\""));
        assert!(svg.contains("stroke=\"#ffffff\""));
        assert!(svg.contains("stroke-width=\"0.5\""));
        assert!(svg.contains("stroke-linecap=\"round\""));
        assert!(svg.contains("stroke-linejoin=\"round\""));
        assert!(!svg.contains("stroke-dasharray"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn predicted_path_carries_dash() {
        let backend = VectorBackend::new(RenderConfig::default());
        let svg = backend.document(&[l_path(PathKind::Predicted)], SurfaceSize::new(20, 20), "#000000");
        assert!(svg.contains("d=\"M 0 0 L 10 0 L 10 10 \""));
        assert!(svg.contains("stroke-dasharray=\"1,1\""));
    }

    #[test]
    fn batch_keeps_input_order() {
        let backend = VectorBackend::new(RenderConfig::default());
        let first = ProjectedPath { kind: PathKind::Actual, points: vec![Point::new(1.0, 1.0)] };
        let second = ProjectedPath { kind: PathKind::Predicted, points: vec![Point::new(2.0, 2.0)] };
        let svg = backend.document(&[first, second], SurfaceSize::new(5, 5), "red");
        let a = svg.find("M 1 1").unwrap();
        let b = svg.find("M 2 2").unwrap();
        assert!(a < b);
        assert_eq!(svg.matches("<path").count(), 2);
    }

    #[test]
    fn skips_empty_paths_and_escapes_color() {
        let backend = VectorBackend::new(RenderConfig::default());
        let empty = ProjectedPath { kind: PathKind::Actual, points: vec![] };
        let svg = backend.document(&[empty, l_path(PathKind::Actual)], SurfaceSize::new(5, 5), "\"><x");
        assert_eq!(svg.matches("<path").count(), 1);
        assert!(!svg.contains("\"><x"));
        assert!(!svg.contains("<x"));
    }

    #[test]
    fn output_is_byte_identical_across_calls() {
        let backend = VectorBackend::new(RenderConfig::default());
        let paths = [l_path(PathKind::Actual), l_path(PathKind::Predicted)];
        let a = backend.document(&paths, SurfaceSize::new(20, 20), "#123456");
        let b = backend.document(&paths, SurfaceSize::new(20, 20), "#123456");
        assert_eq!(a, b);
    }

    #[test]
    fn empty_image_has_frame_only() {
        let backend = VectorBackend::new(RenderConfig::default());
        let img = backend.empty(SurfaceSize::new(7, 3)).unwrap();
        let svg = img.markup().unwrap();
        assert!(svg.contains("width=\"7\""));
        assert!(svg.contains("height=\"3\""));
        assert!(svg.contains("viewBox=\"0 0 7 3\""));
        assert!(!svg.contains("<path"));
    }
}
