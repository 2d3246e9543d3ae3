//! CPU raster surface with a small canvas-like drawing API.
//!
//! The surface owns one straight-alpha RGBA8 buffer that is reused between
//! renders and only reallocated when its size changes. Drawing never
//! anti-aliases: strokes are one pixel wide and touch whole pixels only.
//! Segments are clipped to the surface before they are walked, so points far
//! outside the visible area cost nothing.

use crate::entity::Point;
use crate::errors::RenderError;
use crate::render::backend::SurfaceSize;
use std::collections::TryReserveError;
use std::f64::consts::SQRT_2;
use std::io::Write;

const BYTES_PER_PIXEL: usize = 4;

pub struct RasterSurface {
    size: SurfaceSize,
    /// Straight RGBA8, row-major, no padding.
    pixels: Vec<u8>,
    stroke_color: [u8; 4],
    line_dash: Vec<f64>,
    /// Subpaths of the current path, in device pixels.
    subpaths: Vec<Vec<Point>>,
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self {
            size: SurfaceSize::default(),
            pixels: Vec::new(),
            stroke_color: [0, 0, 0, 255],
            line_dash: Vec::new(),
            subpaths: Vec::new(),
        }
    }
}

/// Parses any CSS color string into straight RGBA8.
pub fn parse_color(color: &str) -> Result<[u8; 4], RenderError> {
    csscolorparser::parse(color)
        .map(|c| c.to_rgba8())
        .map_err(|e| RenderError::EncodingFailure(format!("invalid stroke color {color:?}: {e}")))
}

impl RasterSurface {
    /// Creates an empty (0x0) surface.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Reallocates the buffer for `size`. All previous content is dropped.
    ///
    /// On allocation failure the surface keeps its old size and content.
    pub fn try_resize(&mut self, size: SurfaceSize) -> Result<(), TryReserveError> {
        // An overflowing length makes try_reserve_exact report CapacityOverflow.
        let len = size.area().checked_mul(BYTES_PER_PIXEL).unwrap_or(usize::MAX);
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len)?;
        pixels.resize(len, 0);

        self.pixels = pixels;
        self.size = size;
        Ok(())
    }

    /// Sets every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn set_stroke_color(&mut self, rgba: [u8; 4]) {
        self.stroke_color = rgba;
    }

    /// Alternating on/off lengths in pixels; empty for a solid line. Odd-length
    /// patterns repeat twice, as on an HTML canvas.
    pub fn set_line_dash(&mut self, dash: &[f64]) {
        self.line_dash = if dash.len() % 2 == 1 {
            dash.iter().chain(dash.iter()).copied().collect()
        } else {
            dash.to_vec()
        };
    }

    pub fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    pub fn move_to(&mut self, p: Point) {
        self.subpaths.push(vec![p]);
    }

    /// Adds a segment to the current subpath. Without one, acts as `move_to`.
    pub fn line_to(&mut self, p: Point) {
        match self.subpaths.last_mut() {
            Some(sub) => sub.push(p),
            None => self.move_to(p),
        }
    }

    /// Strokes the current path with the current color and dash.
    pub fn stroke(&mut self) {
        let subpaths = std::mem::take(&mut self.subpaths);
        for sub in &subpaths {
            self.stroke_subpath(sub);
        }
        self.subpaths = subpaths;
    }

    fn stroke_subpath(&mut self, points: &[Point]) {
        let mut dash = DashCursor::new(&self.line_dash);
        let mut cells = points.iter().map(|p| (p.x.floor(), p.y.floor()));

        let Some(mut from) = cells.next() else {
            return;
        };
        if dash.is_on() {
            if let Some((x, y)) = self.visible_cell(from) {
                self.blend(x, y);
            }
        }
        for to in cells {
            self.stroke_segment(from, to, &mut dash);
            from = to;
        }
    }

    /// Cell coordinates of `cell` if it lies on the surface.
    fn visible_cell(&self, (x, y): (f64, f64)) -> Option<(i64, i64)> {
        let inside = x >= 0.0 && y >= 0.0 && x < self.size.width as f64 && y < self.size.height as f64;
        inside.then(|| (x as i64, y as i64))
    }

    /// Walks the visible part of the segment `from` (already handled) to `to`.
    ///
    /// The dash distance covers the whole segment, visible or not, so the
    /// pattern stays in phase where the path re-enters the surface.
    fn stroke_segment(&mut self, from: (f64, f64), to: (f64, f64), dash: &mut DashCursor) {
        if !(from.0.is_finite() && from.1.is_finite() && to.0.is_finite() && to.1.is_finite()) {
            log::trace!("RasterSurface: skipping segment with non-finite coordinates");
            return;
        }
        let bounds = [
            0.0,
            0.0,
            self.size.width as f64 - 1.0,
            self.size.height as f64 - 1.0,
        ];
        let Some((t0, t1)) = clip_segment(from, to, bounds) else {
            dash.advance(step_length(to.0 - from.0, to.1 - from.1));
            return;
        };

        let at = |t: f64| {
            let x = (from.0 + t * (to.0 - from.0)).round().clamp(bounds[0], bounds[2]);
            let y = (from.1 + t * (to.1 - from.1)).round().clamp(bounds[1], bounds[3]);
            (x, y)
        };
        let entry = if t0 > 0.0 { at(t0) } else { from };
        let exit = if t1 < 1.0 { at(t1) } else { to };

        if t0 > 0.0 {
            dash.advance(step_length(entry.0 - from.0, entry.1 - from.1));
            if dash.is_on() {
                self.blend(entry.0 as i64, entry.1 as i64);
            }
        }
        self.line_cells(
            (entry.0 as i64, entry.1 as i64),
            (exit.0 as i64, exit.1 as i64),
            dash,
        );
        if t1 < 1.0 {
            dash.advance(step_length(to.0 - exit.0, to.1 - exit.1));
        }
    }

    /// Bresenham from `from` (already plotted) to `to`, inclusive. Both ends
    /// must lie on the surface.
    fn line_cells(&mut self, from: (i64, i64), to: (i64, i64), dash: &mut DashCursor) {
        let (mut x, mut y) = from;
        let dx = (to.0 - x).abs();
        let dy = -(to.1 - y).abs();
        let sx = if x < to.0 { 1 } else { -1 };
        let sy = if y < to.1 { 1 } else { -1 };
        let mut err = dx + dy;

        while (x, y) != to {
            let e2 = 2 * err;
            let mut moved_x = false;
            let mut moved_y = false;
            if e2 >= dy {
                err += dy;
                x += sx;
                moved_x = true;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
                moved_y = true;
            }
            dash.advance(if moved_x && moved_y { SQRT_2 } else { 1.0 });
            if dash.is_on() {
                self.blend(x, y);
            }
        }
    }

    /// Source-over of the stroke color onto one pixel.
    fn blend(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= self.size.width as i64 || y >= self.size.height as i64 {
            return;
        }
        let i = (y as usize * self.size.width as usize + x as usize) * BYTES_PER_PIXEL;
        let src = self.stroke_color;
        let dst = &mut self.pixels[i..i + BYTES_PER_PIXEL];

        if src[3] == 255 {
            dst.copy_from_slice(&src);
            return;
        }
        let sa = src[3] as f64 / 255.0;
        let da = dst[3] as f64 / 255.0;
        let oa = sa + da * (1.0 - sa);
        if oa <= 0.0 {
            dst.fill(0);
            return;
        }
        for c in 0..3 {
            let v = (src[c] as f64 * sa + dst[c] as f64 * da * (1.0 - sa)) / oa;
            dst[c] = v.round().clamp(0.0, 255.0) as u8;
        }
        dst[3] = (oa * 255.0).round() as u8;
    }

    /// RGBA value at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = (y as usize * self.size.width as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.pixels[i..i + BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Encodes the current content as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        encode_png(self.size, &self.pixels)
    }
}

/// Liang-Barsky: the parameter range of `a -> b` inside `[x1, y1, x2, y2]`.
fn clip_segment(a: (f64, f64), b: (f64, f64), [x1, y1, x2, y2]: [f64; 4]) -> Option<(f64, f64)> {
    if x2 < x1 || y2 < y1 {
        return None;
    }
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [(-dx, a.0 - x1), (dx, x2 - a.0), (-dy, a.1 - y1), (dy, y2 - a.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((t0, t1))
}

/// Distance a Bresenham walk covers over `(dx, dy)` cells: 1 per axial step, √2 per diagonal one.
fn step_length(dx: f64, dy: f64) -> f64 {
    let (dx, dy) = (dx.abs(), dy.abs());
    let diagonal = dx.min(dy);
    (dx.max(dy) - diagonal) + diagonal * SQRT_2
}

fn png_encoder<W: Write>(out: W, size: SurfaceSize) -> png::Encoder<'static, W> {
    let mut encoder = png::Encoder::new(out, size.width, size.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder
}

fn check_encodable(size: SurfaceSize) -> Result<(), RenderError> {
    if size.area() == 0 {
        return Err(RenderError::EncodingFailure(format!(
            "cannot encode a {}x{} surface",
            size.width, size.height
        )));
    }
    Ok(())
}

/// Encodes straight RGBA8 `pixels` of `size` as a PNG file.
pub fn encode_png(size: SurfaceSize, pixels: &[u8]) -> Result<Vec<u8>, RenderError> {
    check_encodable(size)?;

    let mut buf = Vec::new();
    {
        let mut writer = png_encoder(&mut buf, size).write_header()?;
        writer.write_image_data(pixels)?;
    }
    Ok(buf)
}

/// Encodes a fully transparent PNG of `size`, one row at a time.
pub fn encode_blank_png(size: SurfaceSize) -> Result<Vec<u8>, RenderError> {
    check_encodable(size)?;
    let io_err = |e: std::io::Error| RenderError::EncodingFailure(e.to_string());

    let mut row = Vec::new();
    row.try_reserve_exact(size.width as usize * BYTES_PER_PIXEL)
        .map_err(|e| RenderError::EncodingFailure(e.to_string()))?;
    row.resize(size.width as usize * BYTES_PER_PIXEL, 0u8);

    let mut buf = Vec::new();
    {
        let mut stream = png_encoder(&mut buf, size).write_header()?.into_stream_writer()?;
        for _ in 0..size.height {
            stream.write_all(&row).map_err(io_err)?;
        }
        stream.finish()?;
    }
    Ok(buf)
}

/// Tracks the distance travelled along a subpath and whether that position falls in a dash.
struct DashCursor {
    pattern: Vec<f64>,
    period: f64,
    distance: f64,
}

impl DashCursor {
    fn new(pattern: &[f64]) -> Self {
        Self {
            pattern: pattern.to_vec(),
            period: pattern.iter().sum(),
            distance: 0.0,
        }
    }

    fn advance(&mut self, step: f64) {
        self.distance += step;
    }

    fn is_on(&self) -> bool {
        if self.pattern.is_empty() || self.period <= 0.0 {
            return true;
        }
        let mut phase = self.distance % self.period;
        for (i, len) in self.pattern.iter().enumerate() {
            if phase < *len {
                return i % 2 == 0;
            }
            phase -= len;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPAQUE_RED: [u8; 4] = [255, 0, 0, 255];
    const CLEAR: [u8; 4] = [0, 0, 0, 0];

    fn surface(w: u32, h: u32) -> RasterSurface {
        let mut s = RasterSurface::new();
        s.try_resize(SurfaceSize::new(w, h)).unwrap();
        s.set_stroke_color(parse_color("#ff0000").unwrap());
        s
    }

    fn stroke_line(s: &mut RasterSurface, pts: &[(f64, f64)]) {
        s.begin_path();
        s.move_to(Point::new(pts[0].0, pts[0].1));
        for p in &pts[1..] {
            s.line_to(Point::new(p.0, p.1));
        }
        s.stroke();
    }

    #[test]
    fn horizontal_line_is_one_pixel_tall() {
        let mut s = surface(8, 8);
        stroke_line(&mut s, &[(1.5, 3.5), (5.5, 3.5)]);
        for x in 1..=5 {
            assert_eq!(s.pixel(x, 3), Some(OPAQUE_RED), "x={x}");
            assert_eq!(s.pixel(x, 2), Some(CLEAR));
            assert_eq!(s.pixel(x, 4), Some(CLEAR));
        }
        assert_eq!(s.pixel(0, 3), Some(CLEAR));
        assert_eq!(s.pixel(6, 3), Some(CLEAR));
    }

    #[test]
    fn single_point_paints_its_pixel() {
        let mut s = surface(20, 20);
        stroke_line(&mut s, &[(10.5, 10.5)]);
        assert_eq!(s.pixel(10, 10), Some(OPAQUE_RED));
        assert_eq!(s.pixel(11, 10), Some(CLEAR));
        assert_eq!(s.pixel(10, 11), Some(CLEAR));
    }

    #[test]
    fn diagonal_line_steps_one_pixel_per_row() {
        let mut s = surface(6, 6);
        stroke_line(&mut s, &[(0.5, 0.5), (4.5, 4.5)]);
        for i in 0..=4 {
            assert_eq!(s.pixel(i, i), Some(OPAQUE_RED));
        }
        assert_eq!(s.pixel(1, 0), Some(CLEAR));
    }

    #[test]
    fn dash_alternates_along_the_path() {
        let mut s = surface(10, 3);
        s.set_line_dash(&[1.0, 1.0]);
        stroke_line(&mut s, &[(0.5, 1.5), (7.5, 1.5)]);
        for x in 0..=7 {
            let expected = if x % 2 == 0 { OPAQUE_RED } else { CLEAR };
            assert_eq!(s.pixel(x, 1), Some(expected), "x={x}");
        }
    }

    #[test]
    fn dash_continues_across_corners() {
        let mut s = surface(6, 6);
        s.set_line_dash(&[1.0, 1.0]);
        // 3 pixels right then 2 down: distances 0,1,2 | 3,4
        stroke_line(&mut s, &[(0.5, 0.5), (2.5, 0.5), (2.5, 2.5)]);
        assert_eq!(s.pixel(0, 0), Some(OPAQUE_RED));
        assert_eq!(s.pixel(1, 0), Some(CLEAR));
        assert_eq!(s.pixel(2, 0), Some(OPAQUE_RED));
        assert_eq!(s.pixel(2, 1), Some(CLEAR));
        assert_eq!(s.pixel(2, 2), Some(OPAQUE_RED));
    }

    #[test]
    fn odd_dash_pattern_is_repeated() {
        let mut s = RasterSurface::new();
        s.set_line_dash(&[2.0]);
        assert_eq!(s.line_dash, vec![2.0, 2.0]);
    }

    #[test]
    fn later_strokes_overwrite_earlier_ones() {
        let mut s = surface(5, 5);
        stroke_line(&mut s, &[(0.5, 2.5), (4.5, 2.5)]);
        s.set_stroke_color(parse_color("#0000ff").unwrap());
        stroke_line(&mut s, &[(2.5, 0.5), (2.5, 4.5)]);
        assert_eq!(s.pixel(2, 2), Some([0, 0, 255, 255]));
        assert_eq!(s.pixel(1, 2), Some(OPAQUE_RED));
    }

    #[test]
    fn translucent_color_blends_over_existing_pixels() {
        let mut s = surface(2, 1);
        stroke_line(&mut s, &[(0.5, 0.5)]);
        s.set_stroke_color(parse_color("rgba(0, 0, 255, 0.5)").unwrap());
        stroke_line(&mut s, &[(0.5, 0.5), (1.5, 0.5)]);
        let [r, g, b, a] = s.pixel(0, 0).unwrap();
        assert_eq!((g, a), (0, 255));
        assert!(r > 100 && r < 160 && b > 100 && b < 160);
        assert_eq!(s.pixel(1, 0).unwrap()[3], 128);
    }

    #[test]
    fn out_of_bounds_points_are_clipped() {
        let mut s = surface(3, 3);
        stroke_line(&mut s, &[(-5.5, 1.5), (10.5, 1.5)]);
        for x in 0..3 {
            assert_eq!(s.pixel(x, 1), Some(OPAQUE_RED));
        }
        assert_eq!(s.pixel(3, 1), None);
    }

    #[test]
    fn invalid_color_is_rejected() {
        assert!(matches!(parse_color("not-a-color"), Err(RenderError::EncodingFailure(_))));
        assert_eq!(parse_color("rgba(0, 0, 255, 0.5)").unwrap(), [0, 0, 255, 128]);
    }

    #[test]
    fn far_away_points_are_clipped_without_walking() {
        let mut s = surface(10, 10);
        stroke_line(&mut s, &[(0.5, 0.5), (1e300, 0.5)]);
        for x in 0..10 {
            assert_eq!(s.pixel(x, 0), Some(OPAQUE_RED), "x={x}");
        }
        assert_eq!(s.pixel(0, 1), Some(CLEAR));

        // both ends far outside, crossing the surface diagonally
        let mut s = surface(4, 4);
        stroke_line(&mut s, &[(-1e10, -1e10), (1e10, 1e10)]);
        for i in 0..4 {
            assert_eq!(s.pixel(i, i), Some(OPAQUE_RED), "i={i}");
        }

        // entirely off-surface and non-finite segments draw nothing
        let mut s = surface(4, 4);
        stroke_line(&mut s, &[(-1e12, 2.5), (-5.5, 2.5), (f64::INFINITY, 2.5), (f64::NAN, 1.5)]);
        assert!((0..4).all(|x| s.pixel(x, 2) == Some(CLEAR)));
    }

    #[test]
    fn dash_stays_in_phase_after_entering_from_outside() {
        let mut s = surface(10, 3);
        s.set_line_dash(&[1.0, 1.0]);
        // starts four cells left of the surface: cell x sits at distance x + 4
        stroke_line(&mut s, &[(-3.5, 1.5), (7.5, 1.5)]);
        for x in 0..=7 {
            let expected = if x % 2 == 0 { OPAQUE_RED } else { CLEAR };
            assert_eq!(s.pixel(x, 1), Some(expected), "x={x}");
        }

        // leaving and re-entering keeps counting the hidden stretch
        let mut s = surface(4, 3);
        s.set_line_dash(&[1.0, 1.0]);
        stroke_line(&mut s, &[(0.5, 1.5), (0.5, 6.5), (1.5, 6.5), (1.5, 0.5)]);
        // (1,2) sits at distance 5 + 1 + 4 = 10
        assert_eq!(s.pixel(1, 2), Some(OPAQUE_RED));
        assert_eq!(s.pixel(1, 1), Some(CLEAR));
        assert_eq!(s.pixel(1, 0), Some(OPAQUE_RED));
    }

    #[test]
    fn clear_and_resize_drop_content() {
        let mut s = surface(4, 4);
        stroke_line(&mut s, &[(1.5, 1.5)]);
        s.clear();
        assert_eq!(s.pixel(1, 1), Some(CLEAR));
        stroke_line(&mut s, &[(1.5, 1.5)]);
        s.try_resize(SurfaceSize::new(2, 2)).unwrap();
        assert_eq!(s.size(), SurfaceSize::new(2, 2));
        assert_eq!(s.pixel(1, 1), Some(CLEAR));
    }

    #[test]
    fn encode_rejects_empty_surface() {
        let s = RasterSurface::new();
        assert!(matches!(s.encode_png(), Err(RenderError::EncodingFailure(_))));
    }

    #[test]
    fn blank_png_is_streamed_at_full_size() {
        let png = encode_blank_png(SurfaceSize::new(300, 2)).unwrap();
        let mut reader = png::Decoder::new(png.as_slice()).read_info().unwrap();
        let mut buf = vec![1; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (300, 2));
        assert!(buf.iter().all(|&b| b == 0));
        assert!(matches!(encode_blank_png(SurfaceSize::new(0, 5)), Err(RenderError::EncodingFailure(_))));
    }

    #[test]
    fn huge_resize_fails_without_panicking() {
        let mut s = surface(2, 2);
        assert!(s.try_resize(SurfaceSize::new(u32::MAX, u32::MAX)).is_err());
        assert_eq!(s.size(), SurfaceSize::new(2, 2));
    }

    #[test]
    fn encode_writes_png_signature() {
        let s = surface(2, 2);
        let png = s.encode_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
