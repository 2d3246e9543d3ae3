//! Source-unit to display-unit conversion.

use crate::entity::Point;
use crate::errors::RenderError;

/// Checks that `pixel_size` can be used as a divisor for projection.
pub fn check_scale(pixel_size: f64) -> Result<(), RenderError> {
    if pixel_size.is_finite() && pixel_size > 0.0 {
        Ok(())
    } else {
        Err(RenderError::InvalidScale(pixel_size))
    }
}

/// Maps a source-unit point to display units.
pub fn project(point: Point, pixel_size: f64) -> Result<Point, RenderError> {
    check_scale(pixel_size)?;
    Ok(project_unchecked(point, pixel_size))
}

/// [`project`] for callers that already ran [`check_scale`].
#[inline(always)]
pub(crate) fn project_unchecked(point: Point, pixel_size: f64) -> Point {
    Point::new(point.x / pixel_size, point.y / pixel_size)
}

/// Snaps a display-unit point to the center of the pixel it rounds to.
///
/// A one pixel wide stroke through `n + 0.5` covers exactly pixel `n`; through
/// `n` it would be smeared over two. Halves round up, like `Math.round`.
#[inline(always)]
pub fn pixel_center(point: Point) -> Point {
    Point::new((point.x + 0.5).floor() + 0.5, (point.y + 0.5).floor() + 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_divides_by_pixel_size() {
        for &(x, y, s) in &[(0.0, 0.0, 1.0), (20.0, 10.0, 2.0), (7.0, -3.0, 0.25), (1e6, 5.5, 5.0)] {
            let p = project(Point::new(x, y), s).unwrap();
            assert!((p.x - x / s).abs() < f64::EPSILON * x.abs().max(1.0) * 4.0);
            assert!((p.y - y / s).abs() < f64::EPSILON * y.abs().max(1.0) * 4.0);
        }
    }

    #[test]
    fn project_rejects_non_positive_scale() {
        for s in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(project(Point::new(1.0, 1.0), s), Err(RenderError::InvalidScale(_))));
        }
    }

    #[test]
    fn pixel_center_lands_on_half_pixels() {
        assert_eq!(pixel_center(Point::new(10.0, 10.0)), Point::new(10.5, 10.5));
        assert_eq!(pixel_center(Point::new(10.4, 9.6)), Point::new(10.5, 10.5));
        // halves round toward +inf
        assert_eq!(pixel_center(Point::new(2.5, -2.5)), Point::new(3.5, -1.5));
    }
}
