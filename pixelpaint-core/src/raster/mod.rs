//! # Rasterizers
//!
//! Every rasterizer here turns integer geometry into an ordered sequence of pixel coordinates, with no
//! anti-aliasing and no sub-pixel positions. They are pure: the same input always produces the same points,
//! in the same order, which is the property history replay depends on. Painting those points is a separate
//! step, see [`PixelBuffer::stamp_all`].
//!
//! The curve steppers are integer-error (Bresenham family) algorithms. They only handle curve pieces whose
//! gradient does not change sign, so the general entry points split the input into such pieces first. A piece
//! that still violates that requirement means the subdivision is broken, and the stepper panics rather than
//! produce a wrong image.

mod buffer;
mod cubic;
mod ellipse;
pub mod fill;
mod line;
mod quad;

pub use buffer::PixelBuffer;
pub use ellipse::Ellipse;

use crate::geometry::Point;

/// Accumulates the output of the steppers.
///
/// Several steppers plot a piece back-to-front, or from both ends toward the middle. They record a [`Mark`]
/// and reorder what they plotted after the fact so the final sequence always runs start to end.
#[derive(Default, Debug)]
pub(crate) struct Trace {
    points: Vec<Point>,
}
#[derive(Copy, Clone)]
pub(crate) struct Mark(usize);
impl Trace {
    pub fn plot(&mut self, point: Point) {
        self.points.push(point);
    }
    pub fn plot_wide(&mut self, x: i64, y: i64) {
        self.plot(Point::saturating_from_wide(x, y));
    }
    pub fn mark(&self) -> Mark {
        Mark(self.points.len())
    }
    /// Reverse everything plotted since `mark`.
    pub fn reverse_from(&mut self, mark: Mark) {
        self.points[mark.0..].reverse();
    }
    /// Move all points of `other` onto the end of `self`, last point first.
    pub fn append_reversed(&mut self, other: Trace) {
        self.points.extend(other.points.into_iter().rev());
    }
    /// Finish the trace. Pieces share their boundary pixels, so consecutive duplicates are dropped.
    pub fn into_points(mut self) -> Vec<Point> {
        self.points.dedup();
        self.points
    }
}

/// Pixels of the straight line `from -> to`, both ends included.
///
/// Always exactly `max(|dx|, |dy|) + 1` points, each touching the one before it.
#[must_use]
pub fn line(from: Point, to: Point) -> Vec<Point> {
    let mut trace = Trace::default();
    line::plot_line(&mut trace, from, to);
    trace.into_points()
}

/// Pixels of the quadratic Bézier `start -> end` pulled toward `control`.
#[must_use]
pub fn quad_bezier(start: Point, control: Point, end: Point) -> Vec<Point> {
    let mut trace = Trace::default();
    quad::plot_quad(&mut trace, start, control, end);
    trace.into_points()
}

/// Pixels of the cubic Bézier `start -> end` with two control points.
#[must_use]
pub fn cubic_bezier(start: Point, control_a: Point, control_b: Point, end: Point) -> Vec<Point> {
    let mut trace = Trace::default();
    cubic::plot_cubic(&mut trace, start, control_a, control_b, end);
    let mut points = trace.into_points();
    // A curve whose every control point coincides has no segments to step.
    if points.is_empty() {
        points.push(start);
    }
    points
}

/// Pixels of an ellipse outline. See [`Ellipse`] for the circle and rotated variants.
///
/// Unlike the open curves, this is a set of pixels rather than a path, ordered by the stepper's quadrant
/// interleaving.
#[must_use]
pub fn ellipse(shape: &Ellipse) -> Vec<Point> {
    let mut trace = Trace::default();
    shape.plot(&mut trace);
    trace.into_points()
}

#[cfg(test)]
pub(crate) mod test_util {
    use crate::geometry::Point;

    /// Assert no gaps: every point touches the point before it.
    pub fn assert_connected(points: &[Point]) {
        for pair in points.windows(2) {
            assert!(pair[0].touches(pair[1]), "gap between {:?} and {:?}", pair[0], pair[1]);
        }
    }
    /// Small deterministic grid of points to sweep inputs over.
    pub fn grid(range: std::ops::RangeInclusive<i32>, step: usize) -> Vec<Point> {
        range
            .clone()
            .step_by(step)
            .flat_map(|x| range.clone().step_by(step).map(move |y| Point::new(x, y)))
            .collect()
    }
}
