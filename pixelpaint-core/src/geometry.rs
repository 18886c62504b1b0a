//! Integer pixel geometry, and the small amount of trigonometry needed to step between pixels.

/// A pixel coordinate. History only ever stores integer points - anything fractional is
/// rounded with [`round_half_up`] before it is recorded.
#[derive(
    Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Debug, serde::Serialize, serde::Deserialize,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}
impl Point {
    pub const ORIGIN: Self = Self::new(0, 0);
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
    /// Displacement from `self` to `to`, widened so it can never overflow.
    #[must_use]
    pub fn delta(self, to: Self) -> [i64; 2] {
        [
            i64::from(to.x) - i64::from(self.x),
            i64::from(to.y) - i64::from(self.y),
        ]
    }
    /// Chebyshev distance, the number of king-moves between the two pixels.
    #[must_use]
    pub fn chebyshev(self, to: Self) -> u64 {
        let [dx, dy] = self.delta(to);
        dx.unsigned_abs().max(dy.unsigned_abs())
    }
    /// True if `to` is this pixel or one of its eight neighbors.
    #[must_use]
    pub fn touches(self, to: Self) -> bool {
        self.chebyshev(to) <= 1
    }
    /// Construct from wide integer coordinates, saturating at the edges of `i32`.
    #[must_use]
    pub fn saturating_from_wide(x: i64, y: i64) -> Self {
        use az::SaturatingAs;
        Self::new(x.saturating_as(), y.saturating_as())
    }
    /// Round a fractional position onto the pixel grid.
    #[must_use]
    pub fn round(x: f64, y: f64) -> Self {
        Self::saturating_from_wide(round_half_up(x), round_half_up(y))
    }
}
impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}
impl From<Point> for [i32; 2] {
    fn from(value: Point) -> Self {
        [value.x, value.y]
    }
}

/// `floor(v + 0.5)`, the rounding every rasterizer in this crate uses.
///
/// Ties always go toward positive infinity, unlike [`f64::round`] which rounds away from zero. Saturates
/// instead of wrapping for values outside of `i64`, and NaN becomes zero.
#[must_use]
pub fn round_half_up(v: f64) -> i64 {
    use az::SaturatingAs;
    if v.is_nan() {
        0
    } else {
        (v + 0.5).floor().saturating_as()
    }
}

/// A per-iteration step along a displacement, where the dominant axis moves by exactly one pixel.
///
/// For an octant with `|dx| >= |dy|` this is `(±1, dy/dx)`, otherwise `(dx/dy, ±1)`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Step {
    pub x: f64,
    pub y: f64,
    /// Number of whole steps to cover the displacement.
    pub count: u64,
}
impl Step {
    /// Compute the step toward a displacement. The ratio comes from the integer deltas, so a step landing
    /// exactly on a half pixel rounds the same way on every platform.
    #[must_use]
    pub fn toward(from: Point, to: Point) -> Self {
        let [dx, dy] = from.delta(to);
        let count = from.chebyshev(to);
        if count == 0 {
            return Self {
                x: 0.0,
                y: 0.0,
                count,
            };
        }
        let n = count as f64;
        Self {
            x: dx as f64 / n,
            y: dy as f64 / n,
            count,
        }
    }
    /// The pixel reached after `i` steps from `origin`.
    #[must_use]
    pub fn nth(&self, origin: Point, i: u64) -> Point {
        let i = i as f64;
        Point::round(
            f64::from(origin.x) + self.x * i,
            f64::from(origin.y) + self.y * i,
        )
    }
}

#[cfg(test)]
mod test {
    use super::{round_half_up, Point, Step};

    #[test]
    fn rounding_ties_up() {
        assert_eq!(round_half_up(0.5), 1);
        assert_eq!(round_half_up(-0.5), 0);
        assert_eq!(round_half_up(-1.5), -1);
        assert_eq!(round_half_up(2.49), 2);
        assert_eq!(round_half_up(f64::NAN), 0);
        assert_eq!(round_half_up(f64::INFINITY), i64::MAX);
    }
    #[test]
    fn step_dominant_axis_is_unit() {
        for to in [
            Point::new(7, 3),
            Point::new(-7, 3),
            Point::new(2, -9),
            Point::new(-4, -4),
        ] {
            let step = Step::toward(Point::ORIGIN, to);
            assert_eq!(step.x.abs().max(step.y.abs()), 1.0, "{to:?}");
            assert!(step.x.abs().min(step.y.abs()) <= 1.0);
            assert_eq!(step.nth(Point::ORIGIN, step.count), to);
        }
    }
    #[test]
    fn zero_step() {
        let step = Step::toward(Point::new(3, 3), Point::new(3, 3));
        assert_eq!(step.count, 0);
    }
}
