use super::{line::plot_line_wide, quad::plot_quad_segment, Trace};
use crate::geometry::{round_half_up as round, Point};

/// Tolerance of the curve constraint check, in squared pixels.
const CONSTRAINT_EPSILON: f64 = 0.01;

/// Plot any cubic Bézier.
///
/// The gradient of each axis is a quadratic in `t`, so each axis flips direction at most twice. The curve is
/// cut at every such root, giving at most five monotonic pieces. Each piece's control points are derived from
/// the polynomial coefficients directly, then scaled so the piece ends on whole pixels.
///
/// The parameter runs over `[-1, 1]` here rather than `[0, 1]`, which keeps the coefficients integral.
pub(super) fn plot_cubic(trace: &mut Trace, start: Point, control_a: Point, control_b: Point, end: Point) {
    let [x0, y0] = [i64::from(start.x), i64::from(start.y)];
    let [x1, y1] = [i64::from(control_a.x), i64::from(control_a.y)];
    let [x2, y2] = [i64::from(control_b.x), i64::from(control_b.y)];
    let [x3, y3] = [i64::from(end.x), i64::from(end.y)];

    let xc = x0 + x1 - x2 - x3;
    let xa = xc - 4 * (x1 - x2);
    let xb = x0 - x1 - x2 + x3;
    let xd = xb + 4 * (x1 + x2);
    let yc = y0 + y1 - y2 - y3;
    let ya = yc - 4 * (y1 - y2);
    let yb = y0 - y1 - y2 + y3;
    let yd = yb + 4 * (y1 + y2);

    let mut cuts = smallvec::SmallVec::<[f64; 5]>::new();
    gradient_roots(&mut cuts, xa, xb, xc);
    gradient_roots(&mut cuts, ya, yb, yc);
    cuts.sort_by(f64::total_cmp);
    cuts.dedup();
    cuts.push(1.0);

    let [xa, xb, xc, xd] = [xa as f64, xb as f64, xc as f64, xd as f64];
    let [ya, yb, yc, yd] = [ya as f64, yb as f64, yc as f64, yd as f64];

    let (mut px, mut py) = (x0, y0);
    let (mut fx0, mut fy0) = (x0 as f64, y0 as f64);
    let mut t1 = -1.0;
    for &t2 in &cuts {
        // Control points of the piece t1..t2, relative to its start.
        let mut fx1 = (t1 * (t1 * xb - 2.0 * xc) - t2 * (t1 * (t1 * xa - 2.0 * xb) + xc) + xd) / 8.0 - fx0;
        let mut fy1 = (t1 * (t1 * yb - 2.0 * yc) - t2 * (t1 * (t1 * ya - 2.0 * yb) + yc) + yd) / 8.0 - fy0;
        let mut fx2 = (t2 * (t2 * xb - 2.0 * xc) - t1 * (t2 * (t2 * xa - 2.0 * xb) + xc) + xd) / 8.0 - fx0;
        let mut fy2 = (t2 * (t2 * yb - 2.0 * yc) - t1 * (t2 * (t2 * ya - 2.0 * yb) + yc) + yd) / 8.0 - fy0;
        let fx3 = (t2 * (t2 * (3.0 * xb - t2 * xa) - 3.0 * xc) + xd) / 8.0;
        let fy3 = (t2 * (t2 * (3.0 * yb - t2 * ya) - 3.0 * yc) + yd) / 8.0;
        fx0 -= fx3;
        fy0 -= fy3;
        let x3 = round(fx3);
        let y3 = round(fy3);
        // Stretch the control points to the rounded end.
        if fx0 != 0.0 {
            fx0 = (px - x3) as f64 / fx0;
            fx1 *= fx0;
            fx2 *= fx0;
        }
        if fy0 != 0.0 {
            fy0 = (py - y3) as f64 / fy0;
            fy1 *= fy0;
            fy2 *= fy0;
        }
        if px != x3 || py != y3 {
            plot_cubic_segment(
                trace,
                [px, py],
                [px as f64 + fx1, py as f64 + fy1],
                [px as f64 + fx2, py as f64 + fy2],
                [x3, y3],
            );
        }
        px = x3;
        py = y3;
        fx0 = fx3;
        fy0 = fy3;
        t1 = t2;
    }
}

/// Roots in `(-1, 1)` of one axis' gradient, `a t² - 2 b t + c` up to scale.
fn gradient_roots(roots: &mut smallvec::SmallVec<[f64; 5]>, a: i64, b: i64, c: i64) {
    if a == 0 {
        // Gradient is linear, one change at most.
        if c.abs() < 2 * b.abs() {
            roots.push(c as f64 / (2.0 * b as f64));
        }
        return;
    }
    let discriminant = (b * b - a * c) as f64;
    if discriminant > 0.0 {
        let root = discriminant.sqrt();
        for t in [(b as f64 - root) / a as f64, (b as f64 + root) / a as f64] {
            if t.abs() < 1.0 {
                roots.push(t);
            }
        }
    }
}

/// Check that a piece's control points do not turn back on themselves. Subdivision guarantees this, so a
/// violation is a bug, not bad input.
fn satisfies_constraint(p0: f64, p1: f64, p2: f64, p3: f64, a: f64, b: f64, c: f64) -> bool {
    (p1 - p0) * (p2 - p3) < CONSTRAINT_EPSILON
        && ((p3 - p0) * (p1 - p2) < CONSTRAINT_EPSILON || b * b < a * c + CONSTRAINT_EPSILON)
}

/// Step a monotonic cubic piece. The piece is walked from both ends toward the middle, and whatever is left
/// between the two fronts (a cusp, or the tight part of a self-intersection) is closed with a line.
///
/// # Panics
/// If the control points violate the curve constraint.
#[allow(clippy::too_many_lines)]
fn plot_cubic_segment(
    trace: &mut Trace,
    [mut x0, mut y0]: [i64; 2],
    [x1, y1]: [f64; 2],
    [x2, y2]: [f64; 2],
    [mut x3, mut y3]: [i64; 2],
) {
    let mut sx: i64 = if x0 < x3 { 1 } else { -1 };
    let mut sy: i64 = if y0 < y3 { 1 } else { -1 };
    let (fx0, fy0, fx3, fy3) = (x0 as f64, y0 as f64, x3 as f64, y3 as f64);
    let xc = -(fx0 + x1 - x2 - fx3).abs();
    let xa = xc - 4.0 * sx as f64 * (x1 - x2);
    let mut xb = sx as f64 * (fx0 - x1 - x2 + fx3);
    let yc = -(fy0 + y1 - y2 - fy3).abs();
    let ya = yc - 4.0 * sy as f64 * (y1 - y2);
    let mut yb = sy as f64 * (fy0 - y1 - y2 + fy3);

    assert!(
        satisfies_constraint(fx0, x1, x2, fx3, xa, xb, xc)
            && satisfies_constraint(fy0, y1, y2, fy3, ya, yb, yc),
        "cubic piece ({x0},{y0}) ({x1},{y1}) ({x2},{y2}) ({x3},{y3}) violates the curve constraint"
    );

    // No cubic term left, hand over to the quadratic stepper.
    if xa == 0.0 && ya == 0.0 {
        let mx = ((3.0 * x1 - fx0 + 1.0) / 2.0).floor() as i64;
        let my = ((3.0 * y1 - fy0 + 1.0) / 2.0).floor() as i64;
        plot_quad_segment(trace, [x0, y0], [mx, my], [x3, y3]);
        return;
    }

    // Squared lengths of the two control legs
    let mut leg_length = (x1 - fx0) * (x1 - fx0) + (y1 - fy0) * (y1 - fy0) + 1.0;
    let other_leg_length = (x2 - fx3) * (x2 - fx3) + (y2 - fy3) * (y2 - fy3) + 1.0;

    // The far leg is stepped backwards from the end, kept aside to be reversed on completion.
    let mut tail = Trace::default();
    for leg in [true, false] {
        let out: &mut Trace = if leg { &mut *trace } else { &mut tail };

        let mut ab = xa * yb - xb * ya;
        let mut ac = xa * yc - xc * ya;
        let mut bc = xb * yc - xc * yb;
        // Part of a self-intersection loop?
        let mut ex = ab * (ab + ac - 3.0 * bc) + ac * ac;
        // Sub-pixel resolution
        let f: i64 = if ex > 0.0 {
            1
        } else {
            (1.0 + 1024.0 / leg_length).sqrt() as i64
        };
        let ff = f as f64;
        ab *= ff;
        ac *= ff;
        bc *= ff;
        ex *= ff * ff;
        // Differences of first degree
        let mut xy = 9.0 * (ab + ac + bc) / 8.0;
        let mut cb = 8.0 * (xa - ya);
        let mut dx = 27.0 * (8.0 * ab * (yb * yb - ya * yc) + ex * (ya + 2.0 * yb + yc)) / 64.0
            - ya * ya * (xy - ya);
        let mut dy = 27.0 * (8.0 * ab * (xb * xb - xa * xc) - ex * (xa + 2.0 * xb + xc)) / 64.0
            - xa * xa * (xy + xa);
        // Differences of second degree
        let mut xx = 3.0
            * (3.0 * ab * (3.0 * yb * yb - ya * ya - 2.0 * ya * yc)
                - ya * (3.0 * ac * (ya + yb) + ya * cb))
            / 4.0;
        let mut yy = 3.0
            * (3.0 * ab * (3.0 * xb * xb - xa * xa - 2.0 * xa * xc)
                - xa * (3.0 * ac * (xa + xb) + xa * cb))
            / 4.0;
        xy = xa * ya * (6.0 * ab + 6.0 * ac - 3.0 * bc + cb);
        ac = ya * ya;
        cb = xa * xa;
        xy = 3.0 * (xy + 9.0 * ff * (cb * yb * yc - xb * xc * ac) - 18.0 * xb * yb * ab) / 8.0;

        // Inside a self-intersection loop the signs flip.
        if ex < 0.0 {
            dx = -dx;
            dy = -dy;
            xx = -xx;
            yy = -yy;
            xy = -xy;
            ac = -ac;
            cb = -cb;
        }
        // Differences of third degree
        ab = 6.0 * ya * ac;
        ac = -6.0 * xa * ac;
        bc = 6.0 * ya * cb;
        cb = -6.0 * xa * cb;
        // Error of the first step
        dx += xy;
        ex = dx + dy;
        dy += xy;

        let mut fx = f;
        let mut fy = f;
        // Once the next pixel is known to be valid, compare against the epsilon instead of `xy`.
        let mut ahead = false;
        'pixels: while x0 != x3 && y0 != y3 {
            out.plot_wide(x0, y0);
            // Sub-steps of one pixel
            loop {
                let limit = if ahead { CONSTRAINT_EPSILON } else { xy };
                if dx > limit || dy < limit {
                    break 'pixels;
                }
                let step_y = 2.0 * ex - dy;
                if 2.0 * ex >= dx {
                    fx -= 1;
                    dx += xx;
                    ex += dx;
                    xy += ac;
                    dy += xy;
                    yy += bc;
                    xx += ab;
                }
                if step_y <= 0.0 {
                    fy -= 1;
                    dy += yy;
                    ex += dy;
                    xy += bc;
                    dx += xy;
                    xx += ac;
                    yy += cb;
                }
                if !(fx > 0 && fy > 0) {
                    break;
                }
            }
            if 2 * fx <= f {
                x0 += sx;
                fx += f;
            }
            if 2 * fy <= f {
                y0 += sy;
                fy += f;
            }
            if !ahead && dx < 0.0 && dy > 0.0 {
                ahead = true;
            }
        }
        // Swap ends, and try again from the other side.
        std::mem::swap(&mut x0, &mut x3);
        std::mem::swap(&mut y0, &mut y3);
        sx = -sx;
        sy = -sy;
        xb = -xb;
        yb = -yb;
        leg_length = other_leg_length;
    }

    // Swapped twice, `x0` is back on the near leg's side.
    plot_line_wide(trace, [x0, y0], [x3, y3]);
    trace.append_reversed(tail);
}

#[cfg(test)]
mod test {
    use crate::{
        geometry::Point,
        raster::{cubic_bezier, line, quad_bezier, test_util},
    };

    #[test]
    fn endpoints_and_connected() {
        let start = Point::new(0, 0);
        let end = Point::new(20, 4);
        let controls = test_util::grid(-10..=30, 10);
        for &a in &controls {
            for &b in &controls {
                let points = cubic_bezier(start, a, b, end);
                assert_eq!(points.first(), Some(&start), "controls {a:?} {b:?}");
                assert_eq!(points.last(), Some(&end), "controls {a:?} {b:?}");
                test_util::assert_connected(&points);
            }
        }
    }
    #[test]
    fn s_curve() {
        let start = Point::new(0, 0);
        let end = Point::new(30, 30);
        let points = cubic_bezier(start, Point::new(30, 0), Point::new(0, 30), end);
        assert_eq!(points.first(), Some(&start));
        assert_eq!(points.last(), Some(&end));
        test_util::assert_connected(&points);
        // A single monotonic piece never leaves the box spanned by its ends.
        assert!(points
            .iter()
            .all(|p| (0..=30).contains(&p.x) && (0..=30).contains(&p.y)));
    }
    #[test]
    fn straight_controls_is_line() {
        let start = Point::new(0, 0);
        let end = Point::new(9, 0);
        let points = cubic_bezier(start, Point::new(3, 0), Point::new(6, 0), end);
        assert_eq!(points, line(start, end));
    }
    #[test]
    fn degenerate_cubic_is_quadratic() {
        // Control points at the 2/3 positions of a quadratic's control polygon.
        let start = Point::new(0, 0);
        let end = Point::new(12, 0);
        let points = cubic_bezier(start, Point::new(4, 8), Point::new(8, 8), end);
        let quad = quad_bezier(start, Point::new(6, 12), end);
        assert_eq!(points.first(), quad.first());
        assert_eq!(points.last(), quad.last());
        let cubic_top = points.iter().map(|p| p.y).max();
        let quad_top = quad.iter().map(|p| p.y).max();
        assert_eq!(cubic_top, quad_top);
    }
    #[test]
    fn single_point() {
        let p = Point::new(-2, 5);
        assert_eq!(cubic_bezier(p, p, p, p), vec![p]);
    }
    #[test]
    #[should_panic(expected = "violates the curve constraint")]
    fn reversing_controls_abort() {
        // Both controls overshoot the end, so the piece turns back on itself.
        let mut trace = crate::raster::Trace::default();
        super::plot_cubic_segment(&mut trace, [0, 0], [10.0, 0.0], [10.0, 0.0], [5, 0]);
    }
}
