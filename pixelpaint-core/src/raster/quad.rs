use super::{line::plot_line_wide, Trace};
use crate::geometry::{round_half_up as round, Point};

/// Plot any quadratic Bézier, splitting where the x or y gradient changes sign.
///
/// A split point is where the curve's tangent is horizontal (or vertical). The new control points of each
/// half are where that tangent crosses the original control polygon.
pub(super) fn plot_quad(trace: &mut Trace, start: Point, control: Point, end: Point) {
    let mark = trace.mark();
    let [mut x0, mut y0] = [i64::from(start.x), i64::from(start.y)];
    let [mut x1, mut y1] = [i64::from(control.x), i64::from(control.y)];
    let [mut x2, mut y2] = [i64::from(end.x), i64::from(end.y)];
    let mut reversed = false;

    let x = x0 - x1;
    let y = y0 - y1;
    // Horizontal cut?
    if x * (x2 - x1) > 0 {
        let curvature = (x0 - 2 * x1 + x2) as f64;
        // Vertical cut too? Then take whichever comes first along the curve.
        if y * (y2 - y1) > 0 && ((y0 - 2 * y1 + y2) as f64 / curvature * x as f64).abs() > y.abs() as f64 {
            x0 = x2;
            x2 = x + x1;
            y0 = y2;
            y2 = y + y1;
            reversed = true;
        }
        let t = (x0 - x1) as f64 / curvature;
        let ry = (1.0 - t) * ((1.0 - t) * y0 as f64 + 2.0 * t * y1 as f64) + t * t * y2 as f64;
        // Position where dx/dt = 0
        let tx = (x0 * x2 - x1 * x1) as f64 * t / (x0 - x1) as f64;
        let cut = [round(tx), round(ry)];
        // Tangent crossing P0 P1
        let r = (y1 - y0) as f64 * (tx - x0 as f64) / (x1 - x0) as f64 + y0 as f64;
        plot_quad_segment(trace, [x0, y0], [cut[0], round(r)], cut);
        // Tangent crossing P1 P2
        let r = (y1 - y2) as f64 * (tx - x2 as f64) / (x1 - x2) as f64 + y2 as f64;
        [x0, y0] = cut;
        x1 = cut[0];
        y1 = round(r);
    }
    // Vertical cut?
    if (y0 - y1) * (y2 - y1) > 0 {
        let t = (y0 - y1) as f64 / (y0 - 2 * y1 + y2) as f64;
        let rx = (1.0 - t) * ((1.0 - t) * x0 as f64 + 2.0 * t * x1 as f64) + t * t * x2 as f64;
        // Position where dy/dt = 0
        let ty = (y0 * y2 - y1 * y1) as f64 * t / (y0 - y1) as f64;
        let cut = [round(rx), round(ty)];
        let r = (x1 - x0) as f64 * (ty - y0 as f64) / (y1 - y0) as f64 + x0 as f64;
        plot_quad_segment(trace, [x0, y0], [round(r), cut[1]], cut);
        let r = (x1 - x2) as f64 * (ty - y2 as f64) / (y1 - y2) as f64 + x2 as f64;
        [x0, y0] = cut;
        x1 = round(r);
        y1 = cut[1];
    }
    plot_quad_segment(trace, [x0, y0], [x1, y1], [x2, y2]);

    if reversed {
        trace.reverse_from(mark);
    }
}

/// Step a quadratic Bézier piece whose gradient keeps its sign on both axes.
///
/// # Panics
/// If the gradient does change sign.
pub(super) fn plot_quad_segment(
    trace: &mut Trace,
    [mut x0, mut y0]: [i64; 2],
    [x1, y1]: [i64; 2],
    [mut x2, mut y2]: [i64; 2],
) {
    let mark = trace.mark();
    let mut sx = x2 - x1;
    let mut sy = y2 - y1;
    let xx = x0 - x1;
    let yy = y0 - y1;
    let mut cur = (xx * sy - yy * sx) as f64;

    assert!(
        xx * sx <= 0 && yy * sy <= 0,
        "quadratic piece ({x0},{y0}) ({x1},{y1}) ({x2},{y2}) changes gradient sign"
    );

    // Begin with the longer part.
    let mut reversed = false;
    if sx * sx + sy * sy > xx * xx + yy * yy {
        x2 = x0;
        x0 = sx + x1;
        y2 = y0;
        y0 = sy + y1;
        cur = -cur;
        reversed = true;
    }
    if cur != 0.0 {
        let mut xx = (xx + sx) as f64;
        sx = if x0 < x2 { 1 } else { -1 };
        xx *= sx as f64;
        let mut yy = (yy + sy) as f64;
        sy = if y0 < y2 { 1 } else { -1 };
        yy *= sy as f64;
        // Differences of second degree
        let mut xy = 2.0 * xx * yy;
        xx *= xx;
        yy *= yy;
        if cur * ((sx * sy) as f64) < 0.0 {
            xx = -xx;
            yy = -yy;
            xy = -xy;
            cur = -cur;
        }
        // Differences of first degree
        let mut dx = 4.0 * sy as f64 * cur * (x1 - x0) as f64 + xx - xy;
        let mut dy = 4.0 * sx as f64 * cur * (y0 - y1) as f64 + yy - xy;
        xx += xx;
        yy += yy;
        let mut err = dx + dy + xy;
        loop {
            trace.plot_wide(x0, y0);
            if x0 == x2 && y0 == y2 {
                if reversed {
                    trace.reverse_from(mark);
                }
                return;
            }
            let step_y = 2.0 * err < dx;
            if 2.0 * err > dy {
                x0 += sx;
                dx -= xy;
                dy += yy;
                err += dy;
            }
            if step_y {
                y0 += sy;
                dy -= xy;
                dx += xx;
                err += dx;
            }
            // Gradient is about to flip, finish with a line.
            if !(dy < 0.0 && dx > 0.0) {
                break;
            }
        }
    }
    plot_line_wide(trace, [x0, y0], [x2, y2]);

    if reversed {
        trace.reverse_from(mark);
    }
}

#[cfg(test)]
mod test {
    use crate::{
        geometry::Point,
        raster::{line, quad_bezier, test_util},
    };

    #[test]
    fn endpoints_and_connected() {
        let start = Point::new(0, 0);
        let end = Point::new(12, 3);
        for control in test_util::grid(-8..=16, 4) {
            let points = quad_bezier(start, control, end);
            assert_eq!(points.first(), Some(&start), "control {control:?}");
            assert_eq!(points.last(), Some(&end), "control {control:?}");
            test_util::assert_connected(&points);
        }
    }
    #[test]
    fn reversed_input() {
        // Both directions cover the same pixels, each starting at its own start point.
        let a = Point::new(10, 0);
        let c = Point::new(-5, 9);
        let b = Point::new(2, 14);
        for (s, e) in [(a, b), (b, a)] {
            let points = quad_bezier(s, c, e);
            assert_eq!(points.first(), Some(&s));
            assert_eq!(points.last(), Some(&e));
            test_util::assert_connected(&points);
        }
    }
    #[test]
    fn collinear_control_is_line() {
        let start = Point::new(1, 2);
        let end = Point::new(13, 8);
        let control = Point::new(7, 5);
        assert_eq!(quad_bezier(start, control, end), line(start, end));

        let flat_start = Point::new(0, 4);
        let flat_end = Point::new(9, 4);
        assert_eq!(
            quad_bezier(flat_start, Point::new(3, 4), flat_end),
            line(flat_start, flat_end)
        );
    }
    #[test]
    fn single_point() {
        let p = Point::new(3, 3);
        assert_eq!(quad_bezier(p, p, p), vec![p]);
    }
    #[test]
    fn symmetric_arch_peaks() {
        let points = quad_bezier(Point::new(0, 10), Point::new(5, 0), Point::new(10, 10));
        let top = points.iter().map(|p| p.y).min().unwrap();
        // The curve reaches halfway to the control point.
        assert_eq!(top, 5);
        test_util::assert_connected(&points);
    }
    #[test]
    #[should_panic(expected = "changes gradient sign")]
    fn non_monotonic_piece_aborts() {
        let mut trace = crate::raster::Trace::default();
        super::plot_quad_segment(&mut trace, [0, 0], [5, 5], [0, 10]);
    }
}
