use super::{line::plot_line_wide, Trace};
use crate::geometry::{round_half_up as round, Point};

/// Ellipse outline geometry, as recorded in history.
#[derive(Copy, Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    pub center: Point,
    /// Half-extents along the ellipse's own axes. Negative values are treated as their magnitude.
    pub radius: [i32; 2],
    /// Clockwise rotation in radians.
    #[serde(default)]
    pub angle: f64,
    /// Ignore the requested radii and angle, and draw a circle of the larger radius instead.
    #[serde(default)]
    pub force_circle: bool,
    /// `1` shifts the far edge in by a pixel, giving an even diameter centered between pixels. Only the
    /// unrotated path honors it.
    #[serde(default)]
    pub offset: u8,
}
impl Ellipse {
    #[must_use]
    pub fn circle(center: Point, radius: i32, even: bool) -> Self {
        Self {
            center,
            radius: [radius, radius],
            angle: 0.0,
            force_circle: true,
            offset: even.into(),
        }
    }
    #[must_use]
    pub fn rotated(center: Point, radius: [i32; 2], angle: f64) -> Self {
        Self {
            center,
            radius,
            angle,
            force_circle: false,
            offset: 0,
        }
    }
    pub(super) fn plot(&self, trace: &mut Trace) {
        let center = [i64::from(self.center.x), i64::from(self.center.y)];
        let [rx, ry] = [
            i64::from(self.radius[0]).abs(),
            i64::from(self.radius[1]).abs(),
        ];
        let offset = i64::from(self.offset.min(1));
        if self.force_circle {
            let r = rx.max(ry);
            plot_ellipse_rect(
                trace,
                [center[0] - r, center[1] - r],
                [center[0] + r - offset, center[1] + r - offset],
            );
        } else if self.angle == 0.0 || !self.angle.is_finite() {
            plot_ellipse_rect(
                trace,
                [center[0] - rx, center[1] - ry],
                [center[0] + rx - offset, center[1] + ry - offset],
            );
        } else {
            plot_rotated(trace, center, [rx, ry], self.angle);
        }
    }
}

/// Midpoint ellipse inscribed in the rectangle with corners `p0` and `p1`, inclusive. Every step plots the
/// four quadrants together.
pub(super) fn plot_ellipse_rect(trace: &mut Trace, [mut x0, mut y0]: [i64; 2], [mut x1, mut y1]: [i64; 2]) {
    let a = (x1 - x0).abs();
    let b = (y1 - y0).abs();
    let odd = b & 1;
    let (af, bf, oddf) = (a as f64, b as f64, odd as f64);
    // Error increments
    let mut dx = 4.0 * (1.0 - af) * bf * bf;
    let mut dy = 4.0 * (oddf + 1.0) * af * af;
    let mut err = dx + dy + oddf * af * af;

    if x0 > x1 {
        x0 = x1;
        x1 += a;
    }
    if y0 > y1 {
        y0 = y1;
    }
    // Start on the middle row(s).
    y0 += (b + 1) / 2;
    y1 = y0 - odd;
    let aa8 = 8.0 * af * af;
    let bb8 = 8.0 * bf * bf;

    loop {
        trace.plot_wide(x1, y0);
        trace.plot_wide(x0, y0);
        trace.plot_wide(x0, y1);
        trace.plot_wide(x1, y1);
        let e2 = 2.0 * err;
        if e2 <= dy {
            y0 += 1;
            y1 -= 1;
            dy += aa8;
            err += dy;
        }
        if e2 >= dx || 2.0 * err > dy {
            x0 += 1;
            x1 -= 1;
            dx += bb8;
            err += dx;
        }
        if x0 > x1 {
            break;
        }
    }
    // Flat ellipses stop early, finish the tips.
    while y0 - y1 <= b {
        trace.plot_wide(x0 - 1, y0);
        trace.plot_wide(x1 + 1, y0);
        y0 += 1;
        trace.plot_wide(x0 - 1, y1);
        trace.plot_wide(x1 + 1, y1);
        y1 -= 1;
    }
}

/// Rotated ellipse around `center`. The rotation is folded into an integer weight `zd` over the ellipse's
/// axis-aligned bounding box.
fn plot_rotated(trace: &mut Trace, [x, y]: [i64; 2], [a, b]: [i64; 2], angle: f64) {
    let aa = (a * a) as f64;
    let bb = (b * b) as f64;
    let sin = angle.sin();
    let zd = (aa - bb) * sin;
    // Half-extents of the bounding box.
    let xd = (aa - zd * sin).sqrt();
    let yd = (bb + zd * sin).sqrt();
    let half_w = (xd + 0.5) as i64;
    let half_h = (yd + 0.5) as i64;
    // Zero area means a rotated line, which has no conic to weigh.
    let zd = if xd * yd > 0.0 {
        zd * half_w as f64 * half_h as f64 / (xd * yd)
    } else {
        0.0
    };
    plot_rotated_rect(
        trace,
        [x - half_w, y - half_h],
        [x + half_w, y + half_h],
        (4.0 * zd * angle.cos()) as i64,
    );
}

/// Rotated ellipse inscribed in a rectangle, as four conic arcs. `zd` is the rotation weight, zero meaning
/// unrotated.
///
/// # Panics
/// If `zd` is too large for the rectangle, giving a conic weight outside of `[0, 1]`.
pub(super) fn plot_rotated_rect(trace: &mut Trace, [x0, y0]: [i64; 2], [x1, y1]: [i64; 2], zd: i64) {
    if zd == 0 {
        plot_ellipse_rect(trace, [x0, y0], [x1, y1]);
        return;
    }
    let xd = x1 - x0;
    let yd = y1 - y0;
    let mut w = (xd * yd) as f64;
    if w != 0.0 {
        w = (w - zd as f64) / (w + w);
    }
    assert!(
        (0.0..=1.0).contains(&w),
        "conic weight {w} out of range for rect ({x0},{y0}) ({x1},{y1}) with zd {zd}"
    );
    // Where each arc touches the box
    let xd = round(xd as f64 * w);
    let yd = round(yd as f64 * w);
    plot_conic_segment(trace, [x0, y0 + yd], [x0, y0], [x0 + xd, y0], 1.0 - w);
    plot_conic_segment(trace, [x0, y0 + yd], [x0, y1], [x1 - xd, y1], w);
    plot_conic_segment(trace, [x1, y1 - yd], [x1, y1], [x1 - xd, y1], 1.0 - w);
    plot_conic_segment(trace, [x1, y1 - yd], [x1, y0], [x0 + xd, y0], w);
}

/// Step a monotonic rational quadratic Bézier with weight `w` on the control point.
///
/// Very flat arcs (`w < 0.5`) can confuse the error terms, those are split once into two arcs of higher weight.
///
/// # Panics
/// If the gradient changes sign within the arc.
fn plot_conic_segment(
    trace: &mut Trace,
    [mut x0, mut y0]: [i64; 2],
    [x1, y1]: [i64; 2],
    [mut x2, mut y2]: [i64; 2],
    w: f64,
) {
    let sx = x2 - x1;
    let sy = y2 - y1;
    let mut dx = (x0 - x2) as f64;
    let mut dy = (y0 - y2) as f64;
    let mut xx = (x0 - x1) as f64;
    let mut yy = (y0 - y1) as f64;
    let mut xy = xx * sy as f64 + yy * sx as f64;
    let mut cur = xx * sy as f64 - yy * sx as f64;

    assert!(
        xx * sx as f64 <= 0.0 && yy * sy as f64 <= 0.0,
        "conic ({x0},{y0}) ({x1},{y1}) ({x2},{y2}) changes gradient sign"
    );

    let mark = trace.mark();
    let mut reversed = false;
    if cur != 0.0 && w > 0.0 {
        // Begin on the longer leg.
        if (sx * sx + sy * sy) as f64 > xx * xx + yy * yy {
            std::mem::swap(&mut x0, &mut x2);
            std::mem::swap(&mut y0, &mut y2);
            cur = -cur;
            reversed = true;
        }
        // Differences of second degree
        xx = 2.0 * (4.0 * w * sx as f64 * xx + dx * dx);
        yy = 2.0 * (4.0 * w * sy as f64 * yy + dy * dy);
        let sx: i64 = if x0 < x2 { 1 } else { -1 };
        let sy: i64 = if y0 < y2 { 1 } else { -1 };
        let (sxf, syf) = (sx as f64, sy as f64);
        xy = -2.0 * sxf * syf * (2.0 * w * xy + dx * dy);

        if cur * sxf * syf < 0.0 {
            xx = -xx;
            yy = -yy;
            xy = -xy;
            cur = -cur;
        }
        // Differences of first degree
        dx = 4.0 * w * (x1 - x0) as f64 * syf * cur + xx / 2.0 + xy;
        dy = 4.0 * w * (y0 - y1) as f64 * sxf * cur + yy / 2.0 + xy;

        if w < 0.5 && (dy > xy || dx < xy) {
            // Flat, split at the middle into two arcs of weight >= 0.5.
            let half_w = (w + 1.0) / 2.0;
            let w = w.sqrt();
            let scale = 1.0 / (w + 1.0);
            let (fx0, fy0, fx1, fy1, fx2, fy2) = (
                x0 as f64, y0 as f64, x1 as f64, y1 as f64, x2 as f64, y2 as f64,
            );
            let mid = [
                round((fx0 + 2.0 * w * fx1 + fx2) * scale / 2.0),
                round((fy0 + 2.0 * w * fy1 + fy2) * scale / 2.0),
            ];
            let control = [round((w * fx1 + fx0) * scale), round((fy1 * w + fy0) * scale)];
            plot_conic_segment(trace, [x0, y0], control, mid, half_w);
            let control = [round((w * fx1 + fx2) * scale), round((fy1 * w + fy2) * scale)];
            plot_conic_segment(trace, mid, control, [x2, y2], half_w);
            if reversed {
                trace.reverse_from(mark);
            }
            return;
        }

        let mut err = dx + dy - xy;
        loop {
            trace.plot_wide(x0, y0);
            if x0 == x2 && y0 == y2 {
                if reversed {
                    trace.reverse_from(mark);
                }
                return;
            }
            let step_x = 2.0 * err > dy;
            let step_y = 2.0 * (err + yy) < -dy;
            if 2.0 * err < dx || step_y {
                y0 += sy;
                dy += xy;
                dx += xx;
                err += dx;
            }
            if 2.0 * err > dx || step_x {
                x0 += sx;
                dx += xy;
                dy += yy;
                err += dy;
            }
            if !(dy <= xy && dx >= xy) {
                break;
            }
        }
    }
    plot_line_wide(trace, [x0, y0], [x2, y2]);
    if reversed {
        trace.reverse_from(mark);
    }
}
