use super::Trace;
use crate::geometry::{Point, Step};

/// Step from `from` to `to`, one pixel along the dominant axis per iteration, rounding the minor axis.
///
/// The true endpoint is always plotted last. This is also the terminator of every curve stepper, which hand
/// over the final, nearly straight run of a piece to here.
pub(super) fn plot_line(trace: &mut Trace, from: Point, to: Point) {
    let step = Step::toward(from, to);
    for i in 0..step.count {
        trace.plot(step.nth(from, i));
    }
    trace.plot(to);
}

/// [`plot_line`] for the wide intermediate coordinates of the curve steppers.
pub(super) fn plot_line_wide(trace: &mut Trace, [x0, y0]: [i64; 2], [x1, y1]: [i64; 2]) {
    plot_line(
        trace,
        Point::saturating_from_wide(x0, y0),
        Point::saturating_from_wide(x1, y1),
    );
}
