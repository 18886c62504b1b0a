//! Scan-and-spill flood fill.

use super::PixelBuffer;
use crate::{geometry::Point, Color};

/// Fill the 4-connected region of pixels exactly matching the color under `start`.
///
/// Returns `false`, leaving the buffer untouched, if `start` is outside the buffer or already `color`. The
/// fill works on a copy of the image and swaps it back in one go.
pub fn flood_fill(buffer: &mut PixelBuffer, start: Point, color: Color) -> bool {
    let Some(target) = buffer.get(start) else {
        return false;
    };
    if target == color {
        return false;
    }
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    let mut pixels = buffer.pixels().to_vec();

    // In bounds, checked by `get` above.
    let mut stack = vec![(start.x as usize, start.y as usize)];
    while let Some((x, mut y)) = stack.pop() {
        // Climb to the top of this column's run.
        while y > 0 && pixels[(y - 1) * width + x] == target {
            y -= 1;
        }
        // Spill into neighboring columns once per contiguous run.
        let mut reach_left = false;
        let mut reach_right = false;
        while y < height && pixels[y * width + x] == target {
            pixels[y * width + x] = color;
            if x > 0 {
                if pixels[y * width + x - 1] == target {
                    if !reach_left {
                        stack.push((x - 1, y));
                        reach_left = true;
                    }
                } else {
                    reach_left = false;
                }
            }
            if x + 1 < width {
                if pixels[y * width + x + 1] == target {
                    if !reach_right {
                        stack.push((x + 1, y));
                        reach_right = true;
                    }
                } else {
                    reach_right = false;
                }
            }
            y += 1;
        }
    }

    buffer.replace_pixels(pixels);
    true
}
