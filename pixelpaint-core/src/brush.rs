//! # Brush
//!
//! A brush is a size and a shape, turned once into a [`BrushStamp`]: a handful of rectangles pressed around
//! every point a rasterizer produces. Stamps are immutable and shared by `Arc` between every action drawn
//! with the same brush, see [`StampCache`].

use std::sync::Arc;

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum BrushShape {
    #[default]
    Circle,
    Square,
}

/// A rectangle of pixels, relative to the stamped point.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct StampRect {
    pub dx: i32,
    pub dy: i32,
    pub w: u32,
    pub h: u32,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BrushStamp {
    size: u32,
    shape: BrushShape,
    rects: Vec<StampRect>,
}
impl BrushStamp {
    /// Generate the stamp for a brush. Sizes below one are treated as one.
    ///
    /// Odd sizes are centered on the stamped pixel. Even sizes are centered on its top-left corner, covering
    /// `size / 2` pixels up and left of it and `size / 2 - 1` down and right.
    #[must_use]
    pub fn new(size: u32, shape: BrushShape) -> Self {
        let size = size.max(1);
        let rects = match shape {
            // Too small to round off.
            BrushShape::Circle if size <= 2 => square(size),
            BrushShape::Square => square(size),
            BrushShape::Circle => circle(size),
        };
        Self { size, shape, rects }
    }
    /// The brush size, which doubles as the stroke weight.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }
    #[must_use]
    pub fn shape(&self) -> BrushShape {
        self.shape
    }
    #[must_use]
    pub fn rects(&self) -> &[StampRect] {
        &self.rects
    }
}

fn square(size: u32) -> Vec<StampRect> {
    // size fits, it came from a u32 halved.
    let half = (size / 2) as i32;
    vec![StampRect {
        dx: -half,
        dy: -half,
        w: size,
        h: size,
    }]
}

/// Filled circle as one run per row.
///
/// Rows come from a midpoint circle of radius `size / 2`, where each step yields the four rows related by
/// the circle's eightfold symmetry. Even sizes reuse the next odd circle and drop its center row and column.
fn circle(size: u32) -> Vec<StampRect> {
    let r = (size / 2) as i32;
    // Widest half-width seen for each row offset.
    let mut rows = std::collections::BTreeMap::<i32, i32>::new();
    let mut widen = |row: i32, half_width: i32| {
        let entry = rows.entry(row).or_insert(half_width);
        *entry = (*entry).max(half_width);
    };

    let mut x = r;
    let mut y = 0;
    let mut err = 1 - r;
    while x >= y {
        widen(y, x);
        widen(-y, x);
        widen(x, y);
        widen(-x, y);
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }

    let even = size % 2 == 0;
    rows.into_iter()
        .filter_map(|(row, half_width)| {
            if !even {
                return Some(StampRect {
                    dx: -half_width,
                    dy: row,
                    w: (2 * half_width + 1) as u32,
                    h: 1,
                });
            }
            if row == 0 || half_width == 0 {
                return None;
            }
            Some(StampRect {
                dx: -half_width,
                dy: if row > 0 { row - 1 } else { row },
                w: (2 * half_width) as u32,
                h: 1,
            })
        })
        .collect()
}

/// Shares one stamp between every user of the same size and shape.
#[derive(Clone, Default, Debug)]
pub struct StampCache {
    stamps: hashbrown::HashMap<(u32, BrushShape), Arc<BrushStamp>>,
}
impl StampCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Fetch the stamp for a brush, generating it on first use.
    pub fn get(&mut self, size: u32, shape: BrushShape) -> Arc<BrushStamp> {
        let size = size.max(1);
        self.stamps
            .entry((size, shape))
            .or_insert_with(|| Arc::new(BrushStamp::new(size, shape)))
            .clone()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.stamps.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::{BrushShape, BrushStamp, StampCache};

    fn covered(stamp: &BrushStamp) -> Vec<(i32, i32)> {
        let mut pixels = Vec::new();
        for rect in stamp.rects() {
            for y in 0..rect.h as i32 {
                for x in 0..rect.w as i32 {
                    pixels.push((rect.dx + x, rect.dy + y));
                }
            }
        }
        pixels.sort_unstable();
        pixels
    }
    fn extent(pixels: &[(i32, i32)]) -> [i32; 4] {
        [
            pixels.iter().map(|p| p.0).min().unwrap(),
            pixels.iter().map(|p| p.0).max().unwrap(),
            pixels.iter().map(|p| p.1).min().unwrap(),
            pixels.iter().map(|p| p.1).max().unwrap(),
        ]
    }

    #[test]
    fn square() {
        let stamp = BrushStamp::new(4, BrushShape::Square);
        assert_eq!(stamp.rects().len(), 1);
        assert_eq!(covered(&stamp).len(), 16);
        assert_eq!(extent(&covered(&stamp)), [-2, 1, -2, 1]);
    }
    #[test]
    fn small_circles_are_square() {
        assert_eq!(covered(&BrushStamp::new(1, BrushShape::Circle)), vec![(0, 0)]);
        assert_eq!(covered(&BrushStamp::new(0, BrushShape::Circle)), vec![(0, 0)]);
        assert_eq!(
            covered(&BrushStamp::new(2, BrushShape::Circle)),
            covered(&BrushStamp::new(2, BrushShape::Square))
        );
    }
    #[test]
    fn circle_five() {
        let stamp = BrushStamp::new(5, BrushShape::Circle);
        // Rounded corners only.
        assert_eq!(covered(&stamp).len(), 21);
        assert!(!covered(&stamp).contains(&(2, 2)));
    }
    #[test]
    fn circle_extents_match_size() {
        for size in 3..20 {
            let pixels = covered(&BrushStamp::new(size, BrushShape::Circle));
            let half = size as i32 / 2;
            let far = if size % 2 == 0 { half - 1 } else { half };
            assert_eq!(extent(&pixels), [-half, far, -half, far], "size {size}");
            // No pixel covered twice.
            let mut dedup = pixels.clone();
            dedup.dedup();
            assert_eq!(dedup.len(), pixels.len(), "size {size}");
        }
    }
    #[test]
    fn circle_symmetric() {
        for size in 3..16 {
            let pixels = covered(&BrushStamp::new(size, BrushShape::Circle));
            // Even stamps are centered on a pixel corner.
            let sum = if size % 2 == 0 { -1 } else { 0 };
            for &(x, y) in &pixels {
                assert!(pixels.binary_search(&(sum - x, y)).is_ok(), "size {size}");
                assert!(pixels.binary_search(&(x, sum - y)).is_ok(), "size {size}");
                assert!(pixels.binary_search(&(y, x)).is_ok(), "size {size}");
            }
        }
    }
    #[test]
    fn cache_shares() {
        let mut cache = StampCache::new();
        let a = cache.get(7, BrushShape::Circle);
        let b = cache.get(7, BrushShape::Circle);
        assert!(std::sync::Arc::ptr_eq(&a, &b));
        let c = cache.get(7, BrushShape::Square);
        assert!(!std::sync::Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);
    }
    #[test]
    fn shape_names() {
        use std::str::FromStr;
        assert_eq!(BrushShape::Circle.as_ref(), "circle");
        assert_eq!(BrushShape::from_str("square"), Ok(BrushShape::Square));
    }
}
