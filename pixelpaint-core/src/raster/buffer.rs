use crate::{brush::BrushStamp, geometry::Point, Color};

/// An owned, row-major RGBA8 image.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    /// Invariant: `pixels.len() == width * height`
    pixels: Vec<Color>,
}
impl PixelBuffer {
    /// Create a fully transparent buffer.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
        }
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
    /// View as packed RGBA8 bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
    /// Index of a pixel, or `None` if outside the buffer.
    #[must_use]
    pub fn index_of(&self, point: Point) -> Option<usize> {
        let x = u32::try_from(point.x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(point.y).ok().filter(|&y| y < self.height)?;
        Some(y as usize * self.width as usize + x as usize)
    }
    #[must_use]
    pub fn get(&self, point: Point) -> Option<Color> {
        self.index_of(point).map(|idx| self.pixels[idx])
    }
    /// Overwrite a pixel. Out-of-bounds writes are clipped, returning `false`.
    pub fn set(&mut self, point: Point, color: Color) -> bool {
        match self.index_of(point) {
            Some(idx) => {
                self.pixels[idx] = color;
                true
            }
            None => false,
        }
    }
    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(Color::TRANSPARENT);
    }
    /// Swap in a whole new image of the same dimensions, in one go.
    ///
    /// # Panics
    /// If `pixels` is not exactly `width * height` long.
    pub fn replace_pixels(&mut self, pixels: Vec<Color>) {
        assert_eq!(
            pixels.len(),
            self.pixels.len(),
            "replacement pixels do not match buffer dimensions"
        );
        self.pixels = pixels;
    }
    /// Overwrite a rectangle of pixels, clipped to the buffer.
    pub fn fill_rect(&mut self, origin: Point, width: u32, height: u32, color: Color) {
        let clip = |start: i32, len: u32, max: u32| -> (usize, usize) {
            let start = i64::from(start);
            let end = start + i64::from(len);
            let lo = start.clamp(0, i64::from(max));
            let hi = end.clamp(0, i64::from(max));
            // Both within [0, max], which fits usize.
            (lo as usize, hi as usize)
        };
        let (x0, x1) = clip(origin.x, width, self.width);
        let (y0, y1) = clip(origin.y, height, self.height);
        if x0 >= x1 {
            return;
        }
        let stride = self.width as usize;
        for row in self.pixels.chunks_exact_mut(stride).take(y1).skip(y0) {
            row[x0..x1].fill(color);
        }
    }
    /// Press a brush stamp centered on `at`. Stamping overwrites, it never blends, so stamping the same
    /// point twice is harmless.
    pub fn stamp(&mut self, at: Point, stamp: &BrushStamp, color: Color) {
        for rect in stamp.rects() {
            let origin = Point::new(at.x.saturating_add(rect.dx), at.y.saturating_add(rect.dy));
            self.fill_rect(origin, rect.w, rect.h, color);
        }
    }
    /// Stamp every point of a rasterized path, in order.
    pub fn stamp_all(&mut self, points: &[Point], stamp: &BrushStamp, color: Color) {
        for &point in points {
            self.stamp(point, stamp, color);
        }
    }
    /// Recolor every pixel exactly equal to `from`. Returns the number of pixels changed.
    pub fn replace_color(&mut self, from: Color, to: Color) -> usize {
        if from == to {
            return 0;
        }
        let mut changed = 0;
        for pixel in self.pixels.iter_mut().filter(|pixel| **pixel == from) {
            *pixel = to;
            changed += 1;
        }
        changed
    }
}
