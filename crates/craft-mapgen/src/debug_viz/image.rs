//! A 2D debug image represented as a flat array of RGBA pixels.

/// A debug image for map visualization, stored as row-major RGBA pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DebugImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data in row-major RGBA format. Length = `width * height * 4`.
    pub pixels: Vec<u8>,
}

impl DebugImage {
    /// Create a transparent black image with the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Set a single opaque pixel.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_rgb(&mut self, x: u32, y: u32, (r, g, b): (u8, u8, u8)) {
        let idx = self.offset(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&[r, g, b, 255]);
    }

    /// Get a pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let idx = self.offset(x, y);
        (
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Count the number of unique colors (ignoring alpha) in the image.
    pub fn unique_color_count(&self) -> usize {
        let mut colors = std::collections::HashSet::new();
        for chunk in self.pixels.chunks_exact(4) {
            colors.insert((chunk[0], chunk[1], chunk[2]));
        }
        colors.len()
    }

    /// Places images side by side, left to right, top-aligned.
    ///
    /// Used to lay out a row of adjacent regions; rows of differing heights
    /// leave the shorter images padded with transparent pixels.
    pub fn concat_horizontal(images: &[DebugImage]) -> DebugImage {
        let width = images.iter().map(|img| img.width).sum();
        let height = images.iter().map(|img| img.height).max().unwrap_or(0);
        let mut out = DebugImage::new(width, height);

        let mut x0 = 0;
        for img in images {
            let row_bytes = img.width as usize * 4;
            for y in 0..img.height {
                let src = img.offset(0, y);
                let dst = out.offset(x0, y);
                out.pixels[dst..dst + row_bytes].copy_from_slice(&img.pixels[src..src + row_bytes]);
            }
            x0 += img.width;
        }
        out
    }

    /// Stacks images top to bottom, left-aligned.
    pub fn concat_vertical(images: &[DebugImage]) -> DebugImage {
        let width = images.iter().map(|img| img.width).max().unwrap_or(0);
        let height = images.iter().map(|img| img.height).sum();
        let mut out = DebugImage::new(width, height);

        let mut y0 = 0;
        for img in images {
            let row_bytes = img.width as usize * 4;
            for y in 0..img.height {
                let src = img.offset(0, y);
                let dst = out.offset(0, y0 + y);
                out.pixels[dst..dst + row_bytes].copy_from_slice(&img.pixels[src..src + row_bytes]);
            }
            y0 += img.height;
        }
        out
    }
}
