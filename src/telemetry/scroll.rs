/// One RGB cell of the sparkline grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Pixel {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Base intensity of the first bar pixel and the step added per pixel
const BAR_BASE: usize = 32;
const BAR_STEP: usize = 24;

/// Fixed-size grid of pixels that scrolls one column per sample.
///
/// Column 0 holds the newest sample, column `width - 1` the oldest.
/// Ingress is painted in the red channel as a bar hanging from row 0,
/// egress in the blue channel as a bar standing on the last row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollBuffer {
    width: usize,
    height: usize,
    cells: Vec<Pixel>,
}

impl ScrollBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Pixel::default(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at `(x, y)`. Panics if out of range.
    pub fn pixel(&self, x: usize, y: usize) -> Pixel {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of range");
        self.cells[y * self.width + x]
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x < self.width && y < self.height {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Row `y`, newest column first
    pub fn row(&self, y: usize) -> &[Pixel] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    /// Scroll one column and paint the newest one from two ratios.
    ///
    /// Ratios are expected in `[0, 1]`. Anything else is saturated into the
    /// grid: negative or NaN draws nothing, above 1 fills the column.
    pub fn advance(&mut self, ingress: f64, egress: f64) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        self.shift_right();

        let ingress_rows = bar_rows(ingress, self.height);
        for y in 0..ingress_rows {
            let idx = self.index(0, y);
            self.cells[idx].r = intensity(y);
        }

        let egress_rows = bar_rows(egress, self.height);
        for y in (self.height - egress_rows..self.height).rev() {
            let idx = self.index(0, y);
            self.cells[idx].b = intensity(self.height - y);
        }
    }

    fn shift_right(&mut self) {
        for y in 0..self.height {
            let row = &mut self.cells[y * self.width..(y + 1) * self.width];
            row.copy_within(0..self.width - 1, 1);
            row[0] = Pixel::default();
        }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }
}

/// `floor(ratio * height)` saturated into `[0, height]`
fn bar_rows(ratio: f64, height: usize) -> usize {
    // `as` saturates: NaN and negatives become 0.
    ((ratio * height as f64).floor() as usize).min(height)
}

/// `32 + step * 24`, clamped to a channel
fn intensity(step: usize) -> u8 {
    step.saturating_mul(BAR_STEP)
        .saturating_add(BAR_BASE)
        .min(u8::MAX as usize) as u8
}
