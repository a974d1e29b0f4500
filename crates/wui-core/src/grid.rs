//! Row-major raster containers used by the classifier.
//!
//! Every input layer is decoded to `f32` regardless of its on-disk sample
//! type. Codes and pixel counts in this pipeline stay far below 2^24, so the
//! conversion is exact.

/// A single-band numeric raster, row-major, row 0 = first row on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Grid {
    /// Create a new Grid filled with the given value.
    pub fn new(width: usize, height: usize, fill: f32) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
        }
    }

    /// Wrap an existing row-major buffer. Returns None if the length does not
    /// match `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == width * height).then_some(Self { data, width, height })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f32) {
        self.data[row * self.width + col] = val;
    }

    /// (width, height)
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Output raster of WUI class codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassGrid {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl ClassGrid {
    /// Every cell starts at 0, the initial value the rule chain overwrites.
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self {
            data: vec![0; width * height],
            width,
            height,
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}
