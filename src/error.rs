//! Error type shared by all selection entry points.

/// Errors raised while validating selection input.
///
/// An empty selection is not an error; it is reported as `bbox: None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// Width or height is zero, or the buffer size overflows `usize`.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Pixel buffer length does not match `width * height * 4`.
    #[error("pixel buffer has {actual} bytes, expected {expected} (width * height * 4)")]
    BufferLength { expected: usize, actual: usize },

    /// A tuning parameter is out of range.
    #[error("invalid selection configuration: {0}")]
    InvalidConfig(String),

    /// Seed point lies outside the image.
    #[error("seed point ({x}, {y}) is outside the {width}x{height} image")]
    SeedOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Initial mask length does not match `width * height`.
    #[error("initial mask has {actual} entries, expected {expected}")]
    MaskLength { expected: usize, actual: usize },

    /// Requested region does not fit inside the source image.
    #[error("region {x},{y} {width}x{height} is outside the source image")]
    RegionOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

pub type Result<T> = std::result::Result<T, SelectError>;
