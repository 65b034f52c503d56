use thiserror::Error;

/// Error type for Non-Local Means denoising
///
/// Returned when the filtering strength or window sizes cannot describe a
/// valid NL-means search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NLMeansError {
    /// The filtering parameter must be strictly positive
    #[error("Filtering parameter h must be positive, got {h}")]
    InvalidFilteringParameter { h: f32 },

    /// Window sizes must be odd positive integers
    #[error("Window size must be an odd positive integer, got {size}")]
    InvalidWindowSize { size: u32 },

    /// The search window must be larger than the template window
    #[error("Search window ({big_window}) must be larger than template window ({small_window})")]
    InvalidWindowSizes { small_window: u32, big_window: u32 },

    /// The image has no pixels
    #[error("Cannot denoise an empty image")]
    EmptyImage,
}

/// Error type for contrast limited adaptive histogram equalization
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClaheError {
    /// Clip limit must be finite and non-negative
    #[error("Clip limit must be finite and non-negative, got {0}")]
    InvalidClipLimit(f32),

    /// The tile grid must have at least one tile in each direction
    #[error("Tile grid must be at least 1x1, got {columns}x{rows}")]
    InvalidTileGrid { columns: u32, rows: u32 },

    /// The image has no pixels
    #[error("Cannot equalize an empty image")]
    EmptyImage,
}

/// Error type for Gaussian blurring
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlurError {
    /// Kernel size must be an odd positive integer
    #[error("Kernel size must be an odd positive integer, got {size}")]
    InvalidKernelSize { size: u32 },

    /// The convolution backend rejected the image or the kernel
    #[error("Gaussian blur failed: {0}")]
    Backend(String),
}

/// Error type for alpha compositing operations
///
/// This error type covers failures that can occur when blending a
/// foreground layer over a background layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositeError {
    /// Foreground and background dimensions do not match
    ///
    /// The "over" operator is defined per pixel, so both layers must
    /// cover exactly the same grid.
    #[error("Layer dimensions do not match: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },
}

/// Error type for padding operations
///
/// This error type represents failures that can occur during
/// image padding operations, typically related to size constraints.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaddingError {
    /// The padded size does not fit in `u32`
    #[error("Padded size overflows: {width}x{height} plus {border} on each side")]
    SizeOverflow { width: u32, height: u32, border: u32 },
}

/// Error reported by a background-removal collaborator
#[derive(Debug, Error)]
pub enum RemoverError {
    /// The model rejected the input or failed while running
    #[error("Background removal failed: {0}")]
    Failed(String),

    /// Any other failure raised by the backend
    #[error("Background removal backend error: {0}")]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Failure of the background-removal stage
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The working image could not be encoded for the collaborator
    #[error("Failed to encode image for background removal")]
    EncodeRequest(#[source] image::ImageError),

    /// The collaborator itself failed
    #[error(transparent)]
    Remover(#[from] RemoverError),

    /// The collaborator returned bytes that are not a decodable image
    #[error("Background removal returned an undecodable image")]
    UndecodableReply(#[source] image::ImageError),
}

/// Invalid configuration, rejected before the pipeline runs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Color strings must be `#rrggbb` or `#rgb`
    #[error("Invalid color {value:?}: expected #rrggbb or #rgb")]
    InvalidColor { value: String },

    /// Frame width exceeds the supported maximum
    #[error("Frame width {width} exceeds the maximum of {max}")]
    FrameWidthTooLarge { width: u32, max: u32 },

    /// The configuration document could not be parsed
    #[error("Malformed configuration: {0}")]
    Malformed(String),

    /// The selected crop rectangle does not overlap the image
    #[error("Crop rectangle {rect:?} does not overlap a {width}x{height} image")]
    EmptyCropRegion {
        rect: (u32, u32, u32, u32),
        width: u32,
        height: u32,
    },
}

/// Coarse classification of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    Collaborator,
    Configuration,
    Encode,
    Operation,
}

/// Error type for a studio pipeline run
///
/// Any failure aborts the run. A missing custom background is not an error:
/// it is reported as a [`crate::Notice`] instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Input bytes (photo or custom background) are not a valid image
    #[error("Failed to decode input image")]
    Decode(#[source] image::ImageError),

    /// The background-removal stage failed
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),

    /// The configuration was rejected
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// The final image could not be encoded
    #[error("Failed to encode output image")]
    Encode(#[source] image::ImageError),

    #[error(transparent)]
    NLMeans(#[from] NLMeansError),

    #[error(transparent)]
    Clahe(#[from] ClaheError),

    #[error(transparent)]
    Blur(#[from] BlurError),

    #[error(transparent)]
    Composite(#[from] CompositeError),

    #[error(transparent)]
    Padding(#[from] PaddingError),
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::Decode,
            Self::Collaborator(_) => ErrorKind::Collaborator,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Encode(_) => ErrorKind::Encode,
            Self::NLMeans(_)
            | Self::Clahe(_)
            | Self::Blur(_)
            | Self::Composite(_)
            | Self::Padding(_) => ErrorKind::Operation,
        }
    }
}

impl From<RemoverError> for Error {
    fn from(error: RemoverError) -> Self {
        Self::Collaborator(CollaboratorError::Remover(error))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
