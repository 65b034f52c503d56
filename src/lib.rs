mod error;
mod imageops_studio;
mod studio;
#[cfg(test)]
mod test_utils;
mod utils;

use image::{ImageBuffer, Pixel};

pub use error::{
    BlurError, ClaheError, CollaboratorError, CompositeError, ConfigError, Error, ErrorKind,
    NLMeansError, PaddingError, RemoverError, Result,
};
pub use imageops_studio::alpha_composite::{AlphaCompositeExt, CompositeResult};
pub use imageops_studio::clahe::Clahe;
pub use imageops_studio::content_bounds::ContentBounds;
pub use imageops_studio::convert_color::{Lab8Planes, LabConvertExt};
pub use imageops_studio::filter3x3::{Filter3x3Ext, SHARPEN_KERNEL};
pub use imageops_studio::gaussian::GaussianBlurExt;
pub use imageops_studio::nlmeans::{
    DenoiseColored, NLMeans, DEFAULT_SEARCH_WINDOW, DEFAULT_TEMPLATE_WINDOW,
};
pub use imageops_studio::padding::Padding;
pub use imageops_studio::summed_area_table::SummedAreaTable;
pub use studio::background::{composite, Background};
pub use studio::cache::{ContentCache, ContentKey};
pub use studio::codec::{decode, encode_png};
pub use studio::color::Color;
pub use studio::config::{BackgroundMode, Recipe, StudioConfig};
pub use studio::crop::{crop, ContentBoundsCrop, CropSelector, FixedCrop, NoCrop, Rect};
pub use studio::enhance::{enhance, CachedEnhancer, DenoiseSharpenEnhancer, ImageEnhancer};
pub use studio::filter::{apply_filter, FilterKind};
pub use studio::frame::{add_frame, Frame, MAX_FRAME_WIDTH};
pub use studio::pipeline::{Notice, Rendered, Studio};
pub use studio::remover::{BackgroundRemover, CachedRemover};

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
