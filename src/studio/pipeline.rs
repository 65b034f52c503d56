use crate::error::{Error, Result};
use crate::studio::background::composite;
use crate::studio::codec::{decode, encode_png};
use crate::studio::config::{Recipe, StudioConfig};
use crate::studio::crop::{crop, CropSelector, NoCrop};
use crate::studio::enhance::{DenoiseSharpenEnhancer, ImageEnhancer};
use crate::studio::filter::apply_filter;
use crate::studio::frame::add_frame;
use crate::studio::remover::BackgroundRemover;
use image::DynamicImage;
use std::fmt;
use tracing::{debug, info, instrument};

/// Non-fatal condition raised during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// `CustomImage` was selected but no image was supplied; the photo was
    /// passed on with its original background.
    MissingCustomBackground,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCustomBackground => {
                write!(f, "no custom background supplied, original background kept")
            }
        }
    }
}

/// Output of [`Studio::render`]
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub image: DynamicImage,
    pub notices: Vec<Notice>,
}

/// Runs one image through crop, background, enhance, filter, and frame
///
/// The stage order is fixed. Cropping comes first so the remover only sees
/// the selected region, enhancement comes after compositing so a new
/// backdrop is enhanced too, and the frame is drawn last so no other stage
/// touches it.
///
/// ```rust
/// use imageops_studio::{Color, Frame, Recipe, RemoverError, Studio};
/// use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
///
/// let studio = Studio::new(|_: &[u8]| -> Result<Vec<u8>, RemoverError> {
///     Err(RemoverError::Failed("no model in this example".into()))
/// });
/// let photo = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([9, 9, 9])));
/// let recipe = Recipe {
///     frame: Frame { width: 1, color: Color::WHITE },
///     ..Recipe::default()
/// };
///
/// let rendered = studio.render(&photo, &recipe).unwrap();
/// assert_eq!(rendered.image.dimensions(), (6, 6));
/// ```
pub struct Studio {
    remover: Box<dyn BackgroundRemover>,
    crop_selector: Box<dyn CropSelector>,
    enhancer: Box<dyn ImageEnhancer>,
}

impl Studio {
    /// Builds a studio that selects the whole image when cropping is
    /// enabled and uses [`DenoiseSharpenEnhancer`].
    pub fn new(remover: impl BackgroundRemover + 'static) -> Self {
        Self {
            remover: Box::new(remover),
            crop_selector: Box::new(NoCrop),
            enhancer: Box::new(DenoiseSharpenEnhancer::default()),
        }
    }

    pub fn with_crop_selector(mut self, selector: impl CropSelector + 'static) -> Self {
        self.crop_selector = Box::new(selector);
        self
    }

    pub fn with_enhancer(mut self, enhancer: impl ImageEnhancer + 'static) -> Self {
        self.enhancer = Box::new(enhancer);
        self
    }

    /// Renders `image` according to `recipe`.
    ///
    /// `image` is never modified; every stage works on its own copy.
    ///
    /// # Errors
    ///
    /// * `Error::Configuration` - if the recipe is out of range or the crop
    ///   rectangle misses the image
    /// * `Error::Collaborator` - if background removal fails
    /// * any operation error raised by a stage
    #[instrument(
        level = "debug",
        skip_all,
        fields(width = image.width(), height = image.height())
    )]
    pub fn render(&self, image: &DynamicImage, recipe: &Recipe) -> Result<Rendered> {
        recipe.validate()?;
        let mut notices = Vec::new();

        let working = if recipe.crop {
            let rect = self.crop_selector.acquire_crop_rectangle(image)?;
            crop(image, rect)?
        } else {
            image.clone()
        };

        let (working, notice) = composite(working, &recipe.background, self.remover.as_ref())?;
        notices.extend(notice);

        let working = if recipe.enhance {
            DynamicImage::ImageRgb8(self.enhancer.enhance(&working)?)
        } else {
            working
        };

        let working = apply_filter(working, recipe.filter)?;
        let working = add_frame(working, recipe.frame.width, recipe.frame.color)?;

        debug!(
            width = working.width(),
            height = working.height(),
            color = ?working.color(),
            notices = notices.len(),
            "render finished"
        );
        Ok(Rendered {
            image: working,
            notices,
        })
    }

    /// Decodes `input`, renders it with `config`, and encodes PNG.
    ///
    /// The configuration is validated before the input is decoded. Decoded
    /// photos are normalized to RGBA before the first stage.
    pub fn render_bytes(&self, input: &[u8], config: &StudioConfig) -> Result<Vec<u8>> {
        let recipe = config.to_recipe()?;
        let image = DynamicImage::ImageRgba8(decode(input)?.into_rgba8());

        let Rendered { image, notices } = self.render(&image, &recipe)?;
        for notice in &notices {
            info!(%notice, "render completed with notice");
        }

        let image = if config.flatten_export {
            flatten(image)
        } else {
            image
        };
        encode_png(&image).map_err(Error::Encode)
    }
}

/// Drops alpha without compositing. Grayscale stays grayscale.
fn flatten(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
        DynamicImage::ImageLumaA8(_) => DynamicImage::ImageLuma8(image.into_luma8()),
        other => DynamicImage::ImageRgb8(other.into_rgb8()),
    }
}

impl fmt::Debug for Studio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Studio").finish_non_exhaustive()
    }
}
