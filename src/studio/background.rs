use crate::error::{CollaboratorError, Result};
use crate::imageops_studio::alpha_composite::AlphaCompositeExt;
use crate::studio::codec::encode_png;
use crate::studio::color::Color;
use crate::studio::pipeline::Notice;
use crate::studio::remover::BackgroundRemover;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};
use tracing::{debug, instrument, warn};

/// What to do with the area behind the subject
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Background {
    /// Keep the photo as it is
    #[default]
    Original,
    /// Cut the subject out onto a transparent canvas
    RemoveBackground,
    /// Put the subject on a solid color
    ColorFill(Color),
    /// Put the subject on another image, stretched to fit.
    ///
    /// `None` means the image was never supplied. The remover still runs,
    /// but the photo is returned unchanged and a
    /// [`Notice::MissingCustomBackground`] is raised.
    CustomImage(Option<DynamicImage>),
}

impl Background {
    /// Whether this mode needs the background remover at all
    pub const fn needs_subject(&self) -> bool {
        !matches!(self, Self::Original)
    }
}

/// Replaces the background of `source` according to `background`.
///
/// Every mode except [`Background::Original`] sends `source` to `remover`
/// as PNG. The composited modes return an RGBA image the size of the
/// subject; a custom mode without an image returns `source` as it was.
///
/// # Errors
///
/// * `Error::Collaborator` - if the request cannot be encoded, the remover
///   fails, or its reply is not a decodable image
#[instrument(level = "debug", skip_all, fields(mode = background.label()))]
pub fn composite(
    source: DynamicImage,
    background: &Background,
    remover: &dyn BackgroundRemover,
) -> Result<(DynamicImage, Option<Notice>)> {
    if !background.needs_subject() {
        return Ok((source, None));
    }

    let subject = extract_subject(&source, remover)?;
    let (width, height) = subject.dimensions();

    let composited = match background {
        Background::Original | Background::RemoveBackground => subject,
        Background::ColorFill(color) => subject.composite_over_color(color.to_rgb()),
        Background::CustomImage(Some(image)) => {
            let backdrop = fit_backdrop(image, width, height);
            subject.composite_over(&backdrop)?
        }
        Background::CustomImage(None) => {
            warn!("custom background selected without an image, keeping the original photo");
            return Ok((source, Some(Notice::MissingCustomBackground)));
        }
    };

    Ok((DynamicImage::ImageRgba8(composited), None))
}

fn extract_subject(source: &DynamicImage, remover: &dyn BackgroundRemover) -> Result<RgbaImage> {
    let request = encode_png(source).map_err(CollaboratorError::EncodeRequest)?;
    let reply = remover
        .remove_background(&request)
        .map_err(CollaboratorError::Remover)?;
    let subject = image::load_from_memory(&reply)
        .map_err(CollaboratorError::UndecodableReply)?
        .into_rgba8();
    debug!(
        width = subject.width(),
        height = subject.height(),
        "subject extracted"
    );
    Ok(subject)
}

/// Stretches `image` to exactly `width` x `height`, ignoring aspect ratio.
fn fit_backdrop(image: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    if image.dimensions() == (width, height) {
        return image.to_rgba8();
    }
    debug!(
        from = ?image.dimensions(),
        to = ?(width, height),
        "resizing custom background"
    );
    image
        .resize_exact(width, height, FilterType::Triangle)
        .into_rgba8()
}

impl Background {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::RemoveBackground => "remove_background",
            Self::ColorFill(_) => "color_fill",
            Self::CustomImage(_) => "custom_image",
        }
    }
}
