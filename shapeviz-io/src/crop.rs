//! Center cropping of rendered images

use image::DynamicImage;
use shapeviz_core::{Error, Result};
use std::path::Path;

/// Pixels to keep on each side of the image center
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropMargins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

/// Load `path` and keep the box `(cx - left, cy - top)..(cx + right, cy + bottom)`
/// around the center `(cx, cy) = (w / 2, h / 2)`.
pub fn crop_center<P: AsRef<Path>>(path: P, margins: CropMargins) -> Result<DynamicImage> {
    let path = path.as_ref();
    let image = image::open(path).map_err(image_error)?;
    crop_image(&image, margins)
}

/// Crop `input` and save the result to `output`; the format follows the
/// output extension.
pub fn crop_center_to<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q, margins: CropMargins) -> Result<()> {
    let cropped = crop_center(input, margins)?;
    cropped.save(output.as_ref()).map_err(image_error)?;
    log::info!(
        "saved {}x{} crop to {}",
        cropped.width(),
        cropped.height(),
        output.as_ref().display()
    );
    Ok(())
}

pub(crate) fn crop_image(image: &DynamicImage, margins: CropMargins) -> Result<DynamicImage> {
    let (w, h) = (image.width(), image.height());
    let (cx, cy) = (w / 2, h / 2);

    let fits = margins.left <= cx
        && margins.top <= cy
        && cx.checked_add(margins.right).is_some_and(|right| right <= w)
        && cy.checked_add(margins.bottom).is_some_and(|bottom| bottom <= h);
    if !fits {
        return Err(Error::InvalidArgument(format!(
            "crop margins {:?} exceed the {}x{} image",
            margins, w, h
        )));
    }

    Ok(image.crop_imm(
        cx - margins.left,
        cy - margins.top,
        margins.left + margins.right,
        margins.top + margins.bottom,
    ))
}

fn image_error(e: image::ImageError) -> Error {
    match e {
        image::ImageError::IoError(e) => Error::Io(e),
        other => Error::InvalidData(other.to_string()),
    }
}
