use std::path::Path;

use linemorph_image::{Image, ImageSize};

use crate::error::IoError;

/// Reads an image from the given file path as 8-bit RGB.
///
/// The method reads any format supported by the image crate. Grayscale and
/// RGBA images are converted to three channels, alpha is dropped.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An RGB image with three channels (rgb8).
pub fn read_image_rgb8(file_path: impl AsRef<Path>) -> Result<Image<u8, 3>, IoError> {
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path));
    }

    let img = image::ImageReader::open(&file_path)?
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    log::debug!("read {} from {}", size, file_path.display());

    Ok(Image::new(size, img.into_rgb8().into_raw())?)
}

/// Writes an 8-bit RGB image to the given file path.
///
/// The encoder is picked from the file extension, e.g. `.png` or `.jpg`.
///
/// # Arguments
///
/// * `file_path` - The path to the output file.
/// * `image` - The image to write.
pub fn write_image_rgb8(file_path: impl AsRef<Path>, image: &Image<u8, 3>) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    image::save_buffer(
        file_path,
        image.as_slice(),
        image.width() as u32,
        image.height() as u32,
        image::ExtendedColorType::Rgb8,
    )?;

    log::debug!("wrote {} to {}", image.size(), file_path.display());

    Ok(())
}
