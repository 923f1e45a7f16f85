//! Codec glue over the `image` crate.
//!
//! - `load_image`: read a PNG/JPEG/etc. into a `DecodedImage` (luma or BGR).
//! - `save_grayscale`: write a `GrayscaleImage`, format picked from the extension.
//! - `save_decoded`: write a luma or BGR buffer, used for previews of the original.
//! - `validate_extension` / `grayscale_output_path`: file naming policy.

use crate::core_modules::frame::frame::{DecodedImage, GrayscaleImage, Raster};
use crate::core_modules::pixel::pixel;
use crate::error::CodecError;
use image::{DynamicImage, GrayImage, RgbImage};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Extensions accepted for user-supplied images, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

const GRAYSCALE_SUFFIX: &str = "-grayscale";

/// Checks that `path` carries one of the supported extensions.
pub fn validate_extension(path: &Path) -> Result<(), CodecError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    if SUPPORTED_EXTENSIONS
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(extension))
    {
        Ok(())
    } else {
        Err(CodecError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension: extension.to_string(),
        })
    }
}

/// `<dir>/<stem>-grayscale.<ext>` for a source file name.
pub fn grayscale_output_path(dir: &Path, file_name: &str) -> PathBuf {
    let source = Path::new(file_name);
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let name = match source.extension() {
        Some(ext) => format!("{stem}{GRAYSCALE_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{GRAYSCALE_SUFFIX}"),
    };
    dir.join(name)
}

/// Reads and decodes an image file.
///
/// Luma sources keep one channel; everything else becomes 3-channel BGR with any
/// alpha dropped.
pub fn load_image(path: &Path) -> Result<DecodedImage, CodecError> {
    if !path.is_file() {
        return Err(CodecError::NotFound(path.to_path_buf()));
    }
    let decoded = image::open(path).map_err(|source| CodecError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        "decoded {} as {:?} ({}x{})",
        path.display(),
        decoded.color(),
        decoded.width(),
        decoded.height()
    );
    from_dynamic(decoded)
}

/// Converts an `image` crate buffer into the crate's luma/BGR layout.
pub fn from_dynamic(image: DynamicImage) -> Result<DecodedImage, CodecError> {
    let (width, height) = (image.width(), image.height());
    let (channels, data) = if image.color().has_color() {
        let mut data = image.into_rgb8().into_raw();
        data.chunks_exact_mut(pixel::CHANNELS)
            .for_each(|rgb| rgb.swap(0, 2));
        (pixel::CHANNELS, data)
    } else {
        (1, image.into_luma8().into_raw())
    };
    DecodedImage::from_raw(width, height, channels, data).ok_or(CodecError::ShapeMismatch {
        width,
        height,
        channels,
    })
}

/// Writes a grayscale image to `path`, creating parent directories.
pub fn save_grayscale(image: &GrayscaleImage, path: &Path) -> Result<(), CodecError> {
    let buffer = GrayImage::from_raw(image.width(), image.height(), image.as_raw().to_vec())
        .ok_or(CodecError::ShapeMismatch {
            width: image.width(),
            height: image.height(),
            channels: 1,
        })?;
    write(DynamicImage::ImageLuma8(buffer), path)
}

/// Writes a luma or BGR buffer to `path`, creating parent directories.
pub fn save_decoded(image: &DecodedImage, path: &Path) -> Result<(), CodecError> {
    let (width, height) = (image.width(), image.height());
    let mismatch = CodecError::ShapeMismatch {
        width,
        height,
        channels: image.channels(),
    };
    let dynamic = match image.channels() {
        1 => DynamicImage::ImageLuma8(
            GrayImage::from_raw(width, height, image.as_raw().to_vec()).ok_or(mismatch)?,
        ),
        pixel::CHANNELS => {
            let mut data = image.as_raw().to_vec();
            data.chunks_exact_mut(pixel::CHANNELS)
                .for_each(|bgr| bgr.swap(0, 2));
            DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, data).ok_or(mismatch)?)
        }
        other => return Err(CodecError::UnsupportedChannels(other)),
    };
    write(dynamic, path)
}

fn write(image: DynamicImage, path: &Path) -> Result<(), CodecError> {
    ensure_parent_dir(path)?;
    image.save(path).map_err(|source| CodecError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("wrote {}", path.display());
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<(), CodecError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
