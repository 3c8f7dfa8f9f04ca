//! Image preprocessing for the classifier input.

use crate::error::InferenceError;
use image::DynamicImage;
use image::imageops::FilterType;
use std::path::Path;

/// Spatial resolution the model expects on both axes.
pub const IMAGE_SIZE: u32 = 224;

/// Decode an image file into normalized RGB pixels.
///
/// The result is a row-major H x W x C buffer of `IMAGE_SIZE` squared RGB
/// triples scaled into [0,1].
pub fn load_pixels(path: &Path) -> Result<Vec<f32>, InferenceError> {
    let img = image::open(path).map_err(|err| InferenceError::BadImage(err.to_string()))?;
    Ok(normalize(img))
}

fn normalize(img: DynamicImage) -> Vec<f32> {
    let resized = img
        .resize_exact(IMAGE_SIZE, IMAGE_SIZE, FilterType::Triangle)
        .to_rgb8();
    resized
        .as_raw()
        .iter()
        .map(|byte| f32::from(*byte) / 255.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{IMAGE_SIZE, load_pixels};
    use image::{Rgb, RgbImage};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn pixels_are_resized_and_normalized() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("leaf.png");
        let img = RgbImage::from_pixel(32, 48, Rgb([255, 128, 0]));
        img.save(&path).expect("save image");

        let pixels = load_pixels(&path).expect("pixels");
        assert_eq!(pixels.len(), (IMAGE_SIZE * IMAGE_SIZE * 3) as usize);
        assert!(pixels.iter().all(|p| (0.0..=1.0).contains(p)));
        // Uniform source image keeps exact channel values after resampling.
        assert_eq!(pixels[0], 1.0);
        assert_eq!(pixels[2], 0.0);
    }

    #[test]
    fn undecodable_input_is_terminal() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("not-an-image.jpg");
        std::fs::write(&path, b"plain text").expect("write");
        assert!(load_pixels(&path).is_err());
    }

    #[test]
    fn missing_file_is_terminal() {
        let temp = tempdir().expect("tempdir");
        assert!(load_pixels(&temp.path().join("absent.png")).is_err());
    }
}
