//! Night mode colour inversion

use image::{Rgba, RgbaImage};

/// Invert the colour channels of every pixel, keeping alpha
///
/// Returns a new image; the input is left untouched.
pub fn invert(image: &RgbaImage) -> RgbaImage {
    let mut inverted = image.clone();
    for pixel in inverted.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        *pixel = Rgba([255 - r, 255 - g, 255 - b, a]);
    }
    inverted
}
