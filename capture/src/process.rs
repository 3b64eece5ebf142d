use image::imageops::{self, FilterType};
use image::RgbImage;

/// Shrink (or grow) a camera image to the square texture size.
pub fn candidate_texture(rgb: &RgbImage, side: u32) -> RgbImage {
    imageops::resize(rgb, side, side, FilterType::CatmullRom)
}

/// Blow the texture up for display without smoothing, so every preview pixel
/// is one of the texture's pixels.
pub fn preview(texture: &RgbImage, side: u32) -> RgbImage {
    imageops::resize(texture, side, side, FilterType::Nearest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::collections::HashSet;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, ((x + y) % 7) as u8 * 30])
        })
    }

    #[test]
    fn texture_is_square_regardless_of_source() {
        for (w, h) in [(640, 480), (1920, 1080), (100, 300), (256, 256), (3, 2)] {
            let texture = candidate_texture(&gradient(w, h), 256);
            assert_eq!(texture.dimensions(), (256, 256), "source {w}x{h}");
        }
    }

    #[test]
    fn black_stays_black() {
        let texture = candidate_texture(&RgbImage::new(640, 480), 256);
        assert!(texture.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn preview_introduces_no_new_colors() {
        let texture = candidate_texture(&gradient(640, 480), 256);
        let preview = preview(&texture, 700);
        assert_eq!(preview.dimensions(), (700, 700));

        let palette: HashSet<[u8; 3]> = texture.pixels().map(|p| p.0).collect();
        assert!(preview.pixels().all(|p| palette.contains(&p.0)));
    }
}
