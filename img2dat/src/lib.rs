//! Image to RGB565 asset conversion.
//!
//! Produces the raw pixel file the `semihost` crate streams to the target:
//! headerless little-endian RGB565 records in row-major scan order. Nothing
//! in the file describes its dimensions or batch geometry; producer and
//! consumer agree on those out of band.

use std::path::Path;

use image::imageops::{self, ColorMap, FilterType};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use thiserror::Error;

/// Longest allowed side of the converted image. Larger inputs are scaled
/// down preserving aspect ratio; smaller inputs are left alone.
pub const MAX_DIM: u32 = 240;

/// Appended to the input filename to name the converted asset.
pub const ASSET_SUFFIX: &str = ".dat";

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("reading input image: {0}")]
    Io(#[from] std::io::Error),
    #[error("decoding input image: {0}")]
    Format(image::ImageError),
}

/// Convert the image at `input` into packed RGB565 asset bytes.
pub fn encode_file(input: &Path) -> Result<Vec<u8>, EncodeError> {
    let image = image::open(input).map_err(|err| match err {
        image::ImageError::IoError(err) => EncodeError::Io(err),
        err => EncodeError::Format(err),
    })?;
    Ok(encode_image(&image))
}

/// Convert an already-decoded image into packed RGB565 asset bytes.
pub fn encode_image(image: &DynamicImage) -> Vec<u8> {
    let bounded = if image.width() > MAX_DIM || image.height() > MAX_DIM {
        image.resize(MAX_DIM, MAX_DIM, FilterType::Lanczos3)
    } else {
        image.clone()
    };
    let rgb = bounded.to_rgb8();
    log::debug!("encoding {}x{} pixels", rgb.width(), rgb.height());

    let dithered = dither_565(&rgb);
    let mut bytes = Vec::with_capacity(rgb.width() as usize * rgb.height() as usize * 2);
    for pixel in dithered.pixels() {
        let [r, g, b] = pixel.0;
        bytes.extend_from_slice(&pack_565(r, g, b).to_le_bytes());
    }
    bytes
}

/// Pack one dithered 8-bit RGB pixel into the on-disk 16-bit layout
/// `RRRRRGGGGGGBBBBB`.
pub fn pack_565(r: u8, g: u8, b: u8) -> u16 {
    ((u16::from(r) >> 3) << 11) | ((u16::from(g) >> 2) << 5) | (u16::from(b) >> 3)
}

/// Dither each channel against its own quantization ramp: 32 levels for the
/// 5-bit red and blue channels, 64 for green. The channels are split,
/// reduced and merged back independently; no color ever blends across
/// channels.
fn dither_565(rgb: &RgbImage) -> RgbImage {
    let red = dither_channel(rgb, 0, &ChannelPalette::new(32));
    let green = dither_channel(rgb, 1, &ChannelPalette::new(64));
    let blue = dither_channel(rgb, 2, &ChannelPalette::new(32));

    RgbImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        Rgb([
            red.get_pixel(x, y).0[0],
            green.get_pixel(x, y).0[0],
            blue.get_pixel(x, y).0[0],
        ])
    })
}

fn dither_channel(rgb: &RgbImage, channel: usize, palette: &ChannelPalette) -> GrayImage {
    let mut band = GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        Luma([rgb.get_pixel(x, y).0[channel]])
    });
    imageops::dither(&mut band, palette);
    band
}

/// Quantization ramp for a single channel: `levels[i]` is the 8-bit value
/// the i-th step widens back out to, evenly spaced over the full range.
struct ChannelPalette {
    levels: Vec<u8>,
}

impl ChannelPalette {
    fn new(steps: usize) -> Self {
        let span = 256 / steps;
        let levels = (0..steps).map(|i| (i * span + span / 2 - 1) as u8).collect();
        Self { levels }
    }
}

impl ColorMap for ChannelPalette {
    type Color = Luma<u8>;

    fn index_of(&self, color: &Luma<u8>) -> usize {
        let value = i16::from(color.0[0]);
        self.levels
            .iter()
            .enumerate()
            .min_by_key(|(_, &level)| (value - i16::from(level)).abs())
            .map_or(0, |(index, _)| index)
    }

    fn map_color(&self, color: &mut Luma<u8>) {
        if let Some(mapped) = self.lookup(self.index_of(color)) {
            *color = mapped;
        }
    }

    fn lookup(&self, index: usize) -> Option<Luma<u8>> {
        self.levels.get(index).map(|&level| Luma([level]))
    }

    fn has_lookup(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_bit_layout() {
        assert_eq!(pack_565(0xFF, 0xFF, 0xFF), 0xFFFF);
        assert_eq!(pack_565(0x00, 0x00, 0x00), 0x0000);
        assert_eq!(pack_565(0xF8, 0x00, 0x00), 0xF800);
        assert_eq!(pack_565(0x00, 0xFC, 0x00), 0x07E0);
        assert_eq!(pack_565(0x00, 0x00, 0xF8), 0x001F);
    }

    #[test]
    fn ramps_match_channel_bit_depth() {
        let narrow = ChannelPalette::new(32);
        assert_eq!(narrow.levels.len(), 32);
        assert_eq!(narrow.levels[0], 3);
        assert_eq!(narrow.levels[1], 11);
        assert_eq!(narrow.levels[31], 251);

        let wide = ChannelPalette::new(64);
        assert_eq!(wide.levels.len(), 64);
        assert_eq!(wide.levels[0], 1);
        assert_eq!(wide.levels[1], 5);
        assert_eq!(wide.levels[63], 253);
    }

    #[test]
    fn nearest_level_error_stays_under_one_step() {
        let narrow = ChannelPalette::new(32);
        let wide = ChannelPalette::new(64);
        for value in 0..=255u8 {
            let mapped = narrow.levels[narrow.index_of(&Luma([value]))];
            assert!((i16::from(value) - i16::from(mapped)).abs() < 8);

            let mapped = wide.levels[wide.index_of(&Luma([value]))];
            assert!((i16::from(value) - i16::from(mapped)).abs() < 4);
        }
    }

    #[test]
    fn solid_color_round_trips_within_one_step() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 100, 50])));
        let bytes = encode_image(&img);
        assert_eq!(bytes.len(), 8 * 8 * 2);

        for chunk in bytes.chunks(2) {
            let packed = u16::from_le_bytes([chunk[0], chunk[1]]);
            let r = ((packed >> 11) & 0x1F) as i16;
            let g = ((packed >> 5) & 0x3F) as i16;
            let b = (packed & 0x1F) as i16;

            assert!((r * 8 + 3 - 200).abs() < 8);
            assert!((g * 4 + 1 - 100).abs() < 4);
            assert!((b * 8 + 3 - 50).abs() < 8);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(16, 16, |x, y| {
            Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8])
        }));
        assert_eq!(encode_image(&img), encode_image(&img));
    }

    #[test]
    fn bounds_large_images() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(480, 360, Rgb([10, 20, 30])));
        let bytes = encode_image(&img);
        assert_eq!(bytes.len(), 240 * 180 * 2);
    }

    #[test]
    fn keeps_small_images_unscaled() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 7, Rgb([10, 20, 30])));
        assert_eq!(encode_image(&img).len(), 10 * 7 * 2);
    }

    #[test]
    fn scan_order_is_row_major() {
        // exact ramp levels, so dithering has no error to diffuse
        let red = Rgb([251, 1, 3]);
        let green = Rgb([3, 253, 3]);
        let blue = Rgb([3, 1, 251]);
        let white = Rgb([251, 253, 251]);

        let mut img = RgbImage::new(2, 2);
        img.put_pixel(0, 0, red);
        img.put_pixel(1, 0, green);
        img.put_pixel(0, 1, blue);
        img.put_pixel(1, 1, white);

        let bytes = encode_image(&DynamicImage::ImageRgb8(img));
        let pixels: Vec<u16> = bytes
            .chunks(2)
            .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
            .collect();
        assert_eq!(pixels, vec![0xF800, 0x07E0, 0x001F, 0xFFFF]);
    }

    #[test]
    fn unreadable_input_is_io() {
        let err = encode_file(Path::new("/nonexistent/input.png")).unwrap_err();
        assert!(matches!(err, EncodeError::Io(_)));
    }

    #[test]
    fn undecodable_input_is_format() {
        let path = std::env::temp_dir().join(format!("img2dat-test-{}.png", std::process::id()));
        std::fs::write(&path, b"not an image").unwrap();

        let err = encode_file(&path).unwrap_err();
        assert!(matches!(err, EncodeError::Format(_)));
        std::fs::remove_file(path).ok();
    }
}
