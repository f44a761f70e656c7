use std::io::Cursor;

use clap::{builder::PossibleValue, ValueEnum};
use image::{
    codecs::{jpeg, png},
    ColorType, DynamicImage, ImageFormat,
};
use strum::{EnumIter, VariantArray};

use crate::image_util::{ImgUtilError, ImgUtilResult};

/// Formats a cell can be written in. Cells always keep the source format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum CellFormat {
    Png,
    Jpeg,
}

impl CellFormat {
    pub const fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    /// Encodes a cell into an in-memory file.
    ///
    /// Zero-area cells have no valid encoding and produce an empty buffer.
    pub fn encode(self, cell: &DynamicImage, opts: &EncodeOptions) -> ImgUtilResult<Vec<u8>> {
        if cell.width() == 0 || cell.height() == 0 {
            return Ok(Vec::new());
        }

        let mut buf = Cursor::new(Vec::new());

        match self {
            Self::Png => {
                cell.write_with_encoder(png::PngEncoder::new_with_quality(
                    &mut buf,
                    opts.png_compression.into(),
                    png::FilterType::default(),
                ))?;
            }
            Self::Jpeg => {
                let encoder = jpeg::JpegEncoder::new_with_quality(&mut buf, opts.jpeg_quality);

                // jpeg has no alpha channel and only 8 bit samples
                match cell.color() {
                    ColorType::L8 | ColorType::Rgb8 => cell.write_with_encoder(encoder)?,
                    _ => DynamicImage::ImageRgb8(cell.to_rgb8()).write_with_encoder(encoder)?,
                }
            }
        }

        let buf = buf.into_inner();

        if self == Self::Png && opts.optimize {
            return Ok(oxipng::optimize_from_memory(
                &buf,
                &oxipng::Options::from_preset(2),
            )?);
        }

        Ok(buf)
    }
}

impl TryFrom<ImageFormat> for CellFormat {
    type Error = ImgUtilError;

    fn try_from(value: ImageFormat) -> Result<Self, Self::Error> {
        match value {
            ImageFormat::Png => Ok(Self::Png),
            ImageFormat::Jpeg => Ok(Self::Jpeg),
            other => Err(ImgUtilError::UnsupportedFormat(other)),
        }
    }
}

impl std::fmt::Display for CellFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Png => write!(f, "PNG"),
            Self::Jpeg => write!(f, "JPEG"),
        }
    }
}

/// Encoder settings shared by every cell of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub jpeg_quality: u8,
    pub png_compression: PngCompression,
    pub optimize: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 75,
            png_compression: PngCompression::Default,
            optimize: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, VariantArray)]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

impl std::fmt::Display for PngCompression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Default => write!(f, "default"),
            Self::Best => write!(f, "best"),
        }
    }
}

impl From<PngCompression> for png::CompressionType {
    fn from(value: PngCompression) -> Self {
        match value {
            PngCompression::Fast => Self::Fast,
            PngCompression::Default => Self::Default,
            PngCompression::Best => Self::Best,
        }
    }
}

impl ValueEnum for PngCompression {
    fn value_variants<'a>() -> &'a [Self] {
        Self::VARIANTS
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        Some(PossibleValue::new(match self {
            Self::Fast => "fast",
            Self::Default => "default",
            Self::Best => "best",
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{GenericImageView as _, Rgb, RgbImage, Rgba, RgbaImage};
    use strum::IntoEnumIterator as _;

    use super::*;

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 17) as u8, (y * 31) as u8, (x ^ y) as u8, 255 - x as u8])
        }))
    }

    #[test]
    fn only_png_and_jpeg_are_supported() {
        assert_eq!(CellFormat::try_from(ImageFormat::Png).unwrap(), CellFormat::Png);
        assert_eq!(CellFormat::try_from(ImageFormat::Jpeg).unwrap(), CellFormat::Jpeg);

        for format in [ImageFormat::Gif, ImageFormat::Bmp, ImageFormat::WebP] {
            assert!(matches!(
                CellFormat::try_from(format),
                Err(ImgUtilError::UnsupportedFormat(f)) if f == format
            ));
        }
    }

    #[test]
    fn formats_map_back_to_image_formats() {
        for format in CellFormat::iter() {
            assert_eq!(
                CellFormat::try_from(format.image_format()).unwrap(),
                format
            );
        }

        assert_eq!(CellFormat::Png.extension(), "png");
        assert_eq!(CellFormat::Jpeg.extension(), "jpeg");
    }

    #[test]
    fn png_encoding_is_lossless() {
        let img = gradient(9, 7);

        for png_compression in PngCompression::iter() {
            for optimize in [false, true] {
                let opts = EncodeOptions {
                    png_compression,
                    optimize,
                    ..EncodeOptions::default()
                };
                let bytes = CellFormat::Png.encode(&img, &opts).unwrap();
                let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
                    .unwrap();

                assert_eq!(decoded.to_rgba8(), img.to_rgba8());
            }
        }
    }

    #[test]
    fn jpeg_keeps_dimensions_and_drops_alpha() {
        let img = gradient(16, 8);
        let bytes = CellFormat::Jpeg
            .encode(&img, &EncodeOptions::default())
            .unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).unwrap();

        assert_eq!(decoded.dimensions(), (16, 8));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn jpeg_rgb_is_encoded_as_is() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([200, 10, 10])));
        let bytes = CellFormat::Jpeg
            .encode(&img, &EncodeOptions::default())
            .unwrap();

        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn empty_cells_encode_to_nothing() {
        let img = DynamicImage::new_rgb8(0, 5);

        for format in CellFormat::iter() {
            assert!(format
                .encode(&img, &EncodeOptions::default())
                .unwrap()
                .is_empty());
        }
    }
}
