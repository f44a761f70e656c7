use std::io::{BufRead, Seek};

use image::{DynamicImage, ImageFormat, ImageReader, Limits};

use crate::{format::CellFormat, grid::CellRect};

#[derive(Debug, thiserror::Error)]
pub enum ImgUtilError {
    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("unknown image format")]
    UnknownFormat,

    #[error("unsupported image format: {0:?}")]
    UnsupportedFormat(ImageFormat),

    #[error("cell {cell} lies outside of the {width}x{height} image")]
    OutOfBounds {
        cell: CellRect,
        width: u32,
        height: u32,
    },

    #[error("png optimization failed: {0}")]
    OptimizeError(#[from] oxipng::PngError),
}

pub type ImgUtilResult<T> = std::result::Result<T, ImgUtilError>;

/// Decoded source image together with the format sniffed from its content.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub image: DynamicImage,
    pub format: CellFormat,
}

/// Sniffs the format from the leading bytes and decodes the image.
///
/// Recognized formats without a matching encoder are rejected before any
/// pixel data is decoded. No decoder limits apply, any image that fits in
/// memory is accepted.
pub fn decode<R: BufRead + Seek>(reader: R) -> ImgUtilResult<SourceImage> {
    decode_with_limits(reader, Limits::no_limits())
}

pub fn decode_with_limits<R: BufRead + Seek>(
    reader: R,
    limits: Limits,
) -> ImgUtilResult<SourceImage> {
    let mut reader = ImageReader::new(reader).with_guessed_format()?;
    reader.limits(limits);

    let format = CellFormat::try_from(reader.format().ok_or(ImgUtilError::UnknownFormat)?)?;
    trace!("detected {format} content");

    reader.set_format(format.image_format());
    let image = reader.decode()?;

    Ok(SourceImage { image, format })
}

/// Copies the pixels covered by `cell` out of `image`, keeping its color type.
pub fn extract(image: &DynamicImage, cell: &CellRect) -> ImgUtilResult<DynamicImage> {
    let (width, height) = (image.width(), image.height());

    if cell.x0 > cell.x1 || cell.y0 > cell.y1 || cell.x1 > width || cell.y1 > height {
        return Err(ImgUtilError::OutOfBounds {
            cell: *cell,
            width,
            height,
        });
    }

    Ok(image.crop_imm(cell.x0, cell.y0, cell.width(), cell.height()))
}
