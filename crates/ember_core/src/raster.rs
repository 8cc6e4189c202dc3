//! 24-bit bitmap output.
//!
//! Rows are written bottom-to-top, padded to 4 bytes, channels in
//! blue/green/red order. The encoding itself is delegated to the `image`
//! crate's BMP encoder.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::bmp::BmpEncoder;
use image::ColorType;
use thiserror::Error;

/// Errors that can occur while writing a raster image.
#[derive(Error, Debug)]
pub enum RasterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Pixel buffer has {actual} pixels, expected {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        actual: usize,
    },
}

pub type RasterResult<T> = Result<T, RasterError>;

/// Encode `pixels` (row-major, top row first, RGB) as a 24-bit BMP into `out`.
pub fn encode_bmp<W: Write>(
    out: &mut W,
    width: u32,
    height: u32,
    pixels: &[[u8; 3]],
) -> RasterResult<()> {
    if pixels.len() != (width as usize) * (height as usize) {
        return Err(RasterError::SizeMismatch {
            width,
            height,
            actual: pixels.len(),
        });
    }

    let bytes: &[u8] = bytemuck::cast_slice(pixels);
    let mut encoder = BmpEncoder::new(out);
    encoder.encode(bytes, width, height, ColorType::Rgb8)?;
    Ok(())
}

/// Write `pixels` as a 24-bit BMP file.
pub fn write_bmp(
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
    pixels: &[[u8; 3]],
) -> RasterResult<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    encode_bmp(&mut out, width, height, pixels)?;
    out.flush()?;

    log::info!("Wrote {}x{} bitmap to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmp_layout() {
        // 3x2: each 9-byte row pads to 12
        let pixels = [
            [255, 0, 0],
            [0, 255, 0],
            [0, 0, 255],
            [10, 20, 30],
            [40, 50, 60],
            [70, 80, 90],
        ];
        let mut buf = Vec::new();
        encode_bmp(&mut buf, 3, 2, &pixels).unwrap();

        assert_eq!(&buf[0..2], b"BM");
        assert_eq!(buf.len(), 54 + 2 * 12);

        let file_size = u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]);
        assert_eq!(file_size as usize, buf.len());

        let bits_per_pixel = u16::from_le_bytes([buf[28], buf[29]]);
        assert_eq!(bits_per_pixel, 24);

        // First stored row is the bottom image row, in BGR order
        assert_eq!(&buf[54..57], &[30, 20, 10]);
        assert_eq!(&buf[63..66], &[0, 0, 0]);
        assert_eq!(&buf[66..69], &[0, 0, 255]);
    }

    #[test]
    fn test_size_mismatch() {
        let mut buf = Vec::new();
        let err = encode_bmp(&mut buf, 2, 2, &[[0, 0, 0]; 3]).unwrap_err();
        assert!(matches!(err, RasterError::SizeMismatch { .. }));
    }
}
