use image::ImageReader;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Empty frame")]
    Empty,
    #[error("Unrecognized image format: {0}")]
    Format(#[from] std::io::Error),
    #[error("Failed to read image header: {0}")]
    Header(#[from] image::ImageError),
    #[error("Frame has zero area ({width}x{height})")]
    ZeroArea { width: u32, height: u32 },
}

/// Dimensions of a frame that the OCR backend can be handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    pub width: u32,
    pub height: u32,
    pub format: image::ImageFormat,
}

/// Probe the frame header without decoding pixels.
pub fn inspect_frame(data: &[u8]) -> Result<FrameInfo, FrameError> {
    if data.is_empty() {
        return Err(FrameError::Empty);
    }
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let format = reader.format().ok_or_else(|| {
        FrameError::Format(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "no known image signature",
        ))
    })?;
    let (width, height) = reader.into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(FrameError::ZeroArea { width, height });
    }
    Ok(FrameInfo { width, height, format })
}
