use image::{ImageFormat, RgbImage};

/// Pixel layout of a frame as delivered by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelEncoding {
    /// Packed 8-bit blue/green/red, the usual layout of raw capture buffers.
    Bgr8,
    /// Packed 8-bit red/green/blue.
    Rgb8,
    /// One compressed JPEG image (MJPEG cameras and streams).
    Jpeg,
}

/// A single frame grabbed from a camera, still in its device-native encoding.
///
/// Frames only live for one iteration of the capture loop; nothing keeps a
/// reference to one after it has been converted.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub encoding: PixelEncoding,
    pub data: Vec<u8>,
}

impl RawFrame {
    pub fn bgr8(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            encoding: PixelEncoding::Bgr8,
            data,
        }
    }

    pub fn rgb8(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            encoding: PixelEncoding::Rgb8,
            data,
        }
    }

    /// Wrap JPEG bytes. Dimensions are unknown until decoded and reported as 0.
    pub fn jpeg(data: Vec<u8>) -> Self {
        Self {
            width: 0,
            height: 0,
            encoding: PixelEncoding::Jpeg,
            data,
        }
    }

    /// Convert into an RGB image regardless of the source encoding.
    pub fn to_rgb(&self) -> Result<RgbImage, FrameError> {
        match self.encoding {
            PixelEncoding::Rgb8 => {
                self.check_len()?;
                RgbImage::from_raw(self.width, self.height, self.data.clone())
                    .ok_or(FrameError::EmptyFrame)
            }
            PixelEncoding::Bgr8 => {
                self.check_len()?;
                let mut rgb = self.data.clone();
                for px in rgb.chunks_exact_mut(3) {
                    px.swap(0, 2);
                }
                RgbImage::from_raw(self.width, self.height, rgb).ok_or(FrameError::EmptyFrame)
            }
            PixelEncoding::Jpeg => {
                if self.data.is_empty() {
                    return Err(FrameError::EmptyFrame);
                }
                let img = image::load_from_memory_with_format(&self.data, ImageFormat::Jpeg)
                    .map_err(|e| FrameError::Decode(e.to_string()))?;
                Ok(img.to_rgb8())
            }
        }
    }

    fn check_len(&self) -> Result<(), FrameError> {
        if self.width == 0 || self.height == 0 {
            return Err(FrameError::EmptyFrame);
        }
        let expected = self.width as usize * self.height as usize * 3;
        if self.data.len() != expected {
            return Err(FrameError::SizeMismatch {
                got: self.data.len(),
                expected,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame has no pixels")]
    EmptyFrame,
    #[error("frame buffer has {got} bytes, expected {expected}")]
    SizeMismatch { got: usize, expected: usize },
    #[error("failed to decode JPEG frame: {0}")]
    Decode(String),
}
