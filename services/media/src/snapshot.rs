use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::info;

use crate::capability::RawFrame;
use crate::error::CaptureError;
use crate::models::MediaBlob;

pub const SNAPSHOT_MIME_TYPE: &str = "image/jpeg";
pub const SNAPSHOT_FILE_NAME: &str = "snapshot.jpg";

pub struct SnapshotEncoder;

impl SnapshotEncoder {
    /// Draw a raw camera frame onto a raster and encode it as JPEG
    pub fn encode(frame: RawFrame) -> Result<MediaBlob, CaptureError> {
        info!("Encoding {}x{} snapshot", frame.width, frame.height);

        if frame.width == 0 || frame.height == 0 {
            return Err(CaptureError::Encoding("frame has no pixels".to_string()));
        }

        let raster = RgbaImage::from_raw(frame.width, frame.height, frame.rgba).ok_or_else(|| {
            CaptureError::Encoding("frame buffer does not match its dimensions".to_string())
        })?;

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgba8(raster).to_rgb8();

        let mut encoded = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut encoded, ImageFormat::Jpeg)
            .map_err(|e| CaptureError::Encoding(e.to_string()))?;

        Ok(MediaBlob::new(
            encoded.into_inner(),
            SNAPSHOT_MIME_TYPE,
            SNAPSHOT_FILE_NAME,
        ))
    }
}
