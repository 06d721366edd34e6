use crate::library::logger::interface::Logger;
use crate::video_decoder::interface::{VideoDecoder, VideoMetadata, VideoStream};
use image::{DynamicImage, RgbImage};
use opencv::{core::Mat, imgproc, prelude::*, videoio};
use std::path::Path;
use std::sync::Arc;

pub struct VideoDecoderOpenCv {
    logger: Arc<dyn Logger + Send + Sync>,
}

impl VideoDecoderOpenCv {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("video_decoder").with_namespace("opencv"),
        }
    }
}

impl VideoDecoder for VideoDecoderOpenCv {
    fn open(
        &self,
        path: &Path,
    ) -> Result<Box<dyn VideoStream>, Box<dyn std::error::Error + Send + Sync>> {
        let capture = videoio::VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(format!("VideoCapture could not open {}", path.display()).into());
        }

        let fps = capture.get(videoio::CAP_PROP_FPS).unwrap_or(0.0);
        let frame_count = capture
            .get(videoio::CAP_PROP_FRAME_COUNT)
            .ok()
            .filter(|count| *count > 0.0)
            .map(|count| count as u64);

        let _ = self.logger.info(&format!(
            "Opened {} | fps={:.2} | frames={:?}",
            path.display(),
            fps,
            frame_count
        ));

        Ok(Box::new(OpenCvStream {
            capture,
            metadata: VideoMetadata { fps, frame_count },
            bgr: Mat::default(),
            rgb: Mat::default(),
        }))
    }
}

struct OpenCvStream {
    capture: videoio::VideoCapture,
    metadata: VideoMetadata,
    bgr: Mat,
    rgb: Mat,
}

impl VideoStream for OpenCvStream {
    fn metadata(&self) -> VideoMetadata {
        self.metadata
    }

    fn skip_frame(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        // grab() demuxes and decodes but skips the retrieve/convert step
        Ok(self.capture.grab()?)
    }

    fn next_frame(
        &mut self,
    ) -> Result<Option<DynamicImage>, Box<dyn std::error::Error + Send + Sync>> {
        if !self.capture.read(&mut self.bgr)? || self.bgr.empty() {
            return Ok(None);
        }

        imgproc::cvt_color_def(&self.bgr, &mut self.rgb, imgproc::COLOR_BGR2RGB)?;

        let size = self.rgb.size()?;
        let buffer = self.rgb.data_bytes()?.to_vec();
        let image = RgbImage::from_raw(size.width as u32, size.height as u32, buffer)
            .ok_or("decoded frame does not match its reported size")?;

        Ok(Some(DynamicImage::ImageRgb8(image)))
    }
}
