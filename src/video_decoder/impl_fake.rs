use crate::video_decoder::interface::{VideoDecoder, VideoMetadata, VideoStream};
use image::{DynamicImage, Rgb, RgbImage};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Produces solid grey frames; every opened path yields the same synthetic clip.
#[derive(Debug, Clone)]
pub struct VideoDecoderFake {
    pub fps: f64,
    pub frame_count: u64,
    pub report_frame_count: bool,
    pub width: u32,
    pub height: u32,
    pub fail_to_open: bool,
    decoded: Arc<AtomicU64>,
    skipped: Arc<AtomicU64>,
}

impl Default for VideoDecoderFake {
    fn default() -> Self {
        Self {
            fps: 30.0,
            frame_count: 300,
            report_frame_count: true,
            width: 64,
            height: 48,
            fail_to_open: false,
            decoded: Arc::new(AtomicU64::new(0)),
            skipped: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl VideoDecoderFake {
    #[allow(dead_code)]
    pub fn new(fps: f64, frame_count: u64) -> Self {
        Self {
            fps,
            frame_count,
            ..Self::default()
        }
    }

    /// Streams that, like some containers, do not report their length.
    #[allow(dead_code)]
    pub fn without_frame_count(self) -> Self {
        Self {
            report_frame_count: false,
            ..self
        }
    }

    #[allow(dead_code)]
    pub fn unopenable() -> Self {
        Self {
            fail_to_open: true,
            ..Self::default()
        }
    }

    #[allow(dead_code)]
    pub fn decoded_frames(&self) -> u64 {
        self.decoded.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn skipped_frames(&self) -> u64 {
        self.skipped.load(Ordering::SeqCst)
    }
}

impl VideoDecoder for VideoDecoderFake {
    fn open(
        &self,
        path: &Path,
    ) -> Result<Box<dyn VideoStream>, Box<dyn std::error::Error + Send + Sync>> {
        if self.fail_to_open {
            return Err(format!("cannot open {}", path.display()).into());
        }

        Ok(Box::new(FakeStream {
            config: self.clone(),
            position: 0,
        }))
    }
}

struct FakeStream {
    config: VideoDecoderFake,
    position: u64,
}

impl VideoStream for FakeStream {
    fn metadata(&self) -> VideoMetadata {
        VideoMetadata {
            fps: self.config.fps,
            frame_count: self
                .config
                .report_frame_count
                .then_some(self.config.frame_count),
        }
    }

    fn skip_frame(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        if self.position >= self.config.frame_count {
            return Ok(false);
        }
        self.position += 1;
        self.config.skipped.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    fn next_frame(
        &mut self,
    ) -> Result<Option<DynamicImage>, Box<dyn std::error::Error + Send + Sync>> {
        if self.position >= self.config.frame_count {
            return Ok(None);
        }
        let shade = (self.position % 256) as u8;
        self.position += 1;
        self.config.decoded.fetch_add(1, Ordering::SeqCst);

        let frame = RgbImage::from_pixel(self.config.width, self.config.height, Rgb([shade; 3]));
        Ok(Some(DynamicImage::ImageRgb8(frame)))
    }
}
