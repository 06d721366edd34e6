use image::DynamicImage;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMetadata {
    /// As reported by the container; may be zero.
    pub fps: f64,
    pub frame_count: Option<u64>,
}

pub trait VideoStream: Send {
    fn metadata(&self) -> VideoMetadata;
    /// Advances past one frame without producing an image. `false` at end of stream.
    fn skip_frame(&mut self) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
    fn next_frame(&mut self)
        -> Result<Option<DynamicImage>, Box<dyn std::error::Error + Send + Sync>>;
}

pub trait VideoDecoder {
    fn open(
        &self,
        path: &Path,
    ) -> Result<Box<dyn VideoStream>, Box<dyn std::error::Error + Send + Sync>>;
}
