use crate::annotation::store::StoreError;
use crate::video_timestamp::TimestampNotFound;

/// Failures that end a task. The message is what clients see after `error: `.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Timestamp(#[from] TimestampNotFound),
    #[error("cannot open video")]
    OpenVideo(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("frame {frame_index}: {source}")]
    Decode {
        frame_index: u64,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("frame {frame_index}: timestamp out of range")]
    FrameTime { frame_index: u64 },
    #[error("frame {frame_index}: classifier failed: {source}")]
    Classify {
        frame_index: u64,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("frame {frame_index}: classifier returned no classes")]
    NoClassification { frame_index: u64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}
