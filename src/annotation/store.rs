//! Result files under the JSON output directory.
//!
//! Each finished task is written twice: `<task_id>.json` for API lookups and
//! `<YYYYmmdd_HHMMSS>_<stem>.json` for humans browsing the directory.

use super::model::VideoAnnotation;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid annotation json in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn task_result_path(json_dir: &Path, task_id: &str) -> PathBuf {
    json_dir.join(format!("{}.json", task_id))
}

pub fn video_only_result_path(json_dir: &Path, task_id: &str) -> PathBuf {
    json_dir.join(format!("{}_video_only.json", task_id))
}

pub fn friendly_result_path(json_dir: &Path, compact_stamp: &str, safe_stem: &str) -> PathBuf {
    json_dir.join(format!("{}_{}.json", compact_stamp, safe_stem))
}

pub fn write_annotation(path: &Path, annotation: &VideoAnnotation) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, annotation).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_error)?;

    Ok(())
}

pub fn read_annotation(path: &Path) -> Result<VideoAnnotation, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}
