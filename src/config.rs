use crate::image_classifier::models::model_config::ModelConfig;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Smoke detection video annotation server")]
pub struct Args {
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    pub bind_addr: SocketAddr,

    #[arg(
        long,
        env = "DATA_DIR",
        default_value = "fastapi",
        help = "Directory holding uploaded videos/ and sensors/"
    )]
    pub data_dir: PathBuf,

    #[arg(long, env = "JSON_OUTPUT_DIR", default_value = "json")]
    pub json_output_dir: PathBuf,

    #[arg(
        long,
        env = "SAMPLE_EVERY",
        default_value = "10",
        help = "Classify one frame out of every N"
    )]
    pub sample_every: u64,

    #[arg(
        long,
        env = "LOG_EVERY_N",
        default_value = "50",
        help = "Log progress on sampled frames whose index is a multiple of N (0 disables)"
    )]
    pub log_every_n: u64,

    #[arg(long, env = "MODEL_PATH", default_value = "models/smoke_classifier.onnx")]
    pub model_path: PathBuf,

    #[arg(long, env = "MODEL_INPUT_SIZE", default_value = "256")]
    pub model_input_size: u32,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, help = "Use the fake classifier and synthetic video decoder")]
    pub fake: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub sample_every: u64,
    pub log_every_n: u64,
    pub json_output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub video_dir: PathBuf,
    pub sensor_dir: PathBuf,
    pub pipeline: PipelineConfig,
    pub classifier: ModelConfig,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = PathBuf::from("fastapi");
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            video_dir: data_dir.join("videos"),
            sensor_dir: data_dir.join("sensors"),
            pipeline: PipelineConfig {
                sample_every: 10,
                log_every_n: 50,
                json_output_dir: PathBuf::from("json"),
            },
            classifier: ModelConfig::default(),
        }
    }
}

impl From<&Args> for Config {
    fn from(args: &Args) -> Self {
        Self {
            bind_addr: args.bind_addr,
            video_dir: args.data_dir.join("videos"),
            sensor_dir: args.data_dir.join("sensors"),
            pipeline: PipelineConfig {
                sample_every: args.sample_every,
                log_every_n: args.log_every_n,
                json_output_dir: args.json_output_dir.clone(),
            },
            classifier: ModelConfig {
                onnx_model_path: args.model_path.clone(),
                input_shape: (args.model_input_size, args.model_input_size),
                ..ModelConfig::default()
            },
        }
    }
}

impl Config {
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in [
            &self.video_dir,
            &self.sensor_dir,
            &self.pipeline.json_output_dir,
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
