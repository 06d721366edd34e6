use crate::sensor_log::SensorReading;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reading reported when sensors were requested but none precede the frame.
pub const MISSING_READING: f64 = -1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAnnotation {
    pub filename: String,
    /// Frame count reported by the container, if any.
    pub length: Option<u64>,
    /// Keyed by absolute frame index; only sampled frames are present.
    pub data: BTreeMap<u64, FrameAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnnotation {
    pub timestamp: String,
    pub cls: FrameClassification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensors: Option<SensorSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameClassification {
    #[serde(rename = "class")]
    pub label: String,
    pub conf: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    #[serde(rename = "Temp")]
    pub temp: Option<f64>,
    #[serde(rename = "Humidity")]
    pub humidity: Option<f64>,
    #[serde(rename = "CO2")]
    pub co2: Option<f64>,
    #[serde(rename = "PM1")]
    pub pm1: Option<f64>,
    #[serde(rename = "PM2.5")]
    pub pm2_5: Option<f64>,
    #[serde(rename = "PM10")]
    pub pm10: Option<f64>,
}

impl SensorSnapshot {
    pub fn missing() -> Self {
        Self {
            temp: Some(MISSING_READING),
            humidity: Some(MISSING_READING),
            co2: Some(MISSING_READING),
            pm1: Some(MISSING_READING),
            pm2_5: Some(MISSING_READING),
            pm10: Some(MISSING_READING),
        }
    }

    pub fn from_reading(reading: Option<&SensorReading>) -> Self {
        match reading {
            Some(reading) => Self {
                temp: reading.temp,
                humidity: reading.humidity,
                co2: reading.co2,
                pm1: reading.pm1,
                pm2_5: reading.pm2_5,
                pm10: reading.pm10,
            },
            None => Self::missing(),
        }
    }
}

impl VideoAnnotation {
    pub fn new(filename: String, length: Option<u64>) -> Self {
        Self {
            filename,
            length,
            data: BTreeMap::new(),
        }
    }

    /// The "video only" view.
    pub fn without_sensors(&self) -> Self {
        let mut stripped = self.clone();
        for frame in stripped.data.values_mut() {
            frame.sensors = None;
        }
        stripped
    }
}
