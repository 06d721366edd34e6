//! Companion sensor logs: one reading per line, `key: value` fields joined by ` - `.
//!
//! ```text
//! Datetime: 2024-03-15 14:25:31.250 - Temp: 22.5 °C - Humidity: 41.0% - CO2: 612 ppm - PM1: 3 - PM2.5: 5 - PM10: 7
//! ```

pub mod parse;
pub mod timeline;

pub use parse::{read_sensor_log, SensorReading};
pub use timeline::SensorTimeline;
