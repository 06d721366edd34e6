use chrono::NaiveDateTime;
use std::path::Path;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const FIELD_SEPARATOR: &str = " - ";

#[derive(Debug, thiserror::Error)]
pub enum SensorLogError {
    #[error("cannot read sensor log: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid {field} value {value:?}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorReading {
    pub datetime: Option<NaiveDateTime>,
    pub temp: Option<f64>,
    pub humidity: Option<f64>,
    pub co2: Option<f64>,
    pub pm1: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorLog {
    pub readings: Vec<SensorReading>,
    /// 1-based line numbers whose `Datetime` could not be parsed.
    pub unparsed_datetime_lines: Vec<usize>,
}

pub fn read_sensor_log(path: &Path) -> Result<SensorLog, SensorLogError> {
    let text = std::fs::read_to_string(path)?;
    parse_sensor_log(&text)
}

pub fn parse_sensor_log(text: &str) -> Result<SensorLog, SensorLogError> {
    let mut log = SensorLog::default();

    for (index, raw_line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let mut reading = SensorReading::default();
        for (key, value) in line.split(FIELD_SEPARATOR).filter_map(split_field) {
            match key {
                "Temp" => reading.temp = Some(number(line_number, "Temp", drop_last_chars(value, 3))?),
                "Humidity" => {
                    reading.humidity = Some(number(line_number, "Humidity", drop_last_chars(value, 1))?)
                }
                "CO2" => reading.co2 = Some(number(line_number, "CO2", drop_last_chars(value, 4))?),
                "PM1" => reading.pm1 = Some(number(line_number, "PM1", value)?),
                "PM2.5" => reading.pm2_5 = Some(number(line_number, "PM2.5", value)?),
                "PM10" => reading.pm10 = Some(number(line_number, "PM10", value)?),
                "Datetime" => match NaiveDateTime::parse_from_str(value, DATETIME_FORMAT) {
                    Ok(datetime) => reading.datetime = Some(datetime),
                    Err(_) => log.unparsed_datetime_lines.push(line_number),
                },
                _ => {}
            }
        }

        log.readings.push(reading);
    }

    Ok(log)
}

/// `key: value`, the key running up to the first colon.
fn split_field(part: &str) -> Option<(&str, &str)> {
    let (key, value) = part.split_once(':')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

/// Unit suffixes are stripped by character count (`°` is one character).
fn drop_last_chars(value: &str, count: usize) -> &str {
    let keep = value.chars().count().saturating_sub(count);
    match value.char_indices().nth(keep) {
        Some((byte_index, _)) => &value[..byte_index],
        None => value,
    }
}

fn number(line: usize, field: &'static str, value: &str) -> Result<f64, SensorLogError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| SensorLogError::InvalidNumber {
            line,
            field,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
Datetime: 2024-03-15 14:25:31.250 - Temp: 22.5 °C - Humidity: 41.0% - CO2: 612 ppm - PM1: 3 - PM2.5: 5.5 - PM10: 7

Datetime: 2024-03-15 14:25:33.000 - Temp: 22.7 °C - Humidity: 40.5% - CO2: 618 ppm - PM1: 4 - PM2.5: 6 - PM10: 9 - Battery: 88%
";

    #[test]
    fn test_parses_units_and_datetime() {
        let log = parse_sensor_log(SAMPLE).unwrap();

        assert_eq!(log.readings.len(), 2);
        let first = &log.readings[0];
        assert_eq!(
            first.datetime,
            Some(
                NaiveDate::from_ymd_opt(2024, 3, 15)
                    .unwrap()
                    .and_hms_milli_opt(14, 25, 31, 250)
                    .unwrap()
            )
        );
        assert_eq!(first.temp, Some(22.5));
        assert_eq!(first.humidity, Some(41.0));
        assert_eq!(first.co2, Some(612.0));
        assert_eq!(first.pm1, Some(3.0));
        assert_eq!(first.pm2_5, Some(5.5));
        assert_eq!(first.pm10, Some(7.0));
        assert!(log.unparsed_datetime_lines.is_empty());

        // unknown keys such as Battery are skipped
        let second = &log.readings[1];
        assert_eq!(second.humidity, Some(40.5));
        assert_eq!(second.pm10, Some(9.0));
    }

    #[test]
    fn test_missing_fields_stay_empty() {
        let log = parse_sensor_log("Datetime: 2024-03-15 14:25:31.0 - Temp: 19.0 °C\n").unwrap();

        let reading = &log.readings[0];
        assert_eq!(reading.temp, Some(19.0));
        assert_eq!(reading.humidity, None);
        assert_eq!(reading.pm10, None);
    }

    #[test]
    fn test_bad_datetime_is_kept_without_time() {
        let log = parse_sensor_log("Datetime: yesterday - Temp: 19.0 °C\n").unwrap();

        assert_eq!(log.readings.len(), 1);
        assert_eq!(log.readings[0].datetime, None);
        assert_eq!(log.unparsed_datetime_lines, vec![1]);
    }

    #[test]
    fn test_bad_number_fails_whole_log() {
        let error = parse_sensor_log("Temp: 22.5 °C\nTemp: warm\n").unwrap_err();

        match error {
            SensorLogError::InvalidNumber { line, field, .. } => {
                assert_eq!(line, 2);
                assert_eq!(field, "Temp");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_fields_without_values_are_ignored() {
        let log = parse_sensor_log("Temp: - just text - PM1: 2\n").unwrap();

        assert_eq!(log.readings[0].temp, None);
        assert_eq!(log.readings[0].pm1, Some(2.0));
    }

    #[test]
    fn test_drop_last_chars_counts_characters() {
        assert_eq!(drop_last_chars("22.5 °C", 3), "22.5");
        assert_eq!(drop_last_chars("41%", 1), "41");
        assert_eq!(drop_last_chars("ab", 4), "");
    }

    #[test]
    fn test_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensor.txt");
        std::fs::write(&path, SAMPLE).unwrap();

        assert_eq!(read_sensor_log(&path).unwrap().readings.len(), 2);
        assert!(matches!(
            read_sensor_log(&dir.path().join("missing.txt")),
            Err(SensorLogError::Io(_))
        ));
    }
}
