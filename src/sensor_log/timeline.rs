use super::parse::{SensorLog, SensorReading};
use chrono::NaiveDateTime;

/// Timed readings in ascending time order, for "latest reading at or before" lookups.
#[derive(Debug, Clone, Default)]
pub struct SensorTimeline {
    entries: Vec<(NaiveDateTime, SensorReading)>,
}

impl SensorTimeline {
    /// Readings without a parsed time are dropped; ties keep file order.
    pub fn from_log(log: &SensorLog) -> Self {
        let mut entries: Vec<(NaiveDateTime, SensorReading)> = log
            .readings
            .iter()
            .filter_map(|reading| reading.datetime.map(|time| (time, reading.clone())))
            .collect();
        entries.sort_by_key(|(time, _)| *time);

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest_at(&self, timestamp: NaiveDateTime) -> Option<&SensorReading> {
        let after = self.entries.partition_point(|(time, _)| *time <= timestamp);
        after
            .checked_sub(1)
            .map(|index| &self.entries[index].1)
    }
}
