use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LapRecord {
    /// 1-based, contiguous across the ledger.
    pub index: usize,
    /// Cumulative elapsed time when the lap was taken.
    pub time_ms: f64,
    pub delta_ms: f64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LapTags {
    pub fastest: bool,
    pub slowest: bool,
}

/// Chronological list of laps. Display code walks it with `newest_first`.
#[derive(Debug, Clone, Default)]
pub struct LapLedger {
    laps: Vec<LapRecord>,
}

impl LapLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LapRecord> {
        self.laps.iter()
    }

    pub fn newest_first(&self) -> std::iter::Rev<std::slice::Iter<'_, LapRecord>> {
        self.laps.iter().rev()
    }

    pub fn last(&self) -> Option<&LapRecord> {
        self.laps.last()
    }

    pub fn get(&self, index: usize) -> Option<&LapRecord> {
        self.laps.iter().find(|lap| lap.index == index)
    }

    pub fn record_lap(&mut self, time_ms: f64, recorded_at: DateTime<Utc>) -> &LapRecord {
        let previous_ms = self.laps.last().map(|lap| lap.time_ms).unwrap_or(0.0);
        let lap = LapRecord {
            index: self.laps.len() + 1,
            time_ms,
            delta_ms: (time_ms - previous_ms).max(0.0),
            recorded_at,
        };
        self.laps.push(lap);
        &self.laps[self.laps.len() - 1]
    }

    /// Removes the lap carrying `index` and renumbers the rest from 1.
    /// Deltas of the remaining laps are kept as recorded.
    pub fn delete_lap(&mut self, index: usize) -> Option<LapRecord> {
        let position = self.laps.iter().position(|lap| lap.index == index)?;
        let removed = self.laps.remove(position);
        for (position, lap) in self.laps.iter_mut().enumerate() {
            lap.index = position + 1;
        }
        Some(removed)
    }

    pub fn clear(&mut self) -> usize {
        let count = self.laps.len();
        self.laps.clear();
        count
    }

    /// Tags in chronological order, one per lap. Ties share a tag and one lap
    /// may be both fastest and slowest; fewer than two laps yields no tags.
    pub fn fastest_and_slowest(&self) -> Vec<LapTags> {
        if self.laps.len() < 2 {
            return vec![LapTags::default(); self.laps.len()];
        }

        let min = self
            .laps
            .iter()
            .map(|lap| lap.delta_ms)
            .fold(f64::INFINITY, f64::min);
        let max = self
            .laps
            .iter()
            .map(|lap| lap.delta_ms)
            .fold(f64::NEG_INFINITY, f64::max);

        self.laps
            .iter()
            .map(|lap| LapTags {
                fastest: lap.delta_ms == min,
                slowest: lap.delta_ms == max,
            })
            .collect()
    }
}
