use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use crate::storage::{Storage, save_json};

pub const STATS_KEY: &str = "stats";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DailyStatEntry {
    pub focus_minutes_total: u64,
    pub completed_session_count: u32,
}

/// Focus statistics bucketed by day key, retained indefinitely.
#[derive(Debug, Default, Clone)]
pub struct DailyStats {
    days: BTreeMap<String, DailyStatEntry>,
    /// Set while the store holds an older copy than `days`.
    unsaved: bool,
}

impl DailyStats {
    /// Loads the persisted map. A payload that is not an object yields an empty
    /// history; individual entries that fail to parse are dropped.
    pub fn load(storage: &dyn Storage) -> Self {
        let raw = storage.get(STATS_KEY).unwrap_or_default();
        let map = match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(map) => map,
            Err(err) => {
                if !raw.is_empty() {
                    log::warn!("discarding malformed stats payload: {err}");
                }
                return Self::default();
            }
        };

        let days = map
            .into_iter()
            .filter_map(|(day, value)| match serde_json::from_value(value) {
                Ok(entry) => Some((day, entry)),
                Err(err) => {
                    log::warn!("dropping malformed stats entry for {day}: {err}");
                    None
                }
            })
            .collect();

        Self { days, unsaved: false }
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<()> {
        save_json(storage, STATS_KEY, &self.days)
    }

    pub fn entry(&self, day: &str) -> DailyStatEntry {
        self.days.get(day).copied().unwrap_or_default()
    }

    /// Read-modify-write of the whole map. Persistence is best effort: on a
    /// failed write the in-memory totals still advance, and later records keep
    /// building on them until a write succeeds again.
    pub fn record_completed_work_session(
        &mut self,
        storage: &dyn Storage,
        day: &str,
        credited: Duration,
    ) {
        let mut fresh = if self.unsaved || storage.get(STATS_KEY).is_none() {
            self.clone()
        } else {
            Self::load(storage)
        };
        let entry = fresh.days.entry(day.to_string()).or_default();
        entry.focus_minutes_total =
            entry.focus_minutes_total.saturating_add(round_minutes(credited));
        entry.completed_session_count = entry.completed_session_count.saturating_add(1);

        log::info!(
            "recorded focus session for {day}: {} min / {} sessions",
            entry.focus_minutes_total,
            entry.completed_session_count
        );

        fresh.unsaved = match fresh.save(storage) {
            Ok(()) => false,
            Err(err) => {
                log::warn!("failed to persist stats: {err:#}");
                true
            }
        };
        *self = fresh;
    }

    pub fn summary(&self, day: &str) -> String {
        let entry = self.entry(day);
        let noun = if entry.completed_session_count == 1 { "session" } else { "sessions" };
        format!(
            "Today: {} min focused  •  {} {noun} completed",
            entry.focus_minutes_total, entry.completed_session_count
        )
    }

    /// Newest day first.
    pub fn days(&self) -> impl Iterator<Item = (&str, &DailyStatEntry)> {
        self.days.iter().rev().map(|(day, entry)| (day.as_str(), entry))
    }

    pub fn total_minutes(&self) -> u64 {
        self.days.values().map(|e| e.focus_minutes_total).sum()
    }

    pub fn total_sessions(&self) -> u64 {
        self.days.values().map(|e| u64::from(e.completed_session_count)).sum()
    }

    pub fn export_csv(&self, path: &Path) -> Result<()> {
        let mut csv = String::from("Date,Focus Minutes,Completed Sessions\n");
        for (day, entry) in self.days() {
            csv.push_str(&format!(
                "{},{},{}\n",
                day, entry.focus_minutes_total, entry.completed_session_count
            ));
        }
        fs::write(path, csv)
            .with_context(|| format!("Failed to export stats to {}", path.display()))
    }
}

/// Whole minutes, half rounding up.
fn round_minutes(d: Duration) -> u64 {
    (d.as_millis() as u64 + 30_000) / 60_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use tempfile::TempDir;

    const DAY: &str = "2026-10-17";

    #[test]
    fn record_creates_then_accumulates() {
        let storage = MemoryStorage::new();
        let mut stats = DailyStats::load(&storage);
        assert_eq!(stats.entry(DAY), DailyStatEntry::default());

        stats.record_completed_work_session(&storage, DAY, Duration::from_secs(25 * 60));
        stats.record_completed_work_session(&storage, DAY, Duration::from_secs(25 * 60));

        let expected = DailyStatEntry { focus_minutes_total: 50, completed_session_count: 2 };
        assert_eq!(stats.entry(DAY), expected);
        assert_eq!(DailyStats::load(&storage).entry(DAY), expected);
    }

    #[test]
    fn persisted_shape_is_camel_case_map() {
        let storage = MemoryStorage::new();
        let mut stats = DailyStats::default();
        stats.record_completed_work_session(&storage, DAY, Duration::from_secs(60));

        let raw: Value = serde_json::from_str(&storage.get(STATS_KEY).unwrap()).unwrap();
        assert_eq!(raw[DAY]["focusMinutesTotal"], 1);
        assert_eq!(raw[DAY]["completedSessionCount"], 1);
    }

    #[test]
    fn credited_minutes_are_rounded() {
        assert_eq!(round_minutes(Duration::from_secs(89)), 1);
        assert_eq!(round_minutes(Duration::from_secs(90)), 2);
        assert_eq!(round_minutes(Duration::from_secs(29)), 0);
    }

    #[test]
    fn malformed_payloads_degrade_to_defaults() {
        let storage = MemoryStorage::new();
        storage.set(STATS_KEY, "[1, 2, 3]").unwrap();
        assert_eq!(DailyStats::load(&storage).days().count(), 0);

        storage
            .set(
                STATS_KEY,
                r#"{"2026-10-16": {"focusMinutesTotal": 50}, "2026-10-15": "oops"}"#,
            )
            .unwrap();
        let stats = DailyStats::load(&storage);
        assert_eq!(stats.days().count(), 1);
        assert_eq!(
            stats.entry("2026-10-16"),
            DailyStatEntry { focus_minutes_total: 50, completed_session_count: 0 }
        );
    }

    #[test]
    fn failed_write_keeps_in_memory_totals() {
        let storage = MemoryStorage::new();
        storage.set_failing(true);
        let mut stats = DailyStats::default();

        stats.record_completed_work_session(&storage, DAY, Duration::from_secs(25 * 60));
        stats.record_completed_work_session(&storage, DAY, Duration::from_secs(25 * 60));
        assert_eq!(stats.entry(DAY).completed_session_count, 2);
        assert_eq!(stats.entry(DAY).focus_minutes_total, 50);
        assert_eq!(storage.get(STATS_KEY), None);
    }

    #[test]
    fn failed_writes_after_saved_history_keep_counting() {
        let storage = MemoryStorage::new();
        let history = r#"{"2026-10-16": {"focusMinutesTotal": 50, "completedSessionCount": 2}}"#;
        storage.set(STATS_KEY, history).unwrap();
        let mut stats = DailyStats::load(&storage);
        storage.set_failing(true);

        for _ in 0..3 {
            stats.record_completed_work_session(&storage, DAY, Duration::from_secs(25 * 60));
        }
        assert_eq!(
            stats.entry(DAY),
            DailyStatEntry { focus_minutes_total: 75, completed_session_count: 3 }
        );
        assert_eq!(stats.entry("2026-10-16").completed_session_count, 2);

        // Once the store recovers, the held totals are written out.
        storage.set_failing(false);
        stats.record_completed_work_session(&storage, DAY, Duration::from_secs(25 * 60));
        let reloaded = DailyStats::load(&storage);
        assert_eq!(reloaded.entry(DAY).completed_session_count, 4);
        assert_eq!(reloaded.entry("2026-10-16").focus_minutes_total, 50);
    }

    #[test]
    fn record_keeps_entries_written_by_another_session() {
        let storage = MemoryStorage::new();
        let mut stats = DailyStats::default();
        stats.record_completed_work_session(&storage, DAY, Duration::from_secs(25 * 60));

        // A second window records its own day after we loaded.
        let mut other = DailyStats::load(&storage);
        other.record_completed_work_session(&storage, "2026-10-16", Duration::from_secs(30 * 60));
        other.record_completed_work_session(&storage, DAY, Duration::from_secs(25 * 60));

        stats.record_completed_work_session(&storage, DAY, Duration::from_secs(25 * 60));
        assert_eq!(stats.entry("2026-10-16").focus_minutes_total, 30);
        assert_eq!(stats.entry(DAY).completed_session_count, 3);
        assert_eq!(DailyStats::load(&storage).entry(DAY).focus_minutes_total, 75);
    }

    #[test]
    fn session_count_saturates() {
        let storage = MemoryStorage::new();
        storage
            .set(STATS_KEY, &format!(r#"{{"{DAY}": {{"completedSessionCount": {}}}}}"#, u32::MAX))
            .unwrap();
        let mut stats = DailyStats::load(&storage);
        stats.record_completed_work_session(&storage, DAY, Duration::from_secs(60));
        assert_eq!(stats.entry(DAY).completed_session_count, u32::MAX);
    }

    #[test]
    fn summary_and_totals() {
        let storage = MemoryStorage::new();
        let mut stats = DailyStats::default();
        stats.record_completed_work_session(&storage, "2026-10-16", Duration::from_secs(25 * 60));
        stats.record_completed_work_session(&storage, DAY, Duration::from_secs(30 * 60));

        assert_eq!(stats.summary(DAY), "Today: 30 min focused  •  1 session completed");
        assert_eq!(stats.summary("2026-10-18"), "Today: 0 min focused  •  0 sessions completed");
        assert_eq!(stats.total_minutes(), 55);
        assert_eq!(stats.total_sessions(), 2);
        assert_eq!(stats.days().next().map(|(day, _)| day), Some(DAY));
    }

    #[test]
    fn export_writes_newest_first() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("export.csv");
        let storage = MemoryStorage::new();
        let mut stats = DailyStats::default();
        stats.record_completed_work_session(&storage, "2026-10-16", Duration::from_secs(25 * 60));
        stats.record_completed_work_session(&storage, DAY, Duration::from_secs(25 * 60));

        stats.export_csv(&path).unwrap();
        let csv = fs::read_to_string(&path).unwrap();
        assert_eq!(
            csv,
            "Date,Focus Minutes,Completed Sessions\n2026-10-17,25,1\n2026-10-16,25,1\n"
        );
    }
}
