//! Side channel for per-combination events.
//!
//! The ranking functions return their diagnostics as data; the run driver
//! forwards them to a [`RankObserver`] so that callers decide what to do with
//! them (log, collect, ignore).

use std::fmt;
use std::sync::Mutex;

use tracing::{debug, info, warn};

use morphyx_common::MorphyxError;

use crate::pipeline::SkipReason;
use crate::scorer::RankDiagnostics;

/// Identifies one (matrix, bait group, clustering) combination in events.
#[derive(Debug, Clone, Copy)]
pub struct Combination<'a> {
    pub matrix: &'a str,
    pub bait_group: &'a str,
    pub clustering: &'a str,
}

impl fmt::Display for Combination<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': '{}': '{}':", self.matrix, self.bait_group, self.clustering)
    }
}

/// Receives the events of a ranking run. Called from worker threads.
pub trait RankObserver: Send + Sync {
    /// Too few baits present; the combination was not ranked.
    fn on_skipped(&self, combination: &Combination<'_>, present: usize, total: usize, reason: &SkipReason);

    /// Enough baits present; ranking is about to start.
    fn on_ranking(&self, _combination: &Combination<'_>, _present: usize, _total: usize) {}

    fn on_ranked(&self, combination: &Combination<'_>, diagnostics: &RankDiagnostics, ausr: f64);

    /// Ranking this combination failed; the run continues with the next one.
    fn on_failed(&self, combination: &Combination<'_>, error: &MorphyxError);
}

// ── Logging observer ────────────────────────────────────────────────────────

/// Default observer: turns events into `tracing` log lines.
#[derive(Debug, Clone, Copy)]
pub struct TracingObserver {
    ausr_window: usize,
}

impl TracingObserver {
    pub fn new(ausr_window: usize) -> Self {
        Self { ausr_window }
    }
}

impl RankObserver for TracingObserver {
    fn on_skipped(&self, combination: &Combination<'_>, present: usize, total: usize, reason: &SkipReason) {
        info!(
            "{} {}/{} baits present in matrix and clustering. Skipping; {}",
            combination, present, total, reason
        );
    }

    fn on_ranking(&self, combination: &Combination<'_>, present: usize, total: usize) {
        info!(
            "{} {}/{} baits present in matrix and clustering. Calculating",
            combination, present, total
        );
    }

    fn on_ranked(&self, combination: &Combination<'_>, diagnostics: &RankDiagnostics, ausr: f64) {
        if diagnostics.dropped_rows > 0 {
            info!(
                "{} Ignoring {}/{} rows from expression matrix because the corresponding genes do not appear in the clustering",
                combination, diagnostics.dropped_rows, diagnostics.total_rows
            );
        }
        if diagnostics.participating_genes < self.ausr_window {
            debug!(
                "{} only {} genes in bait clusters, fewer than the AUSR window of {}",
                combination, diagnostics.participating_genes, self.ausr_window
            );
        }
        info!("{} AUSR={}", combination, ausr);
    }

    fn on_failed(&self, combination: &Combination<'_>, error: &MorphyxError) {
        warn!("{} Ranking failed: {}", combination, error);
    }
}

// ── Recording observer for tests ───────────────────────────────────────────

/// Event captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum ObservedEvent {
    Skipped { clustering: String, present: usize, total: usize, reason: SkipReason },
    Ranking { clustering: String, present: usize },
    Ranked { clustering: String, dropped_rows: usize, ausr: f64 },
    Failed { clustering: String, message: String },
}

/// Collects every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObservedEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ObservedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    fn push(&self, event: ObservedEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl RankObserver for RecordingObserver {
    fn on_skipped(&self, combination: &Combination<'_>, present: usize, total: usize, reason: &SkipReason) {
        self.push(ObservedEvent::Skipped {
            clustering: combination.clustering.to_string(),
            present,
            total,
            reason: reason.clone(),
        });
    }

    fn on_ranking(&self, combination: &Combination<'_>, present: usize, _total: usize) {
        self.push(ObservedEvent::Ranking {
            clustering: combination.clustering.to_string(),
            present,
        });
    }

    fn on_ranked(&self, combination: &Combination<'_>, diagnostics: &RankDiagnostics, ausr: f64) {
        self.push(ObservedEvent::Ranked {
            clustering: combination.clustering.to_string(),
            dropped_rows: diagnostics.dropped_rows,
            ausr,
        });
    }

    fn on_failed(&self, combination: &Combination<'_>, error: &MorphyxError) {
        self.push(ObservedEvent::Failed {
            clustering: combination.clustering.to_string(),
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combination_prefix() {
        let c = Combination { matrix: "seedling", bait_group: "Flavonoid", clustering: "mcl" };
        assert_eq!(c.to_string(), "'seedling': 'Flavonoid': 'mcl':");
    }

    #[test]
    fn test_recording_observer() {
        let observer = RecordingObserver::new();
        let c = Combination { matrix: "m", bait_group: "g", clustering: "c" };
        let reason = SkipReason::InsufficientBaits { present: 1, required: 8 };
        observer.on_skipped(&c, 1, 3, &reason);
        observer.on_failed(&c, &MorphyxError::Ranking("boom".into()));

        let events = observer.events();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            ObservedEvent::Skipped { clustering: "c".into(), present: 1, total: 3, reason }
        );
        assert!(matches!(&events[1], ObservedEvent::Failed { message, .. } if message.contains("boom")));
    }
}
