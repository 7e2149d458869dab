//! Process-wide processing statistics.
//!
//! `StatisticsRecorder` is the single owner of the mutable accumulator:
//! concurrent cases call `record_*` and monitoring reads `snapshot()`.
//! Nothing else in the crate touches shared mutable state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::QualityMetrics;

/// Cumulative counters for the life of the process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStatistics {
    pub total_processed: u64,
    pub automated_count: u64,
    pub manual_review_count: u64,
    pub error_count: u64,
    /// Running mean, updated incrementally per case.
    pub average_processing_time: f64,
    /// automated_count / total_processed.
    pub current_automation_rate: f64,
}

/// Optional external monitor notified after every case.
pub trait StatisticsSink: Send + Sync {
    fn record(&self, metrics: &QualityMetrics, processing_time_seconds: f64);
}

/// Mutex-guarded single writer for `ProcessingStatistics`.
pub struct StatisticsRecorder {
    inner: Mutex<ProcessingStatistics>,
    log_interval: u64,
    sink: Option<Arc<dyn StatisticsSink>>,
}

impl StatisticsRecorder {
    pub fn new(log_interval: u64) -> Self {
        Self {
            inner: Mutex::new(ProcessingStatistics::default()),
            log_interval: log_interval.max(1),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn StatisticsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Record a completed case.
    pub fn record_case(&self, metrics: &QualityMetrics, duration: Duration) {
        let seconds = duration.as_secs_f64();
        {
            let mut stats = self.inner.lock().expect("statistics mutex poisoned");
            stats.total_processed += 1;
            if metrics.manual_review_required {
                stats.manual_review_count += 1;
            } else {
                stats.automated_count += 1;
            }
            update_running(&mut stats, seconds);
            self.maybe_log(&stats);
        }

        if let Some(sink) = &self.sink {
            sink.record(metrics, seconds);
        }
    }

    /// Record a failed case. Failures always imply manual review.
    pub fn record_error(&self, duration: Duration) {
        let mut stats = self.inner.lock().expect("statistics mutex poisoned");
        stats.total_processed += 1;
        stats.error_count += 1;
        stats.manual_review_count += 1;
        update_running(&mut stats, duration.as_secs_f64());
        self.maybe_log(&stats);
    }

    /// Point-in-time copy for monitoring.
    pub fn snapshot(&self) -> ProcessingStatistics {
        self.inner.lock().expect("statistics mutex poisoned").clone()
    }

    fn maybe_log(&self, stats: &ProcessingStatistics) {
        if stats.total_processed % self.log_interval == 0 {
            tracing::info!(
                total = stats.total_processed,
                automated = stats.automated_count,
                manual = stats.manual_review_count,
                errors = stats.error_count,
                automation_rate = stats.current_automation_rate,
                avg_seconds = stats.average_processing_time,
                "Processing statistics"
            );
        }
    }
}

fn update_running(stats: &mut ProcessingStatistics, seconds: f64) {
    let n = stats.total_processed as f64;
    stats.average_processing_time += (seconds - stats.average_processing_time) / n;
    stats.current_automation_rate = stats.automated_count as f64 / n;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn metrics(manual: bool) -> QualityMetrics {
        QualityMetrics {
            overall_confidence: 0.9,
            field_confidences: BTreeMap::new(),
            processing_quality: 0.9,
            data_completeness: 0.8,
            cross_validation_score: 0.8,
            manual_review_required: manual,
            automation_rate: if manual { 0.0 } else { 0.92 },
        }
    }

    #[test]
    fn counters_track_case_outcomes() {
        let recorder = StatisticsRecorder::new(10);
        recorder.record_case(&metrics(false), Duration::from_secs(2));
        recorder.record_case(&metrics(true), Duration::from_secs(4));
        recorder.record_error(Duration::from_secs(6));

        let stats = recorder.snapshot();
        assert_eq!(stats.total_processed, 3);
        assert_eq!(stats.automated_count, 1);
        assert_eq!(stats.manual_review_count, 2);
        assert_eq!(stats.error_count, 1);
    }

    #[test]
    fn running_average_is_incremental_mean() {
        let recorder = StatisticsRecorder::new(10);
        recorder.record_case(&metrics(false), Duration::from_secs(2));
        recorder.record_case(&metrics(false), Duration::from_secs(4));
        recorder.record_case(&metrics(false), Duration::from_secs(9));

        let stats = recorder.snapshot();
        assert!(
            (stats.average_processing_time - 5.0).abs() < 1e-9,
            "Expected 5.0, got {}",
            stats.average_processing_time
        );
    }

    #[test]
    fn automation_rate_recomputed_per_case() {
        let recorder = StatisticsRecorder::new(10);
        recorder.record_case(&metrics(false), Duration::from_secs(1));
        assert_eq!(recorder.snapshot().current_automation_rate, 1.0);

        recorder.record_case(&metrics(true), Duration::from_secs(1));
        assert_eq!(recorder.snapshot().current_automation_rate, 0.5);
    }

    struct CountingSink {
        calls: AtomicUsize,
    }

    impl StatisticsSink for CountingSink {
        fn record(&self, _metrics: &QualityMetrics, _seconds: f64) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn sink_notified_per_completed_case() {
        let sink = Arc::new(CountingSink {
            calls: AtomicUsize::new(0),
        });
        let recorder = StatisticsRecorder::new(10).with_sink(sink.clone());
        recorder.record_case(&metrics(false), Duration::from_secs(1));
        recorder.record_case(&metrics(true), Duration::from_secs(1));
        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn concurrent_updates_are_serialized() {
        let recorder = Arc::new(StatisticsRecorder::new(100));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let recorder = recorder.clone();
            handles.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    recorder.record_case(&metrics(false), Duration::from_millis(100));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        let stats = recorder.snapshot();
        assert_eq!(stats.total_processed, 400);
        assert_eq!(stats.automated_count, 400);
        assert!((stats.average_processing_time - 0.1).abs() < 1e-9);
    }
}
