//! Shared per-stream state between arrival producers and the evaluator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Thread-safe state for a single monitored stream.
///
/// Arrival instants accumulate in `stamps` between evaluations; each
/// evaluation pass drains the buffer down to its newest entry so memory
/// stays bounded by the arrival count of one evaluation period. The verdict
/// lives in an atomic beside the mutex so readers never contend with an
/// in-flight evaluation.
#[derive(Debug)]
pub(crate) struct MonitorState {
    /// Arrival instants since the last evaluation, in arrival order.
    stamps: Mutex<Vec<Instant>>,
    /// Latest verdict. Starts false until evidence of adequate rate accumulates.
    healthy: AtomicBool,
}

impl MonitorState {
    pub(crate) fn new() -> Self {
        Self {
            stamps: Mutex::new(Vec::new()),
            healthy: AtomicBool::new(false),
        }
    }

    /// Record one arrival at the given instant.
    ///
    /// Holds the buffer lock only for the push. Safe to call from any number
    /// of threads concurrently with an evaluation pass.
    pub(crate) fn record(&self, at: Instant) {
        self.stamps.lock().push(at);
    }

    /// Current verdict. Lock-free, O(1).
    pub(crate) fn healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    /// Number of buffered arrival instants. Test and introspection helper.
    pub(crate) fn stamp_count(&self) -> usize {
        self.stamps.lock().len()
    }

    /// Run one evaluation pass over the buffered arrivals.
    ///
    /// With fewer than two instants there is no gap to judge, so the verdict
    /// is unhealthy. Otherwise the consecutive inter-arrival gaps are checked
    /// against `min_interval`: strict mode fails on the first oversized gap,
    /// average mode fails when the windowed mean gap is oversized. The buffer
    /// is then reseeded with only its newest instant, so the gap that spans
    /// this evaluation boundary is judged by the next pass.
    ///
    /// Arrivals delivered by different threads can land in the buffer
    /// fractionally out of order; such inversions are counted as zero gaps.
    pub(crate) fn evaluate(&self, min_interval: Duration, use_average: bool) -> bool {
        let mut stamps = self.stamps.lock();

        let healthy = if stamps.len() >= 2 {
            if use_average {
                let sum: Duration = stamps
                    .windows(2)
                    .map(|w| w[1].saturating_duration_since(w[0]))
                    .sum();
                // The divisor is the timestamp count, one more than the gap
                // count, which biases the mean low by one sample.
                // TODO: confirm whether this should divide by the gap count;
                // the current divisor matches the behavior deployed in the
                // field and is pinned by tests.
                let mean = sum / stamps.len() as u32;
                mean <= min_interval
            } else {
                stamps
                    .windows(2)
                    .all(|w| w[1].saturating_duration_since(w[0]) <= min_interval)
            }
        } else {
            false
        };

        if let Some(&last) = stamps.last() {
            stamps.clear();
            stamps.push(last);
        }
        drop(stamps);

        self.healthy.store(healthy, Ordering::Release);
        healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const MIN_INTERVAL: Duration = Duration::from_millis(100);

    /// Build a state holding arrivals at the given millisecond offsets.
    fn state_with_offsets(offsets_ms: &[u64]) -> MonitorState {
        let base = Instant::now();
        let state = MonitorState::new();
        for &ms in offsets_ms {
            state.record(base + Duration::from_millis(ms));
        }
        state
    }

    #[test]
    fn empty_buffer_is_unhealthy() {
        let state = MonitorState::new();
        assert!(!state.evaluate(MIN_INTERVAL, false));
        assert!(!state.healthy());
    }

    #[test]
    fn single_arrival_is_unhealthy_but_seeds_next_window() {
        let state = state_with_offsets(&[0]);
        assert!(!state.evaluate(MIN_INTERVAL, false));
        assert_eq!(state.stamp_count(), 1);
    }

    #[test]
    fn strict_healthy_at_exact_minimum_spacing() {
        let state = state_with_offsets(&[0, 100, 200, 300]);
        assert!(state.evaluate(MIN_INTERVAL, false));
    }

    #[test]
    fn strict_healthy_when_faster_than_minimum() {
        let state = state_with_offsets(&[0, 20, 40, 60, 80]);
        assert!(state.evaluate(MIN_INTERVAL, false));
    }

    #[test]
    fn strict_fails_on_single_oversized_gap() {
        // One 150ms gap among otherwise fast arrivals.
        let state = state_with_offsets(&[0, 50, 200, 250]);
        assert!(!state.evaluate(MIN_INTERVAL, false));
    }

    #[test]
    fn average_tolerates_individual_oversized_gaps() {
        // Gaps of 120ms and 120ms both exceed the 100ms minimum, but the
        // mean with the timestamp-count divisor is 240/3 = 80ms.
        let state = state_with_offsets(&[0, 120, 240]);
        assert!(state.evaluate(MIN_INTERVAL, true));
    }

    #[test]
    fn average_fails_when_mean_exceeds_minimum() {
        // Gaps of 160ms: 320/3 ~ 106.7ms > 100ms.
        let state = state_with_offsets(&[0, 160, 320]);
        assert!(!state.evaluate(MIN_INTERVAL, true));
    }

    #[test]
    fn average_divisor_counts_timestamps_not_gaps() {
        // Two gaps of 110ms. Divided by the gap count the mean would be
        // 110ms and fail; divided by the timestamp count it is ~73ms and
        // passes. Pins the deployed divisor.
        let state = state_with_offsets(&[0, 110, 220]);
        assert!(state.evaluate(MIN_INTERVAL, true));
    }

    #[test]
    fn window_reseeds_with_newest_arrival_only() {
        let base = Instant::now();
        let state = MonitorState::new();
        state.record(base);
        state.record(base + Duration::from_millis(50));
        assert!(state.evaluate(MIN_INTERVAL, false));
        assert_eq!(state.stamp_count(), 1);

        // The retained stamp pairs with the next arrival, so the boundary
        // gap is still judged.
        state.record(base + Duration::from_millis(100));
        assert!(state.evaluate(MIN_INTERVAL, false));

        state.record(base + Duration::from_millis(400));
        assert!(!state.evaluate(MIN_INTERVAL, false));
    }

    #[test]
    fn starved_stream_settles_and_stays_unhealthy() {
        let state = state_with_offsets(&[0, 50, 100]);
        assert!(state.evaluate(MIN_INTERVAL, false));

        // No further arrivals: only the stale seed remains, so every
        // subsequent pass reports unhealthy.
        assert!(!state.evaluate(MIN_INTERVAL, false));
        assert!(!state.evaluate(MIN_INTERVAL, false));
        assert_eq!(state.stamp_count(), 1);
    }

    #[test]
    fn out_of_order_arrivals_do_not_panic() {
        let base = Instant::now();
        let state = MonitorState::new();
        state.record(base + Duration::from_millis(10));
        state.record(base); // inversion, counts as a zero gap
        state.record(base + Duration::from_millis(20));
        assert!(state.evaluate(MIN_INTERVAL, false));
    }

    #[test]
    fn concurrent_recording_loses_no_arrivals() {
        use std::thread;

        let state = Arc::new(MonitorState::new());
        let base = Instant::now();

        let mut handles = vec![];
        for t in 0..8 {
            let s = state.clone();
            handles.push(thread::spawn(move || {
                for i in 0..100u64 {
                    s.record(base + Duration::from_millis(t * 100 + i));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(state.stamp_count(), 800);

        // All injected instants span 800ms with at most 100ms inversions,
        // so a 1s minimum interval must verdict healthy.
        assert!(state.evaluate(Duration::from_secs(1), false));
        assert_eq!(state.stamp_count(), 1);
    }

    #[test]
    fn recording_during_evaluation_is_safe() {
        use std::thread;

        let state = Arc::new(MonitorState::new());
        let base = Instant::now();
        let recorder = state.clone();

        let producer = thread::spawn(move || {
            for i in 0..1000u64 {
                recorder.record(base + Duration::from_micros(i * 100));
            }
        });

        for _ in 0..50 {
            state.evaluate(Duration::from_secs(1), false);
        }
        producer.join().unwrap();

        // Whatever interleaving occurred, a final pass over the remaining
        // window must succeed and leave exactly the seed behind.
        state.record(base + Duration::from_millis(200));
        assert!(state.evaluate(Duration::from_secs(1), false));
        assert_eq!(state.stamp_count(), 1);
    }
}
