//! Bounded snapshot buffers with halving compaction.
//!
//! Both the short-horizon history and the coarse long-horizon trend use
//! the same structure: an append-only, oldest-first sequence with a fixed
//! capacity. When the buffer fills up, the older half is discarded in a
//! single step and appending continues. This trades a visible jump in the
//! retained window for amortized O(1) appends with bounded memory, and it
//! never blocks the producer.

use telemon_types::Snapshot;

/// Default capacity for the short-horizon history buffer.
///
/// At the default 2 s poll interval this covers roughly the last hour of
/// samples (half that immediately after a compaction).
pub const DEFAULT_HISTORY_CAPACITY: usize = 2048;

/// Default capacity for the long-horizon trend buffer.
///
/// Fed about once per minute, so this covers on the order of a day.
pub const DEFAULT_TREND_CAPACITY: usize = 2048;

/// A bounded, oldest-first sequence of snapshots.
///
/// The only mutation is [`push`](Self::push); entries are never edited in
/// place. Timestamps are monotonically non-decreasing because there is a
/// single producer appending in acquisition order.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    capacity: usize,
    entries: Vec<Snapshot>,
}

impl SampleBuffer {
    /// Create an empty buffer holding at most `capacity` snapshots.
    ///
    /// A capacity of zero is treated as one: the buffer then only ever
    /// retains the newest snapshot.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a snapshot, compacting first if the buffer is full.
    ///
    /// Compaction discards the older half of the entries in one step and
    /// keeps the newer half in place and in order. Consumers see the
    /// retained window shrink abruptly at that point; this is the
    /// intended eviction policy, not a defect.
    pub fn push(&mut self, snapshot: Snapshot) {
        if self.entries.len() >= self.capacity {
            let half = self.entries.len() / 2;
            if half == 0 {
                self.entries.clear();
            } else {
                self.entries.drain(..half);
            }
        }
        self.entries.push(snapshot);
    }

    /// The retained snapshots, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[Snapshot] {
        &self.entries
    }

    /// The most recently appended snapshot, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.last()
    }

    /// Number of retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer holds no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The fixed capacity this buffer was created with.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{Duration, Utc};
    use telemon_types::{MeasurementKind, Snapshot};

    use super::SampleBuffer;

    /// A snapshot whose single reading encodes its sequence number.
    fn snap(seq: i64) -> Snapshot {
        let stamp = Utc::now() + Duration::seconds(seq);
        let mut s = Snapshot::new(stamp);
        s.record("probe", MeasurementKind::Temperature, seq as f64);
        s
    }

    fn seqs(buffer: &SampleBuffer) -> Vec<f64> {
        buffer
            .entries()
            .iter()
            .map(|s| s.readings[0].value)
            .collect()
    }

    #[test]
    fn len_never_exceeds_capacity() {
        let mut buffer = SampleBuffer::new(8);
        for i in 0..100 {
            buffer.push(snap(i));
            assert!(buffer.len() <= buffer.capacity());
        }
    }

    #[test]
    fn compaction_keeps_newer_half_then_appends() {
        // Capacity 4, add S1..S5: after S4 the buffer is [S1,S2,S3,S4];
        // S5 triggers compaction to [S3,S4] and then appends.
        let mut buffer = SampleBuffer::new(4);
        for i in 1..=4 {
            buffer.push(snap(i));
        }
        assert_eq!(seqs(&buffer), vec![1.0, 2.0, 3.0, 4.0]);

        buffer.push(snap(5));
        assert_eq!(seqs(&buffer), vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn order_survives_repeated_compactions() {
        let mut buffer = SampleBuffer::new(6);
        for i in 0..50 {
            buffer.push(snap(i));
            let got = seqs(&buffer);
            let mut sorted = got.clone();
            sorted.sort_by(f64::total_cmp);
            assert_eq!(got, sorted);
            assert_eq!(got.last().copied(), Some(i as f64));
        }
    }

    #[test]
    fn capacity_one_keeps_only_newest() {
        let mut buffer = SampleBuffer::new(1);
        buffer.push(snap(1));
        buffer.push(snap(2));
        assert_eq!(seqs(&buffer), vec![2.0]);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut buffer = SampleBuffer::new(0);
        buffer.push(snap(1));
        buffer.push(snap(2));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn latest_tracks_last_push() {
        let mut buffer = SampleBuffer::new(4);
        assert!(buffer.latest().is_none());
        buffer.push(snap(7));
        assert_eq!(buffer.latest().unwrap().readings[0].value, 7.0);
    }
}
