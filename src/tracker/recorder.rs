//! The recording state machine: one bounded buffer of per-tick records with
//! an explicit start / stop / flush lifecycle.

use std::time::Duration;

use nalgebra::Point3;
use thiserror::Error;

/// Recorder lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    /// Not recording; ticks pass through without producing records.
    #[default]
    Idle,
    /// Appending one record per processed tick.
    Recording,
    /// Buffer closed (explicit stop or capacity reached), waiting to be
    /// drained to the writer. Draining returns to `Idle`.
    Flushing,
}

impl std::fmt::Display for RecorderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecorderState::Idle => "idle",
            RecorderState::Recording => "recording",
            RecorderState::Flushing => "flushing",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("cannot {operation} while {state}")]
    InvalidTransition {
        state: RecorderState,
        operation: &'static str,
    },
}

/// What a successful [`FrameRecorder::record`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Record appended; recording continues.
    Recorded,
    /// Record appended and the buffer reached capacity; the recorder
    /// auto-stopped and must be drained before the next session.
    BufferFull,
}

/// One recorded tick.
///
/// Absent quantities are `None`: a marker the locator missed (or whose pixel
/// had no valid depth mapping) and an untracked body are data, not errors.
/// The serialized form keeps a fixed column count regardless.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRecord {
    /// Time of the tick, relative to the session clock.
    pub timestamp: Duration,
    /// Marker position in camera space, when found and depth-mapped.
    pub marker: Option<Point3<f32>>,
    /// Sampled joint positions in the trajectory format's joint order, when
    /// a skeleton was tracked.
    pub joints: Option<Vec<Point3<f32>>>,
}

/// Accumulates one [`FrameRecord`] per processed tick into a bounded buffer.
///
/// Lifecycle: `Idle → Recording → Flushing → Idle`. Reaching `max_frames`
/// forces the transition to `Flushing`; every transition taken out of order
/// is an [`RecorderError::InvalidTransition`].
#[derive(Debug)]
pub struct FrameRecorder {
    state: RecorderState,
    buffer: Vec<FrameRecord>,
    max_frames: usize,
}

impl FrameRecorder {
    pub fn new(max_frames: usize) -> Self {
        assert!(max_frames > 0, "recorder capacity must be positive");
        Self {
            state: RecorderState::Idle,
            buffer: Vec::new(),
            max_frames,
        }
    }

    #[inline]
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Number of records currently buffered.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Begin a recording session. Valid only from `Idle`.
    pub fn start(&mut self) -> Result<(), RecorderError> {
        if self.state != RecorderState::Idle {
            return Err(RecorderError::InvalidTransition {
                state: self.state,
                operation: "start",
            });
        }
        self.buffer.clear();
        self.buffer.reserve(self.max_frames);
        self.state = RecorderState::Recording;
        tracing::info!(max_frames = self.max_frames, "recording started");
        Ok(())
    }

    /// Request the end of the session. Valid only from `Recording`.
    pub fn stop(&mut self) -> Result<(), RecorderError> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::InvalidTransition {
                state: self.state,
                operation: "stop",
            });
        }
        self.state = RecorderState::Flushing;
        tracing::info!(frames = self.buffer.len(), "recording stopped");
        Ok(())
    }

    /// Append one record. Valid only while `Recording`.
    ///
    /// When the append fills the buffer the recorder auto-stops and reports
    /// [`RecordOutcome::BufferFull`].
    pub fn record(&mut self, record: FrameRecord) -> Result<RecordOutcome, RecorderError> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::InvalidTransition {
                state: self.state,
                operation: "record",
            });
        }
        self.buffer.push(record);
        if self.buffer.len() >= self.max_frames {
            self.state = RecorderState::Flushing;
            tracing::info!(frames = self.buffer.len(), "record buffer full, auto-stopping");
            return Ok(RecordOutcome::BufferFull);
        }
        Ok(RecordOutcome::Recorded)
    }

    /// Hand over the buffered records and reset to `Idle`. Valid only from
    /// `Flushing`.
    pub fn drain(&mut self) -> Result<Vec<FrameRecord>, RecorderError> {
        if self.state != RecorderState::Flushing {
            return Err(RecorderError::InvalidTransition {
                state: self.state,
                operation: "drain",
            });
        }
        let records = std::mem::take(&mut self.buffer);
        self.state = RecorderState::Idle;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn absent_record(millis: u64) -> FrameRecord {
        FrameRecord {
            timestamp: Duration::from_millis(millis),
            marker: None,
            joints: None,
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut rec = FrameRecorder::new(10);
        assert_eq!(rec.state(), RecorderState::Idle);
        rec.start().unwrap();
        assert_eq!(rec.state(), RecorderState::Recording);
        assert_eq!(rec.record(absent_record(0)).unwrap(), RecordOutcome::Recorded);
        rec.stop().unwrap();
        assert_eq!(rec.state(), RecorderState::Flushing);
        let records = rec.drain().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(rec.state(), RecorderState::Idle);
        assert!(rec.is_empty());
    }

    #[test]
    fn test_absent_ticks_produce_absent_records() {
        let mut rec = FrameRecorder::new(100);
        rec.start().unwrap();
        for i in 0..5 {
            rec.record(absent_record(i * 33)).unwrap();
        }
        rec.stop().unwrap();
        let records = rec.drain().unwrap();
        assert_eq!(records.len(), 5);
        for r in &records {
            assert!(r.marker.is_none());
            assert!(r.joints.is_none());
        }
    }

    #[test]
    fn test_buffer_full_auto_stops() {
        let mut rec = FrameRecorder::new(3);
        rec.start().unwrap();
        assert_eq!(rec.record(absent_record(0)).unwrap(), RecordOutcome::Recorded);
        assert_eq!(rec.record(absent_record(1)).unwrap(), RecordOutcome::Recorded);
        assert_eq!(rec.record(absent_record(2)).unwrap(), RecordOutcome::BufferFull);
        assert_eq!(rec.state(), RecorderState::Flushing);

        // No more records and no restart until the buffer is drained.
        assert!(rec.record(absent_record(3)).is_err());
        assert!(rec.start().is_err());
        assert_eq!(rec.drain().unwrap().len(), 3);
        assert_eq!(rec.len(), 0);
        rec.start().unwrap();
    }

    #[test]
    fn test_invalid_transitions() {
        let mut rec = FrameRecorder::new(10);
        assert!(rec.stop().is_err());
        assert!(rec.record(absent_record(0)).is_err());
        assert!(rec.drain().is_err());
        rec.start().unwrap();
        assert!(rec.start().is_err());
        assert!(rec.drain().is_err());
    }

    #[test]
    fn test_records_keep_order() {
        let mut rec = FrameRecorder::new(10);
        rec.start().unwrap();
        for i in 0..4 {
            rec.record(absent_record(i)).unwrap();
        }
        rec.stop().unwrap();
        let records = rec.drain().unwrap();
        let stamps: Vec<_> = records.iter().map(|r| r.timestamp.as_millis()).collect();
        assert_eq!(stamps, vec![0, 1, 2, 3]);
    }
}
