//! Serialization of buffered records to the tab-separated trajectory format.

use std::io::{self, Write};
use std::time::Duration;

use crate::tracker::joints::JointName;
use crate::tracker::recorder::FrameRecord;

/// How record timestamps are encoded in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampMode {
    /// Monotonic seconds since the session started. Strictly increasing for
    /// sessions of any length.
    #[default]
    SinceStart,
    /// Seconds wrapped at one hour, matching files produced by earlier
    /// recorders that encoded `minute * 60 + second` and discarded the hour.
    WrapHourly,
}

/// Column schema of the trajectory file: which joints are emitted, in which
/// order, and how timestamps are encoded.
#[derive(Debug, Clone)]
pub struct TrajectoryFormat {
    pub joints: Vec<JointName>,
    pub timestamp_mode: TimestampMode,
}

impl Default for TrajectoryFormat {
    fn default() -> Self {
        Self {
            joints: JointName::LEFT_ARM.to_vec(),
            timestamp_mode: TimestampMode::SinceStart,
        }
    }
}

/// Serializes [`FrameRecord`]s, one text line per record.
///
/// Line layout (every field is followed by a tab, the line ends `\t\n`):
/// `ts  marker_flag  mx  my  mz  body_flag  j1x j1y j1z  ...`
/// Flags are `1` or `-1`; absent groups keep the column count by emitting
/// `-1` and zeroed positions. Floats are fixed-point with six fractional
/// digits.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryWriter {
    format: TrajectoryFormat,
}

impl TrajectoryWriter {
    pub fn new(format: TrajectoryFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> &TrajectoryFormat {
        &self.format
    }

    /// Write all records sequentially to `out`.
    pub fn write_records<W: Write>(&self, out: &mut W, records: &[FrameRecord]) -> io::Result<()> {
        for record in records {
            self.write_record(out, record)?;
        }
        Ok(())
    }

    fn write_record<W: Write>(&self, out: &mut W, record: &FrameRecord) -> io::Result<()> {
        self.write_timestamp(out, record.timestamp)?;

        match &record.marker {
            Some(p) => write!(out, "1\t{:.6}\t{:.6}\t{:.6}\t", p.x, p.y, p.z)?,
            None => write!(out, "-1\t{:.6}\t{:.6}\t{:.6}\t", 0.0, 0.0, 0.0)?,
        }

        match &record.joints {
            Some(joints) => {
                debug_assert_eq!(joints.len(), self.format.joints.len());
                write!(out, "1\t")?;
                for p in joints {
                    write!(out, "{:.6}\t{:.6}\t{:.6}\t", p.x, p.y, p.z)?;
                }
            }
            None => {
                write!(out, "-1\t")?;
                for _ in 0..self.format.joints.len() {
                    write!(out, "{:.6}\t{:.6}\t{:.6}\t", 0.0, 0.0, 0.0)?;
                }
            }
        }

        writeln!(out)
    }

    fn write_timestamp<W: Write>(&self, out: &mut W, timestamp: Duration) -> io::Result<()> {
        let seconds = match self.format.timestamp_mode {
            TimestampMode::SinceStart => timestamp.as_secs(),
            TimestampMode::WrapHourly => timestamp.as_secs() % 3600,
        };
        write!(out, "{}.{:03}\t", seconds, timestamp.subsec_millis())
    }
}
