//! RecorderPipeline: drives one processing tick end to end, from frame
//! acquisition through marker localization to the recording state machine
//! and the flush-to-sink protocol.

use std::collections::VecDeque;
use std::io;
use std::time::Instant;

use thiserror::Error;

use crate::integration::sink::TrajectorySink;
use crate::integration::source::FrameSource;
use crate::tracker::{
    ColorRange, ColorRangeFilter, FrameRecord, FrameRecorder, JointSampler, LocatorConfig,
    MarkerLocator, RecordOutcome, RecorderError, RecorderState, TrajectoryFormat,
    TrajectoryWriter,
};

/// Configuration for the recording pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// HSV bounds of the tracked marker.
    pub color_range: ColorRange,
    /// Tracking runs on the color frame scaled by this ratio (0 < r <= 1).
    pub downscale: f32,
    /// Local search radius as a fraction of the downscaled frame height.
    /// Must stay below 0.5 so the interior rectangle is non-empty.
    pub local_ratio: f32,
    /// Region-count gate for the locator.
    pub max_regions: usize,
    /// Minimum marker region area in square pixels.
    pub min_area: f64,
    /// Recording buffer capacity; reaching it auto-stops the session.
    pub max_frames: usize,
    /// Output column schema and timestamp encoding.
    pub format: TrajectoryFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            color_range: ColorRange::default(),
            downscale: 0.5,
            local_ratio: 0.2,
            max_regions: 50,
            min_area: 400.0,
            max_frames: 10_000,
            format: TrajectoryFormat::default(),
        }
    }
}

/// Externally injected control events, drained once at the top of each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEvent {
    /// Start recording when idle, stop (and flush) when recording.
    ToggleRecording,
}

/// What one call to [`RecorderPipeline::process_tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickReport {
    /// No fresh sensor frame; nothing was processed or recorded.
    Skipped,
    /// Not recording; marker and body results are available for preview.
    Preview {
        marker: Option<(u32, u32)>,
        body_tracked: bool,
    },
    /// One record appended to the session buffer.
    Recorded {
        marker: Option<(u32, u32)>,
        frames_buffered: usize,
    },
    /// The session ended this tick (stop request or full buffer) and the
    /// buffer was serialized to the sink.
    Flushed { frames_written: usize },
}

#[derive(Debug, Error)]
pub enum PipelineError<SE, KE>
where
    SE: std::error::Error,
    KE: std::error::Error,
{
    #[error("sensor frame acquisition failed: {0}")]
    Source(SE),
    #[error("trajectory sink failed: {0}")]
    Sink(KE),
    #[error(transparent)]
    Recorder(#[from] RecorderError),
    #[error("failed to serialize trajectory: {0}")]
    Serialize(io::Error),
}

/// Single-threaded, tick-driven marker tracking and recording pipeline.
///
/// Owns all shared state of one session: the color filter, the marker
/// locator (with its carried-over search mode), the joint sampler, the
/// recording state machine and the output sink. Control arrives through
/// queued [`ControlEvent`]s drained before each tick, so a stop request
/// always takes effect before that tick's recording decision.
pub struct RecorderPipeline<S: FrameSource, K: TrajectorySink> {
    source: S,
    sink: K,
    filter: ColorRangeFilter,
    // Initialized on the first processed frame, when dimensions are known.
    locator: Option<MarkerLocator>,
    sampler: JointSampler,
    recorder: FrameRecorder,
    writer: TrajectoryWriter,
    events: VecDeque<ControlEvent>,
    session_clock: Instant,
    config: PipelineConfig,
}

impl<S, K> RecorderPipeline<S, K>
where
    S: FrameSource,
    K: TrajectorySink,
    S::Error: std::error::Error,
    K::Error: std::error::Error,
{
    pub fn new(source: S, sink: K, config: PipelineConfig) -> Self {
        Self {
            source,
            sink,
            filter: ColorRangeFilter::new(config.color_range),
            locator: None,
            sampler: JointSampler::new(config.format.joints.clone()),
            recorder: FrameRecorder::new(config.max_frames),
            writer: TrajectoryWriter::new(config.format.clone()),
            events: VecDeque::new(),
            session_clock: Instant::now(),
            config,
        }
    }

    /// Create a pipeline with default configuration.
    pub fn with_default_config(source: S, sink: K) -> Self {
        Self::new(source, sink, PipelineConfig::default())
    }

    /// Queue a recording toggle, as driven by user input. Takes effect at
    /// the top of the next tick.
    pub fn request_toggle(&mut self) {
        self.events.push_back(ControlEvent::ToggleRecording);
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.recorder.state()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.state() == RecorderState::Recording
    }

    /// Get a reference to the underlying frame source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying frame source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a reference to the underlying trajectory sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Get a mutable reference to the underlying trajectory sink.
    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    /// Run one processing tick: drain control events, acquire a frame,
    /// locate the marker, sample joints and update the recorder.
    pub fn process_tick(&mut self) -> Result<TickReport, PipelineError<S::Error, K::Error>> {
        self.drain_events()?;

        let Some(frame) = self.source.next_frame().map_err(PipelineError::Source)? else {
            return Ok(TickReport::Skipped);
        };
        let timestamp = self.session_clock.elapsed();

        let small = frame.color.downscale(self.config.downscale);
        let config = &self.config;
        let locator = self.locator.get_or_insert_with(|| {
            let local_radius = (small.height() as f32 * config.local_ratio) as u32;
            MarkerLocator::new(LocatorConfig {
                max_regions: config.max_regions,
                min_area: config.min_area,
                local_radius,
            })
        });
        let marker_px = locator.locate(&small, &self.filter);

        if self.recorder.state() != RecorderState::Recording {
            return Ok(TickReport::Preview {
                marker: marker_px,
                body_tracked: frame.skeleton.is_some(),
            });
        }

        // A located pixel only counts as a marker when it back-projects to a
        // valid camera-space point at full resolution.
        let marker = marker_px.and_then(|(x, y)| {
            let fx = (x as f32 / self.config.downscale) as u32;
            let fy = (y as f32 / self.config.downscale) as u32;
            frame.mapping.lookup(fx, fy)
        });
        let joints = self.sampler.sample(frame.skeleton.as_ref());

        let outcome = self.recorder.record(FrameRecord {
            timestamp,
            marker,
            joints,
        })?;
        match outcome {
            RecordOutcome::Recorded => Ok(TickReport::Recorded {
                marker: marker_px,
                frames_buffered: self.recorder.len(),
            }),
            RecordOutcome::BufferFull => {
                let frames_written = self.flush()?;
                Ok(TickReport::Flushed { frames_written })
            }
        }
    }

    fn drain_events(&mut self) -> Result<(), PipelineError<S::Error, K::Error>> {
        while let Some(event) = self.events.pop_front() {
            match event {
                ControlEvent::ToggleRecording => match self.recorder.state() {
                    RecorderState::Idle => {
                        self.sink.open().map_err(PipelineError::Sink)?;
                        self.recorder.start()?;
                        self.session_clock = Instant::now();
                    }
                    RecorderState::Recording => {
                        self.recorder.stop()?;
                        self.flush()?;
                    }
                    // Flushing never persists across calls; the flush always
                    // happens in the same call that entered the state.
                    RecorderState::Flushing => {
                        self.flush()?;
                    }
                },
            }
        }
        Ok(())
    }

    /// Serialize the finished session buffer into the sink and reset the
    /// recorder to idle.
    fn flush(&mut self) -> Result<usize, PipelineError<S::Error, K::Error>> {
        let records = self.recorder.drain()?;
        let mut buf = Vec::new();
        self.writer
            .write_records(&mut buf, &records)
            .map_err(PipelineError::Serialize)?;
        self.sink.write(&buf).map_err(PipelineError::Sink)?;
        self.sink.close().map_err(PipelineError::Sink)?;
        tracing::info!(frames = records.len(), "trajectory flushed");
        Ok(records.len())
    }
}
