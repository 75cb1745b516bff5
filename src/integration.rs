//! Integration module connecting sensor hardware and output persistence to
//! the tracking core.
//!
//! This module provides the traits the core consumes — frame acquisition and
//! trajectory persistence — plus the pipeline that drives one processing
//! tick end to end.

mod format_builder;
mod pipeline;
mod sink;
mod source;

pub use format_builder::TrajectoryFormatBuilder;
pub use pipeline::{ControlEvent, PipelineConfig, PipelineError, RecorderPipeline, TickReport};
pub use sink::{FileSink, SinkError, TrajectorySink};
pub use source::{FrameSource, SensorFrame};
