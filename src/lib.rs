//! Color-marker trajectory tracking and recording for 3D depth sensors.
//!
//! The crate is split into two layers:
//! - [`tracker`]: the core algorithms — HSV color segmentation, marker
//!   localization with a local/full search strategy, joint sampling, the
//!   bounded recording state machine, and the trajectory text serializer.
//! - [`integration`]: the seams to the outside world — the [`FrameSource`]
//!   trait for sensor frame acquisition, the [`TrajectorySink`] trait for
//!   output persistence, and [`RecorderPipeline`] which drives one processing
//!   tick end to end.

pub mod integration;
pub mod tracker;

pub use integration::{
    FileSink, FrameSource, PipelineConfig, RecorderPipeline, SensorFrame, TickReport,
    TrajectoryFormatBuilder, TrajectorySink,
};
pub use tracker::{
    CameraSpaceMap, ColorImage, ColorRange, ColorRangeFilter, FrameRecord, FrameRecorder,
    JointName, JointSampler, LocatorConfig, MarkerLocator, RecorderState, Skeleton,
    TrajectoryFormat, TrajectoryWriter,
};
