//! Trait for sensor frame acquisition backends.

use crate::tracker::{CameraSpaceMap, ColorImage, Skeleton};

/// One synchronized set of sensor data for a processing tick.
#[derive(Debug, Clone)]
pub struct SensorFrame {
    /// Most recent full-resolution color image.
    pub color: ColorImage,
    /// Per-pixel color-to-camera-space mapping for the same tick.
    pub mapping: CameraSpaceMap,
    /// The tracked skeleton, or `None` when no body is tracked.
    pub skeleton: Option<Skeleton>,
}

/// Trait for sensor acquisition backends.
///
/// Implement this to connect any depth sensor to the recording pipeline.
/// Acquisition is the pacing source: the call blocks until the next frame is
/// available or reports that no fresh frame arrived.
///
/// # Example
///
/// ```ignore
/// use colortrack_rs::{FrameSource, SensorFrame};
///
/// struct MySensor {
///     // Your device handle here
/// }
///
/// impl FrameSource for MySensor {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<SensorFrame>, Self::Error> {
///         // Acquire depth, color and body data and bundle them
///         Ok(None)
///     }
/// }
/// ```
pub trait FrameSource {
    /// Error type for acquisition failures. These are fatal to the caller's
    /// loop; transient absences are expressed in the frame data instead.
    type Error;

    /// Block for the next synchronized frame.
    ///
    /// `Ok(None)` means no fresh frame arrived this tick; the pipeline skips
    /// the tick without recording anything.
    fn next_frame(&mut self) -> Result<Option<SensorFrame>, Self::Error>;
}
