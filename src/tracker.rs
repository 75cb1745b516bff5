mod color_filter;
mod frame;
mod joints;
mod locator;
mod recorder;
mod search_mode;
mod writer;

pub use color_filter::{ColorRange, ColorRangeFilter};
pub use frame::{CameraSpaceMap, ColorImage, FrameError, PixelRect};
pub use joints::{JointName, JointSampler, Skeleton};
pub use locator::{LocatorConfig, MarkerLocator, RegionStats, find_largest_region, label_regions};
pub use recorder::{FrameRecord, FrameRecorder, RecordOutcome, RecorderError, RecorderState};
pub use search_mode::SearchMode;
pub use writer::{TimestampMode, TrajectoryFormat, TrajectoryWriter};
