//! Builder for trajectory output formats.

use crate::tracker::{JointName, TimestampMode, TrajectoryFormat};

/// Builder for [`TrajectoryFormat`].
///
/// Starts from an empty joint list; [`build`](Self::build) falls back to the
/// default left-arm schema when no joints were added.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryFormatBuilder {
    joints: Vec<JointName>,
    timestamp_mode: TimestampMode,
}

impl TrajectoryFormatBuilder {
    /// Create a new format builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one joint column group to the schema.
    pub fn joint(mut self, joint: JointName) -> Self {
        self.joints.push(joint);
        self
    }

    /// Append several joint column groups in order.
    pub fn joints<I: IntoIterator<Item = JointName>>(mut self, joints: I) -> Self {
        self.joints.extend(joints);
        self
    }

    /// Set the timestamp encoding.
    pub fn timestamp_mode(mut self, mode: TimestampMode) -> Self {
        self.timestamp_mode = mode;
        self
    }

    /// Build the final `TrajectoryFormat`.
    pub fn build(self) -> TrajectoryFormat {
        let joints = if self.joints.is_empty() {
            JointName::LEFT_ARM.to_vec()
        } else {
            self.joints
        };
        TrajectoryFormat {
            joints,
            timestamp_mode: self.timestamp_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_builder() {
        let format = TrajectoryFormatBuilder::new()
            .joints(JointName::RIGHT_ARM)
            .timestamp_mode(TimestampMode::WrapHourly)
            .build();

        assert_eq!(format.joints, JointName::RIGHT_ARM.to_vec());
        assert_eq!(format.timestamp_mode, TimestampMode::WrapHourly);
    }

    #[test]
    fn test_empty_builder_uses_default_schema() {
        let format = TrajectoryFormatBuilder::new().build();
        assert_eq!(format.joints, JointName::LEFT_ARM.to_vec());
        assert_eq!(format.timestamp_mode, TimestampMode::SinceStart);
    }
}
