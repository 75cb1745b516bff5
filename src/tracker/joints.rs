//! Skeletal joint data and sampling of the recorded joint subset.

use std::collections::HashMap;

use nalgebra::Point3;

/// Names of skeletal joints the sensor can report.
///
/// Only the joints a trajectory format can reference are listed; the sensor
/// may track more, but the recorder never reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointName {
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    SpineShoulder,
}

impl JointName {
    /// The default recorded subset: the left arm chain plus the spine
    /// shoulder as a torso reference.
    pub const LEFT_ARM: [JointName; 4] = [
        JointName::ShoulderLeft,
        JointName::ElbowLeft,
        JointName::WristLeft,
        JointName::SpineShoulder,
    ];

    /// Right-arm variant of [`JointName::LEFT_ARM`].
    pub const RIGHT_ARM: [JointName; 4] = [
        JointName::ShoulderRight,
        JointName::ElbowRight,
        JointName::WristRight,
        JointName::SpineShoulder,
    ];
}

/// One tracked skeleton: named joint positions in camera space.
///
/// The sensor reports at most one tracked skeleton per tick; an untracked
/// tick carries no `Skeleton` at all.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    joints: HashMap<JointName, Point3<f32>>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_joint(mut self, name: JointName, position: Point3<f32>) -> Self {
        self.joints.insert(name, position);
        self
    }

    pub fn set_joint(&mut self, name: JointName, position: Point3<f32>) {
        self.joints.insert(name, position);
    }

    pub fn joint(&self, name: JointName) -> Option<Point3<f32>> {
        self.joints.get(&name).copied()
    }
}

/// Reads a fixed list of joints from the current skeleton.
///
/// Presence is a single per-tick boolean: no skeleton, or a skeleton missing
/// any requested joint, samples as absent. There is no per-joint flag.
#[derive(Debug, Clone)]
pub struct JointSampler {
    joints: Vec<JointName>,
}

impl JointSampler {
    pub fn new(joints: Vec<JointName>) -> Self {
        Self { joints }
    }

    pub fn joint_names(&self) -> &[JointName] {
        &self.joints
    }

    /// Sample the configured joints, in order, from a tracked skeleton.
    pub fn sample(&self, skeleton: Option<&Skeleton>) -> Option<Vec<Point3<f32>>> {
        let skeleton = skeleton?;
        self.joints
            .iter()
            .map(|&name| skeleton.joint(name))
            .collect()
    }
}

impl Default for JointSampler {
    fn default() -> Self {
        Self::new(JointName::LEFT_ARM.to_vec())
    }
}
