use std::collections::HashMap;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Skeletal landmarks reported by the body-pose detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Joint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    Neck,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    Root,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

/// Joints that must all be confidently observed for a skeleton to count as a full body.
pub const ESSENTIAL_JOINTS: [Joint; 8] = [
    Joint::Nose,
    Joint::Neck,
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

/// Normalized joint position (0.0..1.0, y up) with the detector's confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointObservation {
    pub x: f32,
    pub y: f32,
    pub confidence: f32,
}

impl JointObservation {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    pub fn location(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }
}

// one detected person; joints the detector did not report are simply absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletonObservation {
    joints: HashMap<Joint, JointObservation>,
}

impl SkeletonObservation {
    pub fn new(joints: HashMap<Joint, JointObservation>) -> Self {
        Self { joints }
    }

    pub fn get(&self, joint: Joint) -> Option<&JointObservation> {
        self.joints.get(&joint)
    }

    /// Confidence of a joint, 0.0 when it was not observed.
    pub fn confidence(&self, joint: Joint) -> f32 {
        self.get(joint).map(|j| j.confidence).unwrap_or(0.0)
    }

    pub fn joints(&self) -> impl Iterator<Item = (Joint, &JointObservation)> + '_ {
        self.joints.iter().map(|(&joint, observation)| (joint, observation))
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

impl FromIterator<(Joint, JointObservation)> for SkeletonObservation {
    fn from_iter<I: IntoIterator<Item = (Joint, JointObservation)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_joint_has_zero_confidence() {
        let skeleton: SkeletonObservation = [(Joint::Nose, JointObservation::new(0.5, 0.9, 0.8))]
            .into_iter()
            .collect();
        assert_eq!(skeleton.confidence(Joint::Nose), 0.8);
        assert_eq!(skeleton.confidence(Joint::LeftAnkle), 0.0);
        assert_eq!(skeleton.len(), 1);
    }

    #[test]
    fn test_essential_joints_are_distinct() {
        let unique: std::collections::HashSet<_> = ESSENTIAL_JOINTS.iter().collect();
        assert_eq!(unique.len(), 8);
    }

    #[test]
    fn test_deserialize_joint_map() {
        let json = r#"{"joints":{"leftShoulder":{"x":0.4,"y":0.7,"confidence":0.9}}}"#;
        let skeleton: SkeletonObservation = serde_json::from_str(json).unwrap();
        assert_eq!(skeleton.get(Joint::LeftShoulder).unwrap().x, 0.4);
    }
}
