use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::body_pose::SkeletonObservation;
use crate::geometry::BoundingBox;

/// A generic human rectangle from the human-rectangles detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanObservation {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub upper_body_only: bool,
}

/// Facial feature outlined by a landmark region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LandmarkRegion {
    LeftEye,
    LeftEyebrow,
    RightEye,
    RightEyebrow,
    Nose,
    OuterLips,
    InnerLips,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceLandmarks {
    pub region: LandmarkRegion,
    // normalized to the face bounding box
    pub points: Vec<Point2<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub landmarks: Vec<FaceLandmarks>,
}

/// One detector result for a frame, whichever detector produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Detection {
    BodyPose(SkeletonObservation),
    HumanRect(HumanObservation),
    Face(FaceObservation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionKind {
    BodyPose,
    HumanRect { upper_body_only: bool },
    Face,
}

impl Detection {
    pub fn kind(&self) -> DetectionKind {
        match self {
            Detection::BodyPose(_) => DetectionKind::BodyPose,
            Detection::HumanRect(human) => DetectionKind::HumanRect {
                upper_body_only: human.upper_body_only,
            },
            Detection::Face(_) => DetectionKind::Face,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged_detections() {
        let json = r#"[
            {"kind": "body_pose", "joints": {"nose": {"x": 0.5, "y": 0.9, "confidence": 0.7}}},
            {"kind": "human_rect", "upper_body_only": true,
             "bounding_box": {"x": 0.1, "y": 0.2, "width": 0.3, "height": 0.4}},
            {"kind": "face", "bounding_box": {"x": 0.4, "y": 0.6, "width": 0.1, "height": 0.1},
             "landmarks": [{"region": "leftEye", "points": [[0.2, 0.3], [0.25, 0.35]]}]}
        ]"#;
        let detections: Vec<Detection> = serde_json::from_str(json).unwrap();
        assert_eq!(detections.len(), 3);
        assert_eq!(detections[0].kind(), DetectionKind::BodyPose);
        assert_eq!(
            detections[1].kind(),
            DetectionKind::HumanRect {
                upper_body_only: true
            }
        );
        match &detections[2] {
            Detection::Face(face) => {
                assert_eq!(face.landmarks[0].region, LandmarkRegion::LeftEye);
                assert_eq!(face.landmarks[0].points[1], Point2::new(0.25, 0.35));
            }
            other => panic!("expected face, got {:?}", other),
        }
    }
}
