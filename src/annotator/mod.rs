//! Turns one frame's detections into viewport-space rectangles.
//!
//! Everything here is a pure function of its arguments: orientation and
//! viewport are passed in per call and nothing is remembered between frames.

use nalgebra::Point2;
use serde::Serialize;
use tracing::{debug, warn};

use crate::body_pose::{SkeletonObservation, ESSENTIAL_JOINTS};
use crate::config::AnnotatorConfig;
use crate::detection::{Detection, DetectionKind};
use crate::error::AnnotateError;
use crate::geometry::{BoundingBox, Viewport};
use crate::orientation::DeviceOrientation;

/// A rectangle produced for one detection of a frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Position of the source detection in the frame's detection list
    pub index: usize,
    pub kind: DetectionKind,
    /// Viewport pixels
    pub rect: BoundingBox,
    /// Face landmark outlines in viewport pixels, empty for other kinds
    pub landmarks: Vec<Vec<Point2<f32>>>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAnnotator {
    confidence_threshold: f32,
}

impl Default for FrameAnnotator {
    fn default() -> Self {
        Self::new(&AnnotatorConfig::default())
    }
}

impl FrameAnnotator {
    pub fn new(config: &AnnotatorConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
        }
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// True if every essential joint is present with confidence strictly above the threshold.
    pub fn qualifies(&self, observation: &SkeletonObservation) -> bool {
        ESSENTIAL_JOINTS
            .iter()
            .all(|&joint| observation.confidence(joint) > self.confidence_threshold)
    }

    /// Normalized box enclosing the essential joints that have any confidence at all.
    pub fn bounding_box(
        &self,
        observation: &SkeletonObservation,
    ) -> Result<BoundingBox, AnnotateError> {
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x: f32 = 0.0;
        let mut max_y: f32 = 0.0;
        let mut used = 0;

        for joint in ESSENTIAL_JOINTS {
            if let Some(point) = observation.get(joint) {
                if point.confidence > 0.0 {
                    if !point.x.is_finite() || !point.y.is_finite() {
                        return Err(AnnotateError::InvalidObservation(format!(
                            "non-finite position for {:?}: ({}, {})",
                            joint, point.x, point.y
                        )));
                    }
                    min_x = min_x.min(point.x);
                    min_y = min_y.min(point.y);
                    max_x = max_x.max(point.x);
                    max_y = max_y.max(point.y);
                    used += 1;
                }
            }
        }

        if used == 0 {
            return Err(AnnotateError::InvalidObservation(
                "no essential joint has positive confidence".to_string(),
            ));
        }

        if max_x < min_x || max_y < min_y {
            return Err(AnnotateError::InvalidObservation(format!(
                "inverted extents ({}, {}) .. ({}, {})",
                min_x, min_y, max_x, max_y
            )));
        }

        let bbox = BoundingBox::from_extents(min_x, min_y, max_x, max_y);
        if !bbox.is_finite() {
            return Err(AnnotateError::InvalidObservation(format!("box overflows: {:?}", bbox)));
        }
        Ok(bbox)
    }

    /// Maps a normalized detector box into viewport pixels for the given device orientation.
    ///
    /// The detector's space has y pointing up and, outside landscape, its axes
    /// swapped relative to the screen, so landscape sizes swap the viewport
    /// dimensions and each physical orientation gets its own origin formula.
    /// Unknown and flat orientations are treated as portrait.
    pub fn transform(
        bbox: &BoundingBox,
        orientation: DeviceOrientation,
        viewport: Viewport,
    ) -> BoundingBox {
        let (width, height) = if orientation.is_landscape() {
            (bbox.width * viewport.height, bbox.height * viewport.width)
        } else {
            (bbox.width * viewport.width, bbox.height * viewport.height)
        };

        let (x, y) = match orientation {
            DeviceOrientation::LandscapeLeft => (
                bbox.min_y() * viewport.width,
                bbox.min_x() * viewport.height,
            ),
            DeviceOrientation::LandscapeRight => (
                (1.0 - bbox.max_y()) * viewport.width,
                (1.0 - bbox.max_x()) * viewport.height,
            ),
            DeviceOrientation::PortraitUpsideDown => (
                (1.0 - bbox.max_x()) * viewport.width,
                bbox.min_y() * viewport.height,
            ),
            DeviceOrientation::Portrait
            | DeviceOrientation::Unknown
            | DeviceOrientation::FaceUp
            | DeviceOrientation::FaceDown => (
                bbox.min_x() * viewport.width,
                (1.0 - bbox.max_y()) * viewport.height,
            ),
        };

        BoundingBox::new(x, y, width, height)
    }

    /// Viewport boxes for the full-body skeletons of a frame, in input order.
    pub fn annotate(
        &self,
        observations: &[SkeletonObservation],
        orientation: DeviceOrientation,
        viewport: Viewport,
    ) -> Vec<BoundingBox> {
        observations
            .iter()
            .enumerate()
            .filter_map(|(index, observation)| match self.skeleton_box(index, observation) {
                Ok(Some(bbox)) => Some(Self::transform(&bbox, orientation, viewport)),
                Ok(None) => None,
                Err(e) => {
                    warn!("skipping observation {}: {}", index, e);
                    None
                }
            })
            .collect()
    }

    /// Normalized box of any kind of detection; `Ok(None)` for a partial body.
    pub fn normalized_box(
        &self,
        detection: &Detection,
    ) -> Result<Option<BoundingBox>, AnnotateError> {
        self.detection_box(0, detection)
    }

    pub fn annotate_detections(
        &self,
        detections: &[Detection],
        orientation: DeviceOrientation,
        viewport: Viewport,
    ) -> Vec<Annotation> {
        let mut annotations = Vec::new();

        for (index, detection) in detections.iter().enumerate() {
            let bbox = match self.detection_box(index, detection) {
                Ok(Some(bbox)) => bbox,
                Ok(None) => continue,
                Err(e) => {
                    warn!("skipping detection {}: {}", index, e);
                    continue;
                }
            };

            let rect = Self::transform(&bbox, orientation, viewport);

            let landmarks = match detection {
                Detection::Face(face) => face
                    .landmarks
                    .iter()
                    .map(|region| landmark_outline(&region.points, &rect))
                    .collect(),
                _ => Vec::new(),
            };

            annotations.push(Annotation {
                index,
                kind: detection.kind(),
                rect,
                landmarks,
            });
        }

        annotations
    }

    fn skeleton_box(
        &self,
        index: usize,
        observation: &SkeletonObservation,
    ) -> Result<Option<BoundingBox>, AnnotateError> {
        if !self.qualifies(observation) {
            debug!("observation {}: partial body detected", index);
            return Ok(None);
        }
        let bbox = self.bounding_box(observation)?;
        debug!("observation {}: full body detected {:?}", index, bbox);
        Ok(Some(bbox))
    }

    fn detection_box(
        &self,
        index: usize,
        detection: &Detection,
    ) -> Result<Option<BoundingBox>, AnnotateError> {
        let bbox = match detection {
            Detection::BodyPose(skeleton) => return self.skeleton_box(index, skeleton),
            Detection::HumanRect(human) => human.bounding_box,
            Detection::Face(face) => face.bounding_box,
        };
        if !bbox.is_finite() {
            return Err(AnnotateError::InvalidObservation(format!(
                "non-finite bounding box {:?}",
                bbox
            )));
        }
        Ok(Some(bbox))
    }
}

// landmark points are normalized to the face box with their axes swapped
fn landmark_outline(points: &[Point2<f32>], face_rect: &BoundingBox) -> Vec<Point2<f32>> {
    points
        .iter()
        .map(|p| {
            Point2::new(
                p.y * face_rect.height + face_rect.x,
                p.x * face_rect.width + face_rect.y,
            )
        })
        .collect()
}
