use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::annotator::{Annotation, FrameAnnotator};
use crate::config::{Config, DistanceConfig, OverlayConfig};
use crate::detection::{Detection, DetectionKind};
use crate::distance::{estimate_distance, DistanceEstimate, FixedDepthRaycaster, Raycaster};
use crate::geometry::Viewport;
use crate::orientation::DeviceOrientation;
use crate::overlay::OverlaySet;

/// Everything the detector and session services report for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    #[serde(default)]
    pub orientation: DeviceOrientation,
    pub viewport: Viewport,
    /// Camera position in world space, when an AR session is running
    #[serde(default)]
    pub camera_position: Option<Point3<f32>>,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    pub frame_id: u64,
    pub annotations: Vec<Annotation>,
    pub overlays: OverlaySet,
    pub distances: Vec<DistanceEstimate>,
}

pub struct FramePipeline {
    annotator: FrameAnnotator,
    overlay: OverlayConfig,
    distance: DistanceConfig,
}

impl FramePipeline {
    pub fn new(config: &Config) -> Self {
        Self {
            annotator: FrameAnnotator::new(&config.annotator),
            overlay: config.overlay.clone(),
            distance: config.distance.clone(),
        }
    }

    pub fn annotator(&self) -> &FrameAnnotator {
        &self.annotator
    }

    /// Runs one frame with the given raycaster for distance estimates.
    pub fn process_with(
        &self,
        frame_id: u64,
        input: &FrameInput,
        raycaster: Option<&dyn Raycaster>,
    ) -> FrameOutput {
        let annotations =
            self.annotator
                .annotate_detections(&input.detections, input.orientation, input.viewport);

        let overlays = OverlaySet::build(frame_id, &annotations, &self.overlay);

        let distances = match (raycaster, input.camera_position.as_ref()) {
            (Some(raycaster), Some(camera)) => annotations
                .iter()
                .filter(|a| a.kind == DetectionKind::BodyPose)
                .filter_map(|a| {
                    estimate_distance(raycaster, camera, a.index, &a.rect, input.viewport)
                })
                .collect(),
            _ => Vec::new(),
        };

        FrameOutput {
            frame_id,
            annotations,
            overlays,
            distances,
        }
    }

    /// Runs one frame, ray-casting against a fixed-depth plane when the frame has a camera
    /// position.
    pub fn process(&self, frame_id: u64, input: &FrameInput) -> FrameOutput {
        match input.camera_position {
            Some(camera) => {
                let raycaster = FixedDepthRaycaster::new(&self.distance, camera);
                self.process_with(frame_id, input, Some(&raycaster))
            }
            None => self.process_with(frame_id, input, None),
        }
    }
}
