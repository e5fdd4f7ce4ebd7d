use nalgebra::{Point2, Point3, Vector3};
use serde::Serialize;

use crate::config::DistanceConfig;
use crate::geometry::{BoundingBox, Viewport};

/// Finds the world point behind a screen point. Implemented by the AR session.
pub trait Raycaster {
    fn raycast(&self, screen_point: &Point2<f32>, viewport: Viewport) -> Option<Point3<f32>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceEstimate {
    /// Index of the detection in its frame
    pub index: usize,
    pub meters: f32,
}

pub fn euclidean_distance(a: &Point3<f32>, b: &Point3<f32>) -> f32 {
    (a - b).norm()
}

/// Distance from the camera to whatever the raycaster hits under the center of `rect`.
pub fn estimate_distance(
    raycaster: &dyn Raycaster,
    camera_position: &Point3<f32>,
    index: usize,
    rect: &BoundingBox,
    viewport: Viewport,
) -> Option<DistanceEstimate> {
    let hit = raycaster.raycast(&rect.center(), viewport)?;
    Some(DistanceEstimate {
        index,
        meters: euclidean_distance(camera_position, &hit),
    })
}

/// Pinhole camera looking down -z at a plane a fixed depth away.
///
/// Stands in for the AR session's plane estimation when replaying recordings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedDepthRaycaster {
    camera_position: Point3<f32>,
    fov: f32,
    depth: f32,
}

impl FixedDepthRaycaster {
    pub fn new(config: &DistanceConfig, camera_position: Point3<f32>) -> Self {
        Self {
            camera_position,
            fov: config.fov_degrees.to_radians(),
            depth: config.plane_depth,
        }
    }
}

impl Raycaster for FixedDepthRaycaster {
    fn raycast(&self, screen_point: &Point2<f32>, viewport: Viewport) -> Option<Point3<f32>> {
        if viewport.width <= 0.0 || viewport.height <= 0.0 || self.depth <= 0.0 {
            return None;
        }
        if screen_point.x < 0.0
            || screen_point.y < 0.0
            || screen_point.x > viewport.width
            || screen_point.y > viewport.height
        {
            return None;
        }

        let focal = (viewport.width / 2.0) / (self.fov / 2.0).tan();
        // screen y grows downward, camera y upward
        let direction = Vector3::new(
            (screen_point.x - viewport.width / 2.0) / focal,
            -(screen_point.y - viewport.height / 2.0) / focal,
            -1.0,
        );
        Some(self.camera_position + direction * self.depth)
    }
}
