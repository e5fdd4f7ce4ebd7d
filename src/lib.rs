pub mod annotator;
pub mod body_pose;
pub mod config;
pub mod detection;
pub mod distance;
pub mod error;
pub mod geometry;
pub mod orientation;
pub mod overlay;
pub mod pipeline;
pub mod replay;
pub mod utils;

pub use annotator::{Annotation, FrameAnnotator};
pub use error::AnnotateError;
pub use geometry::{BoundingBox, Viewport};
pub use orientation::DeviceOrientation;
