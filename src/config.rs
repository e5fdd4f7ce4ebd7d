use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub annotator: AnnotatorConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub distance: DistanceConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnnotatorConfig {
    /// Every essential joint must score strictly above this to count as a full body
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OverlayConfig {
    /// Stroke for full-body skeleton boxes (RGBA)
    #[serde(default = "default_body_color")]
    pub body_color: [u8; 4],
    /// Stroke for human rectangles covering the whole body
    #[serde(default = "default_full_body_color")]
    pub full_body_color: [u8; 4],
    /// Stroke for human rectangles covering the upper body only
    #[serde(default = "default_upper_body_color")]
    pub upper_body_color: [u8; 4],
    #[serde(default = "default_face_color")]
    pub face_color: [u8; 4],
    #[serde(default = "default_landmark_color")]
    pub landmark_color: [u8; 4],
    /// Rectangle stroke width in pixels
    #[serde(default = "default_line_width")]
    pub line_width: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DistanceConfig {
    /// Number of distance readings averaged
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    /// Horizontal field of view of the replay camera (degrees)
    #[serde(default = "default_fov_degrees")]
    pub fov_degrees: f32,
    /// Depth of the plane the replay raycaster hits (meters)
    #[serde(default = "default_plane_depth")]
    pub plane_depth: f32,
}

fn default_confidence_threshold() -> f32 {
    0.3
}

fn default_body_color() -> [u8; 4] {
    [255, 255, 0, 255]
}

fn default_full_body_color() -> [u8; 4] {
    [255, 0, 0, 255]
}

fn default_upper_body_color() -> [u8; 4] {
    [255, 255, 0, 255]
}

fn default_face_color() -> [u8; 4] {
    [255, 255, 0, 255]
}

fn default_landmark_color() -> [u8; 4] {
    [0, 255, 0, 255]
}

fn default_line_width() -> u32 {
    5
}

fn default_history_len() -> usize {
    10
}

fn default_fov_degrees() -> f32 {
    60.0
}

fn default_plane_depth() -> f32 {
    2.0
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            body_color: default_body_color(),
            full_body_color: default_full_body_color(),
            upper_body_color: default_upper_body_color(),
            face_color: default_face_color(),
            landmark_color: default_landmark_color(),
            line_width: default_line_width(),
        }
    }
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            history_len: default_history_len(),
            fov_degrees: default_fov_degrees(),
            plane_depth: default_plane_depth(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("parsing config")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            [annotator]
            confidence_threshold = 0.5

            [overlay]
            line_width = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.annotator.confidence_threshold, 0.5);
        assert_eq!(config.overlay.line_width, 2);
        assert_eq!(config.overlay.landmark_color, [0, 255, 0, 255]);
        assert_eq!(config.distance, DistanceConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml("annotator = 3").is_err());
    }
}
