use anyhow::{bail, Result};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use nalgebra::Point2;
use serde::Serialize;

use crate::annotator::Annotation;
use crate::config::OverlayConfig;
use crate::detection::DetectionKind;
use crate::geometry::{BoundingBox, Viewport};

/// Largest side of a canvas created from a viewport, in pixels.
pub const MAX_CANVAS_DIM: u32 = 16384;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapePath {
    Rect(BoundingBox),
    /// Closed outline through the points
    Polygon(Vec<Point2<f32>>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayShape {
    pub path: ShapePath,
    pub stroke: [u8; 4],
    pub line_width: u32,
}

/// Every shape on screen for one frame.
///
/// A set is never patched: the next frame's set replaces it as a whole.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySet {
    frame_id: u64,
    shapes: Vec<OverlayShape>,
}

impl OverlaySet {
    pub fn empty(frame_id: u64) -> Self {
        Self {
            frame_id,
            shapes: Vec::new(),
        }
    }

    pub fn build(frame_id: u64, annotations: &[Annotation], style: &OverlayConfig) -> Self {
        let mut shapes = Vec::new();

        for annotation in annotations {
            let stroke = match annotation.kind {
                DetectionKind::BodyPose => style.body_color,
                DetectionKind::HumanRect {
                    upper_body_only: true,
                } => style.upper_body_color,
                DetectionKind::HumanRect {
                    upper_body_only: false,
                } => style.full_body_color,
                DetectionKind::Face => style.face_color,
            };
            shapes.push(OverlayShape {
                path: ShapePath::Rect(annotation.rect),
                stroke,
                line_width: style.line_width,
            });

            for outline in annotation.landmarks.iter() {
                shapes.push(OverlayShape {
                    path: ShapePath::Polygon(outline.clone()),
                    stroke: style.landmark_color,
                    line_width: 1,
                });
            }
        }

        Self { frame_id, shapes }
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn shapes(&self) -> &[OverlayShape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Rasterizes every shape onto the image.
    pub fn render(&self, image: &mut RgbaImage) {
        for shape in self.shapes.iter() {
            let color = Rgba(shape.stroke);
            match &shape.path {
                ShapePath::Rect(rect) => draw_thick_rect(image, rect, color, shape.line_width),
                ShapePath::Polygon(points) => draw_closed_polyline(image, points, color),
            }
        }
    }
}

/// Opaque black canvas the size of the viewport.
pub fn blank_canvas(viewport: Viewport) -> Result<RgbaImage> {
    let width = viewport.width.round();
    let height = viewport.height.round();
    if !width.is_finite() || !height.is_finite() || width < 1.0 || height < 1.0 {
        bail!("viewport {}x{} has no pixels", viewport.width, viewport.height);
    }
    if width > MAX_CANVAS_DIM as f32 || height > MAX_CANVAS_DIM as f32 {
        bail!(
            "viewport {}x{} exceeds the {} px canvas limit",
            viewport.width,
            viewport.height,
            MAX_CANVAS_DIM
        );
    }
    Ok(RgbaImage::from_pixel(width as u32, height as u32, Rgba([0, 0, 0, 255])))
}

// stroke is centered on the rectangle edge
fn draw_thick_rect(image: &mut RgbaImage, rect: &BoundingBox, color: Rgba<u8>, line_width: u32) {
    let rect = match rect.to_pixel_rect() {
        Some(rect) => rect,
        None => return,
    };

    let half = (line_width.max(1) / 2) as i32;
    for i in 0..line_width.max(1) as i32 {
        let grow = i - half;
        let width = rect.width() as i32 + 2 * grow;
        let height = rect.height() as i32 + 2 * grow;
        if width < 1 || height < 1 {
            continue;
        }
        let ring =
            Rect::at(rect.left() - grow, rect.top() - grow).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(image, ring, color);
    }
}

fn draw_closed_polyline(image: &mut RgbaImage, points: &[Point2<f32>], color: Rgba<u8>) {
    if points.len() < 2 {
        return;
    }
    for (i, start) in points.iter().enumerate() {
        let end = &points[(i + 1) % points.len()];
        draw_line_segment_mut(image, (start.x, start.y), (end.x, end.y), color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(kind: DetectionKind, rect: BoundingBox) -> Annotation {
        Annotation {
            index: 0,
            kind,
            rect,
            landmarks: Vec::new(),
        }
    }

    #[test]
    fn test_build_colors_by_kind() {
        let style = OverlayConfig::default();
        let rect = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        let set = OverlaySet::build(
            7,
            &[
                annotation(DetectionKind::BodyPose, rect),
                annotation(
                    DetectionKind::HumanRect {
                        upper_body_only: false,
                    },
                    rect,
                ),
                annotation(
                    DetectionKind::HumanRect {
                        upper_body_only: true,
                    },
                    rect,
                ),
            ],
            &style,
        );
        assert_eq!(set.frame_id(), 7);
        let strokes: Vec<_> = set.shapes().iter().map(|s| s.stroke).collect();
        assert_eq!(
            strokes,
            vec![style.body_color, style.full_body_color, style.upper_body_color]
        );
        assert!(set.shapes().iter().all(|s| s.line_width == 5));
    }

    #[test]
    fn test_build_adds_landmark_outlines() {
        let mut face = annotation(DetectionKind::Face, BoundingBox::new(0.0, 0.0, 10.0, 10.0));
        face.landmarks = vec![vec![
            Point2::new(1.0, 1.0),
            Point2::new(5.0, 1.0),
            Point2::new(3.0, 4.0),
        ]];
        let set = OverlaySet::build(1, &[face], &OverlayConfig::default());
        assert_eq!(set.len(), 2);
        assert!(matches!(set.shapes()[1].path, ShapePath::Polygon(ref p) if p.len() == 3));
    }

    #[test]
    fn test_render_strokes_edges_only() {
        let mut image = RgbaImage::new(100, 100);
        let set = OverlaySet::build(
            0,
            &[annotation(
                DetectionKind::BodyPose,
                BoundingBox::new(20.0, 20.0, 40.0, 40.0),
            )],
            &OverlayConfig::default(),
        );
        set.render(&mut image);

        let yellow = Rgba([255, 255, 0, 255]);
        assert_eq!(*image.get_pixel(20, 40), yellow);
        assert_eq!(*image.get_pixel(18, 40), yellow);
        assert_eq!(*image.get_pixel(22, 40), yellow);
        assert_eq!(*image.get_pixel(40, 40), Rgba([0, 0, 0, 0]));
        assert_eq!(*image.get_pixel(10, 10), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn test_empty_set_leaves_image_untouched() {
        let mut image = RgbaImage::new(8, 8);
        OverlaySet::empty(3).render(&mut image);
        assert!(image.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn test_blank_canvas_matches_viewport() {
        let canvas = blank_canvas(Viewport::new(390.4, 843.6)).unwrap();
        assert_eq!(canvas.dimensions(), (390, 844));
        assert_eq!(*canvas.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_blank_canvas_rejects_unusable_viewports() {
        assert!(blank_canvas(Viewport::new(1.0e9, 100.0)).is_err());
        assert!(blank_canvas(Viewport::new(100.0, (MAX_CANVAS_DIM + 1) as f32)).is_err());
        assert!(blank_canvas(Viewport::new(0.0, 100.0)).is_err());
        assert!(blank_canvas(Viewport::new(f32::NAN, 100.0)).is_err());
        assert!(blank_canvas(Viewport::new(MAX_CANVAS_DIM as f32, 1.0)).is_ok());
    }
}
