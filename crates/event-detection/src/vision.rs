//! Vision detector (tailgating via the front camera)
//!
//! Classical contour-based blob detection: the largest foreground object's
//! bounding box, as a fraction of frame area, is the proximity proxy. A
//! vehicle filling the frame is a vehicle close behind the one ahead.

use crate::{Detection, DetectionConfig, EventKind, Severity};
use frame_ring::CameraFrame;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::dilate;
use tracing::debug;

/// Canny hysteresis thresholds
const CANNY_LOW: f32 = 50.0;
const CANNY_HIGH: f32 = 150.0;

/// Blobs below this fraction of frame area are noise, not vehicles
const MIN_BLOB_FRACTION: f64 = 0.02;

/// Axis-aligned bounding box of a contour
#[derive(Debug, Clone, Copy)]
struct BoundingBox {
    width: u32,
    height: u32,
}

impl BoundingBox {
    fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Frame-count-debounced tailgating classifier
///
/// Requires N consecutive frames with an over-threshold blob before firing;
/// one under-threshold frame resets the count. The debounce is frame-based,
/// not time-based, so it tracks the camera rate rather than the wall clock.
pub struct VisionDetector {
    config: DetectionConfig,
    consecutive_frames: u32,
}

impl VisionDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            consecutive_frames: 0,
        }
    }

    /// Analyze one camera frame
    pub fn analyze_frame(&mut self, frame: &CameraFrame) -> Option<Detection> {
        let area_pct = self.largest_blob_area_pct(frame)?;

        if area_pct < self.config.vision_warning_area_pct {
            self.consecutive_frames = 0;
            return None;
        }

        self.consecutive_frames += 1;
        if self.consecutive_frames < self.config.vision_min_frames {
            debug!(
                area_pct,
                frames = self.consecutive_frames,
                "vehicle filling frame, debouncing"
            );
            return None;
        }
        self.consecutive_frames = 0;

        let severity = if area_pct >= self.config.vision_tailgate_area_pct {
            Severity::High
        } else {
            Severity::Medium
        };

        // Rough following distance, inversely related to blob size. An
        // approximation for the operator, not a metric measurement.
        let approx_distance_m = (100.0 - area_pct * 3.0).max(5.0);
        debug!(area_pct, approx_distance_m, "tailgating detected");

        Some(Detection {
            kind: EventKind::Tailgating,
            severity,
            metric_value: area_pct,
        })
    }

    /// Bounding-box area of the largest foreground blob, in percent of frame
    /// area; `None` when the frame decodes to nothing usable.
    fn largest_blob_area_pct(&self, frame: &CameraFrame) -> Option<f64> {
        let gray = GrayImage::from_raw(frame.width, frame.height, frame.to_grayscale())?;

        let blurred = gaussian_blur_f32(&gray, 1.4);
        let edges = canny(&blurred, CANNY_LOW, CANNY_HIGH);
        // Close small gaps so a vehicle outline becomes one contour
        let dilated = dilate(&edges, Norm::LInf, 2);

        let frame_area = frame.area() as f64;
        let min_blob_area = frame_area * MIN_BLOB_FRACTION;

        let largest = find_contours::<i32>(&dilated)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer)
            .filter_map(|c| bounding_box(&c.points))
            .map(|b| b.area() as f64)
            .filter(|area| *area >= min_blob_area)
            .fold(0.0f64, f64::max);

        Some(largest / frame_area * 100.0)
    }
}

fn bounding_box(points: &[imageproc::point::Point<i32>]) -> Option<BoundingBox> {
    let first = points.first()?;
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some(BoundingBox {
        width: (max_x - min_x + 1) as u32,
        height: (max_y - min_y + 1) as u32,
    })
}
