//! Raster image source
//!
//! The conversion process:
//! 1. Load the image and convert it to grayscale (alpha is ignored)
//! 2. Binarize it so dark artwork becomes foreground
//! 3. Trace the outer border of every foreground region
//! 4. Compress straight runs and close each contour

use super::CurveSource;
use crate::error::{ConvertError, Result};
use crate::geometry::{Bounds, Curve, Point, Scene};
use image::{DynamicImage, GrayImage, ImageReader, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use imageproc::filter::gaussian_blur_f32;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Gaussian sigma of an 11x11 local neighbourhood
const ADAPTIVE_SIGMA: f32 = 2.0;
/// How far below the local mean a pixel must be to count as foreground
const ADAPTIVE_C: i16 = 2;

/// How grayscale pixels are split into foreground and background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMethod {
    /// Pixels at or below the level are foreground
    Fixed(u8),
    /// Level chosen from the histogram with Otsu's method
    Otsu,
    /// Compare each pixel against its Gaussian-weighted neighbourhood
    #[default]
    Adaptive,
}

impl std::str::FromStr for ThresholdMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "otsu" => Ok(ThresholdMethod::Otsu),
            "adaptive" => Ok(ThresholdMethod::Adaptive),
            level => {
                let value: f64 = level
                    .parse()
                    .map_err(|_| format!("expected 0-255, 'otsu' or 'adaptive', got '{s}'"))?;
                if !(0.0..=255.0).contains(&value) {
                    return Err(format!("threshold {value} is outside 0-255"));
                }
                Ok(ThresholdMethod::Fixed(value.round() as u8))
            }
        }
    }
}

/// Options for extracting curves from an image
#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub threshold: ThresholdMethod,
    /// Repeat the first point of each contour at its end
    pub close_contours: bool,
    /// Keep only the end points of straight runs
    pub simplify: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            threshold: ThresholdMethod::default(),
            close_contours: true,
            simplify: true,
        }
    }
}

/// An image file on disk
#[derive(Debug, Clone)]
pub struct RasterSource {
    pub path: PathBuf,
    pub options: RasterOptions,
}

impl RasterSource {
    pub fn new(path: impl AsRef<Path>, options: RasterOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
        }
    }
}

impl CurveSource for RasterSource {
    fn load(&self) -> Result<Scene> {
        let img = ImageReader::open(&self.path)
            .map_err(|e| ConvertError::source_load(&self.path, e))?
            .with_guessed_format()
            .map_err(|e| ConvertError::source_load(&self.path, e))?
            .decode()
            .map_err(|e| ConvertError::source_load(&self.path, e))?;

        let scene = image_scene(&img, &self.options);
        info!(
            path = %self.path.display(),
            curves = scene.curves().len(),
            "Traced image"
        );
        Ok(scene)
    }
}

/// Trace a decoded image into a scene whose frame is the pixel grid.
///
/// The scene is measured by the whole image, not by the traced artwork.
pub fn image_scene(img: &DynamicImage, options: &RasterOptions) -> Scene {
    let gray = img.to_luma8();
    let binary = binarize(&gray, options.threshold);
    let curves = external_contours(&binary, options);

    let (width, height) = (gray.width() as f64, gray.height() as f64);
    Scene::new(curves, height).with_extent(Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: width,
        max_y: height,
    })
}

/// Foreground (dark) pixels become 255, background 0
pub fn binarize(gray: &GrayImage, method: ThresholdMethod) -> GrayImage {
    match method {
        ThresholdMethod::Fixed(level) => threshold(gray, level, ThresholdType::BinaryInverted),
        ThresholdMethod::Otsu => {
            let level = otsu_level(gray);
            debug!(level, "Otsu threshold");
            threshold(gray, level, ThresholdType::BinaryInverted)
        }
        ThresholdMethod::Adaptive => adaptive_threshold(gray),
    }
}

fn adaptive_threshold(gray: &GrayImage) -> GrayImage {
    if gray.width() == 0 || gray.height() == 0 {
        return gray.clone();
    }
    let mean = gaussian_blur_f32(gray, ADAPTIVE_SIGMA);

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let value = gray.get_pixel(x, y)[0] as i16;
        let local = mean.get_pixel(x, y)[0] as i16;
        if value <= local - ADAPTIVE_C {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Outer borders of the outermost foreground regions, in pixel coordinates
pub fn external_contours(binary: &GrayImage, options: &RasterOptions) -> Vec<Curve> {
    let contours = find_contours::<i32>(binary);
    debug!(found = contours.len(), "Contours before filtering");

    contours
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| {
            let raw: Vec<(i32, i32)> = c.points.iter().map(|p| (p.x, p.y)).collect();
            let kept = if options.simplify {
                compress_straight_runs(&raw)
            } else {
                raw
            };

            let mut points: Vec<Point> = kept
                .into_iter()
                .map(|(x, y)| Point::new(x as f64, y as f64))
                .collect();
            if options.close_contours && points.len() > 1 {
                points.push(points[0]);
            }
            Curve::new(points)
        })
        .collect()
}

/// Drop points in the middle of horizontal, vertical or diagonal runs
fn compress_straight_runs(points: &[(i32, i32)]) -> Vec<(i32, i32)> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut kept = vec![points[0]];
    for w in points.windows(3) {
        let step_in = (w[1].0 - w[0].0, w[1].1 - w[0].1);
        let step_out = (w[2].0 - w[1].0, w[2].1 - w[1].1);
        if step_in != step_out {
            kept.push(w[1]);
        }
    }
    kept.push(points[points.len() - 1]);
    kept
}
