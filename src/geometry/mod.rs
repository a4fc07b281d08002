//! Planar geometry shared by the curve sources and the toolpath emitter.
//!
//! A [`Scene`] owns the curves handed over by a source adapter together with
//! the height of the frame they were expressed in. Its bounding box is always
//! computed from those same curves. A source may also pin an explicit extent
//! (the pixel grid of an image), which then replaces the curve bounds for
//! scaling and placement.

mod normalize;

use tracing::warn;

pub use normalize::{Transform, flip_y, normalize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl std::ops::Add for Point {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new()
    }
}

impl Bounds {
    /// An empty box that absorbs the first point it is updated with
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Self {
        let mut bounds = Self::new();
        for p in points {
            bounds.update(p.x, p.y);
        }
        bounds
    }

    pub fn update(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn merge(&mut self, other: &Bounds) {
        if other.is_valid() {
            self.min_x = self.min_x.min(other.min_x);
            self.min_y = self.min_y.min(other.min_y);
            self.max_x = self.max_x.max(other.max_x);
            self.max_y = self.max_y.max(other.max_y);
        }
    }

    /// False until at least one point has been added
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite() && self.min_y.is_finite()
    }

    pub fn width(&self) -> f64 {
        if self.is_valid() {
            self.max_x - self.min_x
        } else {
            0.0
        }
    }

    pub fn height(&self) -> f64 {
        if self.is_valid() {
            self.max_y - self.min_y
        } else {
            0.0
        }
    }

    pub fn longest_side(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn center(&self) -> Option<Point> {
        self.is_valid().then(|| {
            Point::new(
                (self.min_x + self.max_x) / 2.0,
                (self.min_y + self.max_y) / 2.0,
            )
        })
    }
}

/// An ordered run of points traced in the order given.
///
/// Contours coming from a raster source are implicitly closed; whether the
/// start point is repeated at the end is up to the adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    points: Vec<Point>,
}

impl Curve {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }
}

impl FromIterator<Point> for Curve {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Curve::new(iter.into_iter().collect())
    }
}

/// Curves in a source frame, with the frame height used for the vertical flip.
#[derive(Debug, Clone)]
pub struct Scene {
    curves: Vec<Curve>,
    bounds: Bounds,
    extent: Option<Bounds>,
    frame_height: f64,
    anchor_x: f64,
}

impl Scene {
    /// Build a scene anchored at the frame origin (x = 0).
    ///
    /// Curves without points are dropped.
    pub fn new(curves: Vec<Curve>, frame_height: f64) -> Self {
        let total = curves.len();
        let curves: Vec<Curve> = curves.into_iter().filter(|c| !c.is_empty()).collect();
        if curves.len() != total {
            warn!("Dropped {} curve(s) without points", total - curves.len());
        }

        let mut bounds = Bounds::new();
        for curve in &curves {
            bounds.merge(&Bounds::from_points(curve.points()));
        }

        Self {
            curves,
            bounds,
            extent: None,
            frame_height,
            anchor_x: 0.0,
        }
    }

    /// Measure the scene by a fixed box instead of its curves.
    ///
    /// Raster sources use the image rectangle, so a small mark on a large
    /// canvas keeps its size relative to the canvas.
    pub fn with_extent(mut self, extent: Bounds) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Anchor the scene at its own left edge instead of the frame origin.
    ///
    /// Used for vector sources whose geometry does not start at x = 0.
    pub fn anchored_at_min_x(mut self) -> Self {
        self.anchor_x = if self.bounds.is_valid() {
            self.bounds.min_x
        } else {
            0.0
        };
        self
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Box used for the longest side and the center during normalization
    pub fn extent(&self) -> Bounds {
        self.extent.unwrap_or(self.bounds)
    }

    pub fn frame_height(&self) -> f64 {
        self.frame_height
    }

    /// X coordinate subtracted from every point before scaling
    pub fn anchor_x(&self) -> f64 {
        self.anchor_x
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.curves.iter().map(Curve::len).sum()
    }
}
