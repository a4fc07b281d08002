//! SVG vector source
//!
//! Paths are resolved with usvg (shapes become paths, text becomes glyph
//! outlines and every transform is applied), mapped back into the
//! document's own user units, then flattened into one polyline curve per
//! sub-path with lyon.

use super::CurveSource;
use crate::error::{ConvertError, Result};
use crate::geometry::{Curve, Point, Scene};
use lyon::algorithms::path::iterator::PathIterator;
use lyon::math::point as lyon_point;
use lyon::path::{Event, Path as Outline};
use quick_xml::Reader;
use quick_xml::events::Event as XmlEvent;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use usvg::Transform;
use usvg::tiny_skia_path::{self, PathSegment};

/// Placeholder path for errors raised while parsing in-memory SVG data
const IN_MEMORY: &str = "<svg data>";

/// Options for extracting curves from an SVG document
#[derive(Debug, Clone)]
pub struct VectorOptions {
    /// Largest distance, in document user units, between a curve and the
    /// chords replacing it
    pub curve_resolution: f64,
    /// Load the system fonts so `<text>` can be outlined
    pub system_fonts: bool,
}

impl Default for VectorOptions {
    fn default() -> Self {
        Self {
            curve_resolution: 0.1,
            system_fonts: true,
        }
    }
}

/// An SVG file on disk
#[derive(Debug, Clone)]
pub struct SvgSource {
    pub path: PathBuf,
    pub options: VectorOptions,
}

impl SvgSource {
    pub fn new(path: impl AsRef<Path>, options: VectorOptions) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
        }
    }
}

impl CurveSource for SvgSource {
    fn load(&self) -> Result<Scene> {
        let svg_data = std::fs::read_to_string(&self.path)
            .map_err(|e| ConvertError::source_load(&self.path, e))?;

        let scene = svg_scene(&svg_data, &self.options).map_err(|e| match e {
            ConvertError::SourceLoad { reason, .. } => {
                ConvertError::source_load(&self.path, reason)
            }
            other => other,
        })?;

        info!(
            path = %self.path.display(),
            curves = scene.curves().len(),
            "Flattened SVG paths"
        );
        Ok(scene)
    }
}

/// Build a scene from SVG markup, anchored at the left edge of its paths.
///
/// Coordinates are in the document's user units: the `viewBox` system when
/// there is one, CSS pixels otherwise.
pub fn svg_scene(svg_data: &str, options: &VectorOptions) -> Result<Scene> {
    let tolerance = options.curve_resolution;
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(ConvertError::invalid(
            "curve_resolution",
            format!("{tolerance} is not a positive length"),
        ));
    }

    let frame = document_frame(svg_data)?;
    let declared = frame.declared_height()?;

    let mut usvg_options = usvg::Options::default();
    if options.system_fonts {
        usvg_options.fontdb_mut().load_system_fonts();
    }
    let tree = usvg::Tree::from_str(svg_data, &usvg_options)
        .map_err(|e| ConvertError::source_load(IN_MEMORY, format!("Failed to parse SVG: {}", e)))?;

    // usvg resolves everything into the rendered size; undo the view-box part
    let (frame_height, to_user) = match frame.view_box {
        Some(view_box) => {
            let to_size = view_box_transform(view_box, frame.aspect, tree.size());
            let to_user = to_size.invert().ok_or_else(|| {
                ConvertError::source_load(IN_MEMORY, "viewBox mapping is not invertible")
            })?;
            (view_box[3], to_user)
        }
        None => (tree.size().height() as f64, Transform::identity()),
    };
    debug!(declared, frame_height, "Resolved SVG frame height");

    let mut curves = Vec::new();
    let root = tree.root();
    collect_curves(
        root,
        to_user.pre_concat(root.transform()),
        tolerance as f32,
        &mut curves,
    );

    Ok(Scene::new(curves, frame_height).anchored_at_min_x())
}

/// Horizontal or vertical alignment inside `preserveAspectRatio`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Min,
    Mid,
    Max,
}

impl Align {
    fn offset(self, free: f64) -> f64 {
        match self {
            Align::Min => 0.0,
            Align::Mid => free / 2.0,
            Align::Max => free,
        }
    }
}

/// Parsed `preserveAspectRatio`; no alignment means the view box is
/// stretched to fill the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub align: Option<(Align, Align)>,
    pub slice: bool,
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self {
            align: Some((Align::Mid, Align::Mid)),
            slice: false,
        }
    }
}

/// Frame attributes of the root `<svg>` element
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DocumentFrame {
    /// `min-x min-y width height`, only kept with a positive size
    pub view_box: Option<[f64; 4]>,
    /// `height` with any unit suffix removed
    pub height: Option<f64>,
    pub aspect: AspectRatio,
}

impl DocumentFrame {
    /// The `viewBox` height wins over the `height` attribute. A document
    /// with neither has no frame to flip against.
    pub fn declared_height(&self) -> Result<f64> {
        self.view_box
            .map(|view_box| view_box[3])
            .or(self.height)
            .ok_or(ConvertError::MissingDimension)
    }
}

/// Height declared on the root `<svg>` element
pub fn declared_height(svg_data: &str) -> Result<f64> {
    document_frame(svg_data)?.declared_height()
}

/// Scan the root `<svg>` element for its frame attributes
pub fn document_frame(svg_data: &str) -> Result<DocumentFrame> {
    let mut reader = Reader::from_str(svg_data);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(ref e)) | Ok(XmlEvent::Empty(ref e)) => {
                if e.local_name().as_ref() != b"svg" {
                    return Err(ConvertError::source_load(
                        IN_MEMORY,
                        "root element is not <svg>",
                    ));
                }

                let mut frame = DocumentFrame::default();
                for attr in e.attributes().flatten() {
                    let value = std::str::from_utf8(&attr.value).unwrap_or("");
                    match attr.key.local_name().as_ref() {
                        b"viewBox" => frame.view_box = parse_view_box(value),
                        b"height" => frame.height = parse_length(value),
                        b"preserveAspectRatio" => frame.aspect = parse_aspect_ratio(value),
                        _ => {}
                    }
                }
                return Ok(frame);
            }
            Ok(XmlEvent::Eof) => {
                return Err(ConvertError::source_load(
                    IN_MEMORY,
                    "document has no <svg> element",
                ));
            }
            Err(e) => {
                return Err(ConvertError::source_load(
                    IN_MEMORY,
                    format!("XML parsing error: {:?}", e),
                ));
            }
            _ => {}
        }
        buf.clear();
    }
}

/// "min-x min-y width height" with a positive width and height
fn parse_view_box(value: &str) -> Option<[f64; 4]> {
    let parts: Vec<f64> = value
        .split([',', ' ', '\t', '\n'])
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse().ok())
        .collect();
    match parts[..] {
        [x, y, w, h] if w > 0.0 && h > 0.0 => Some([x, y, w, h]),
        _ => None,
    }
}

/// Numeric part of a length such as "120mm" or "50.5px"
fn parse_length(value: &str) -> Option<f64> {
    let numeric: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    numeric.parse().ok()
}

fn parse_aspect_ratio(value: &str) -> AspectRatio {
    let mut aspect = AspectRatio::default();
    for token in value.split_whitespace() {
        match token {
            "defer" => {}
            "none" => aspect.align = None,
            "meet" => aspect.slice = false,
            "slice" => aspect.slice = true,
            other => {
                if let Some(align) = parse_align(other) {
                    aspect.align = Some(align);
                }
            }
        }
    }
    aspect
}

/// "xMinYMax" and friends
fn parse_align(token: &str) -> Option<(Align, Align)> {
    let (x, y) = token.strip_prefix('x')?.split_once('Y')?;
    let part = |s: &str| match s {
        "Min" => Some(Align::Min),
        "Mid" => Some(Align::Mid),
        "Max" => Some(Align::Max),
        _ => None,
    };
    Some((part(x)?, part(y)?))
}

/// Mapping from view-box user units to the resolved document size
fn view_box_transform(view_box: [f64; 4], aspect: AspectRatio, size: usvg::Size) -> Transform {
    let [x, y, w, h] = view_box;
    let (width, height) = (size.width() as f64, size.height() as f64);

    let (mut sx, mut sy) = (width / w, height / h);
    if aspect.align.is_some() {
        let s = if aspect.slice { sx.max(sy) } else { sx.min(sy) };
        sx = s;
        sy = s;
    }

    let (align_x, align_y) = aspect.align.unwrap_or((Align::Min, Align::Min));
    let tx = -x * sx + align_x.offset(width - w * sx);
    let ty = -y * sy + align_y.offset(height - h * sy);
    Transform::from_row(sx as f32, 0.0, 0.0, sy as f32, tx as f32, ty as f32)
}

/// Walk `group` with `ts` mapping its local coordinates into user units
fn collect_curves(group: &usvg::Group, ts: Transform, tolerance: f32, curves: &mut Vec<Curve>) {
    for child in group.children() {
        match child {
            usvg::Node::Group(g) => {
                collect_curves(g, ts.pre_concat(g.transform()), tolerance, curves)
            }
            usvg::Node::Path(path) => match path.data().clone().transform(ts) {
                Some(data) => flatten_path(&data, tolerance, curves),
                None => warn!(id = path.id(), "Skipping path with degenerate transform"),
            },
            usvg::Node::Image(_) => debug!("Skipping embedded image"),
            usvg::Node::Text(text) => {
                let before = curves.len();
                let outlines = text.flattened();
                collect_curves(
                    outlines,
                    ts.pre_concat(outlines.transform()),
                    tolerance,
                    curves,
                );
                if curves.len() == before {
                    warn!(id = text.id(), "Skipping text without glyph outlines");
                } else {
                    debug!(id = text.id(), curves = curves.len() - before, "Outlined text");
                }
            }
        }
    }
}

/// Append one curve per sub-path of `data`
fn flatten_path(data: &tiny_skia_path::Path, tolerance: f32, curves: &mut Vec<Curve>) {
    let mut current: Vec<Point> = Vec::new();

    for event in outline(data).iter().flattened(tolerance) {
        match event {
            Event::Begin { at } => {
                finish_subpath(&mut current, curves);
                current.push(Point::new(at.x as f64, at.y as f64));
            }
            Event::Line { to, .. } => current.push(Point::new(to.x as f64, to.y as f64)),
            Event::End { close, .. } => {
                if close
                    && let (Some(&first), Some(&last)) = (current.first(), current.last())
                    && first != last
                {
                    current.push(first);
                }
                finish_subpath(&mut current, curves);
            }
            // Flattening leaves only lines
            Event::Quadratic { .. } | Event::Cubic { .. } => {}
        }
    }
    finish_subpath(&mut current, curves);
}

/// Rebuild a resolved usvg path as a lyon path
fn outline(data: &tiny_skia_path::Path) -> Outline {
    let to = |p: tiny_skia_path::Point| lyon_point(p.x, p.y);
    let mut builder = Outline::builder();
    let mut open = false;

    for seg in data.segments() {
        match seg {
            PathSegment::MoveTo(p) => {
                if open {
                    builder.end(false);
                }
                builder.begin(to(p));
                open = true;
            }
            PathSegment::LineTo(p) => {
                builder.line_to(to(p));
            }
            PathSegment::QuadTo(c, p) => {
                builder.quadratic_bezier_to(to(c), to(p));
            }
            PathSegment::CubicTo(c1, c2, p) => {
                builder.cubic_bezier_to(to(c1), to(c2), to(p));
            }
            PathSegment::Close => {
                if open {
                    builder.close();
                    open = false;
                }
            }
        }
    }
    if open {
        builder.end(false);
    }
    builder.build()
}

fn finish_subpath(current: &mut Vec<Point>, curves: &mut Vec<Curve>) {
    if !current.is_empty() {
        curves.push(Curve::new(std::mem::take(current)));
    }
}
