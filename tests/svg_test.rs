//! Integration tests for the SVG source

use laser_gcode::source::vector::svg_scene;
use laser_gcode::{
    ConvertError, ConvertOptions, CurveSource, Point, SvgSource, VectorOptions, convert,
    convert_scene,
};

fn svg(view_box: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="{view_box}">
    {body}
</svg>"#
    )
}

#[test]
fn test_closed_path_becomes_one_curve() {
    let data = svg(
        "0 0 100 50",
        r#"<path d="M 10 10 L 30 10 L 30 20 Z" stroke="black" fill="none"/>"#,
    );
    let scene = svg_scene(&data, &VectorOptions::default()).unwrap();

    assert_eq!(scene.frame_height(), 50.0);
    assert_eq!(scene.curves().len(), 1);
    assert_eq!(
        scene.curves()[0].points(),
        &[
            Point::new(10.0, 10.0),
            Point::new(30.0, 10.0),
            Point::new(30.0, 20.0),
            Point::new(10.0, 10.0),
        ]
    );
    // Vector scenes are anchored at their left edge
    assert_eq!(scene.anchor_x(), 10.0);
}

#[test]
fn test_each_subpath_is_a_curve() {
    let data = svg(
        "0 0 100 100",
        r#"<path d="M 0 0 L 10 0 M 50 50 L 60 60 L 70 50" stroke="black" fill="none"/>
    <g transform="translate(5 5)"><path d="M 0 0 L 1 0" stroke="black"/></g>"#,
    );
    let scene = svg_scene(&data, &VectorOptions::default()).unwrap();

    let lengths: Vec<usize> = scene.curves().iter().map(|c| c.len()).collect();
    assert_eq!(lengths, vec![2, 3, 2]);
    // Group transforms are applied
    assert_eq!(scene.curves()[2].points()[0], Point::new(5.0, 5.0));
}

#[test]
fn test_cubic_curves_are_flattened() {
    let data = svg(
        "0 0 20 20",
        r#"<path d="M 0 0 C 0 10 10 10 10 0" stroke="black" fill="none"/>"#,
    );
    let scene = svg_scene(&data, &VectorOptions::default()).unwrap();

    let points = scene.curves()[0].points();
    assert!(points.len() > 4);
    assert_eq!(points[0], Point::new(0.0, 0.0));
    assert_eq!(*points.last().unwrap(), Point::new(10.0, 0.0));
    assert!(points.iter().all(|p| p.y >= 0.0 && p.y <= 7.5 + 1e-4));
}

#[test]
fn test_height_attribute_is_enough() {
    let data = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="25"><path d="M 0 5 L 40 5" stroke="black"/></svg>"#;
    let scene = svg_scene(data, &VectorOptions::default()).unwrap();
    assert_eq!(scene.frame_height(), 25.0);
}

#[test]
fn test_missing_dimensions() {
    let data = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40"><path d="M 0 5 L 40 5" stroke="black"/></svg>"#;
    assert!(matches!(
        svg_scene(data, &VectorOptions::default()),
        Err(ConvertError::MissingDimension)
    ));
}

#[test]
fn test_invalid_resolution() {
    let data = svg("0 0 10 10", "");
    let options = VectorOptions {
        curve_resolution: 0.0,
        ..Default::default()
    };
    assert!(matches!(
        svg_scene(&data, &options),
        Err(ConvertError::InvalidParameter { name: "curve_resolution", .. })
    ));
}

// ============================================================================
// Document units
// ============================================================================

fn no_fonts() -> VectorOptions {
    VectorOptions {
        system_fonts: false,
        ..Default::default()
    }
}

fn assert_close(a: Point, b: Point) {
    assert!(
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3,
        "{a:?} != {b:?}"
    );
}

#[test]
fn test_physical_size_keeps_view_box_units() {
    let data = r#"<svg xmlns="http://www.w3.org/2000/svg" width="100mm" height="50mm" viewBox="0 0 100 50">
    <path d="M 0 0 L 100 0" stroke="black"/></svg>"#;
    let scene = svg_scene(data, &no_fonts()).unwrap();

    assert_eq!(scene.frame_height(), 50.0);
    let points = scene.curves()[0].points();
    assert_close(points[0], Point::new(0.0, 0.0));
    assert_close(points[1], Point::new(100.0, 0.0));

    let conversion = convert_scene(scene, &ConvertOptions::default()).unwrap();
    let lines: Vec<&str> = conversion.gcode.lines().collect();
    assert_eq!(lines[3], "G0 X0.000 Y50.000");
    assert_eq!(lines[5], "G1 X100.000 Y50.000 F1000");
}

#[test]
fn test_scaled_viewport_without_target_size() {
    // Rendered at twice the view box size, with a shifted origin
    let data = r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100" viewBox="10 20 100 50">
    <path d="M 30 30 L 60 30" stroke="black"/></svg>"#;
    let scene = svg_scene(data, &no_fonts()).unwrap();
    assert_close(scene.curves()[0].points()[0], Point::new(30.0, 30.0));
    assert_close(scene.curves()[0].points()[1], Point::new(60.0, 30.0));

    let conversion = convert_scene(scene, &ConvertOptions::default()).unwrap();
    let lines: Vec<&str> = conversion.gcode.lines().collect();
    assert_eq!(lines[3], "G0 X0.000 Y20.000");
    assert_eq!(lines[5], "G1 X30.000 Y20.000 F1000");
}

#[test]
fn test_letterboxed_view_box() {
    // Square view box centered in a wide viewport
    let data = r#"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10" viewBox="0 0 10 10">
    <path d="M 0 0 L 10 10" stroke="black"/></svg>"#;
    let scene = svg_scene(data, &no_fonts()).unwrap();
    assert_eq!(scene.frame_height(), 10.0);
    assert_close(scene.curves()[0].points()[0], Point::new(0.0, 0.0));
    assert_close(scene.curves()[0].points()[1], Point::new(10.0, 10.0));
}

#[test]
fn test_text_without_fonts_is_skipped() {
    let data = svg(
        "0 0 100 50",
        r#"<text x="10" y="20" font-size="10">Hello</text>
    <path d="M 0 0 L 10 0" stroke="black"/>"#,
    );
    let scene = svg_scene(&data, &no_fonts()).unwrap();
    assert_eq!(scene.curves().len(), 1);
}

#[test]
fn test_malformed_svg_reports_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.svg");
    std::fs::write(&input, "<svg viewBox=\"0 0 10 10\"><path d=").unwrap();

    match SvgSource::new(&input, VectorOptions::default()).load() {
        Err(ConvertError::SourceLoad { path, .. }) => assert_eq!(path, input),
        other => panic!("expected SourceLoad, got {:?}", other.map(|s| s.curves().len())),
    }
}

#[test]
fn test_svg_file_to_gcode() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("line.svg");
    let output = dir.path().join("line.gcode");
    std::fs::write(
        &input,
        svg(
            "0 0 100 50",
            r#"<path d="M 20 10 L 70 10" stroke="black" fill="none"/>"#,
        ),
    )
    .unwrap();

    let options = ConvertOptions {
        longest_side: Some(100.0),
        ..Default::default()
    };
    convert(&SvgSource::new(&input, VectorOptions::default()), &options, &output).unwrap();

    // x: (20 - 20) * 2 and (70 - 20) * 2, y: (50 - 10) * 2
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "G21\nG90\nM5\nG0 X0.000 Y80.000\nM3 S1000\nG1 X100.000 Y80.000 F1000\nM5\nG0 X0.000 Y0.000\n"
    );
}
