use super::*;
use geo::{coord, polygon, HasDimensions};
use proptest::prelude::*;

const SPB: Coord<f64> = Coord {
    x: 30.541_368_256_823_8,
    y: 59.882_656_035_274_86,
};

fn block() -> Geometry<f64> {
    Geometry::Polygon(polygon![
        (x: 30.530, y: 59.900),
        (x: 30.548, y: 59.900),
        (x: 30.548, y: 59.909),
        (x: 30.530, y: 59.909),
    ])
}

#[test]
fn circle_area_follows_segment_count() {
    let coarse = make_circle(SPB, 10.0, &BufferStyle::default());
    assert!((area(&coarse) - 306.0).abs() < 1.0, "area = {}", area(&coarse));
    let fine = BufferStyle {
        quadrant_segments: 8,
        ..BufferStyle::default()
    };
    let circle = make_circle(SPB, 10.0, &fine);
    assert!((area(&circle) - 312.0).abs() < 1.0, "area = {}", area(&circle));
}

#[test]
fn empty_inputs() {
    let e = geometry::empty();
    assert!(buffer(&e, 2.0, &BufferStyle::default()).is_empty());
    assert!(simplify_projected(&e, 2.0).is_empty());
    assert_eq!(area(&e), 0.0);
    assert_eq!(length(&LineString::new(vec![])), 0.0);
    assert!(nearest_points(&e, &block()).is_none());
    assert_eq!(distance(&e, &block()), 0.0);
}

#[test]
fn zero_buffer_of_valid_polygon_keeps_area() {
    let g = block();
    let out = buffer(&g, 0.0, &BufferStyle::default());
    let (a0, a1) = (area(&g), area(&out));
    assert!((a0 - a1).abs() / a0 < 1e-9, "{a0} vs {a1}");
}

#[test]
fn zero_buffer_keeps_holes() {
    let hole = LineString::from(vec![
        (30.536, 59.903),
        (30.536, 59.906),
        (30.542, 59.906),
        (30.542, 59.903),
        (30.536, 59.903),
    ]);
    let Geometry::Polygon(shell) = block() else {
        unreachable!()
    };
    let donut = Geometry::Polygon(Polygon::new(shell.exterior().clone(), vec![hole]));
    let out = buffer(&donut, 0.0, &BufferStyle::default());
    let (a0, a1) = (area(&donut), area(&out));
    assert!(a0 < area(&block()));
    assert!((a0 - a1).abs() / a0 < 1e-6, "{a0} vs {a1}");
    match out {
        Geometry::Polygon(p) => assert_eq!(p.interiors().len(), 1),
        other => panic!("expected a polygon, got {other:?}"),
    }
}

#[test]
fn positive_buffer_grows_by_perimeter_band() {
    let g = block();
    let out = buffer(&g, 10.0, &BufferStyle::default());
    let grown = area(&out) - area(&g);
    // Perimeter ~4 km times 10 m plus the corner disks.
    assert!(grown > 39_000.0 && grown < 41_000.0, "grown = {grown}");
}

#[test]
fn azimuth_due_south() {
    let c2 = coord! {x: 30.541_407_871_070_76, y: 59.876_334_438_827_97};
    assert!((azimuth(SPB, c2) - 180.0).abs() < 0.5);
    let east = azimuth(coord! {x: 0.0, y: 0.0}, coord! {x: 1.0, y: 0.0});
    assert!((east - 90.0).abs() < 1e-6);
    let west = azimuth(coord! {x: 0.0, y: 0.0}, coord! {x: -1.0, y: 0.0});
    assert!((west - 270.0).abs() < 1e-6);
}

#[test]
fn azimuth_of_line_arity() {
    assert_eq!(azimuth_of_line(&LineString::new(vec![])).unwrap(), 0.0);
    let three = LineString::new(vec![SPB, SPB, SPB]);
    assert!(matches!(azimuth_of_line(&three), Err(GeoError::Argument(_))));
}

#[test]
fn fix_azimuth_fixture() {
    let cases = [
        (-2.0, 358.0),
        (-362.0, 358.0),
        (0.0, 0.0),
        (360.0, 0.0),
        (2.0, 2.0),
        (362.0, 2.0),
    ];
    for (input, expected) in cases {
        assert!((normalize_azimuth(input) - expected).abs() < 1e-9, "{input}");
    }
    assert!(normalize_azimuth(-1e-20) < 360.0);
}

#[test]
fn destination_and_distance_agree() {
    let start = coord! {x: 20.10, y: -10.15};
    let end = destination_point(start, 25.5, 34.0);
    assert!((geodesic_distance(start, end) - 25.5).abs() < 1e-3);
    assert!((geodesic_distance(end, start) - 25.5).abs() < 1e-3);
    assert!(geodesic_distance(start, start).abs() < 1e-3);
    let line = make_line(start, 34.0, 25.5);
    assert!((length(&line) - 25.5).abs() < 0.01);
}

#[test]
fn circles_ten_meters_apart() {
    let start = coord! {x: 20.10, y: -10.15};
    let end = destination_point(start, 10.0, 90.0);
    let a = make_circle(start, 2.0, &BufferStyle::default());
    let b = make_circle(end, 2.0, &BufferStyle::default());
    assert!((distance(&a, &b) - 6.0).abs() < 0.1, "d = {}", distance(&a, &b));
    let around = buffer(&a, 1.0, &BufferStyle::default());
    assert!(distance(&a, &around).abs() < 0.1);
}

#[test]
fn nearest_points_of_two_points_are_the_points() {
    let p1 = coord! {x: 30.474_017_775_990_433, y: 59.886_084_611_487_12};
    let p2 = coord! {x: 30.491_236_123_144_063, y: 59.888_581_992_719_34};
    let g1 = Geometry::Point(geometry::make_point(p1));
    let g2 = Geometry::Point(geometry::make_point(p2));
    let (a, b) = nearest_points(&g1, &g2).unwrap();
    assert!((a.x - p1.x).abs() < 1e-6 && (a.y - p1.y).abs() < 1e-6);
    assert!((b.x - p2.x).abs() < 1e-6 && (b.y - p2.y).abs() < 1e-6);
    let on = nearest_point(p2, &g1).unwrap();
    assert!((on.x - p1.x).abs() < 1e-6 && (on.y - p1.y).abs() < 1e-6);
}

#[test]
fn increase_line_length_by_half() {
    let line = LineString::new(vec![
        coord! {x: 30.474_017_775_990_433, y: 59.886_084_611_487_12},
        coord! {x: 30.491_236_123_144_063, y: 59.888_581_992_719_34},
    ]);
    let longer = increase_line_length(&line, 0.5).unwrap();
    assert!((length(&longer) / length(&line) - 1.5).abs() < 0.01);
    let bad = LineString::new(vec![SPB]);
    assert!(matches!(increase_line_length(&bad, 0.5), Err(GeoError::Argument(_))));
}

#[test]
fn simplify_projected_drops_near_collinear_vertices() {
    let coords: Vec<Coord<f64>> = (0..50)
        .map(|k| coord! {x: 30.5 + k as f64 * 1e-4, y: 59.9 + if k % 2 == 0 { 0.0 } else { 1e-7 }})
        .collect();
    let g = Geometry::LineString(LineString::new(coords));
    match simplify_projected(&g, 5.0) {
        Geometry::LineString(ls) => assert!(ls.0.len() < 10, "kept {}", ls.0.len()),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn min_width_and_angle() {
    let w = min_width(&block());
    // 0.009° of latitude.
    assert!((w - 1003.0).abs() < 10.0, "w = {w}");
    let north = destination_point(SPB, 100.0, 0.0);
    let east = destination_point(SPB, 100.0, 90.0);
    let angle = angle_between(north, SPB, east);
    assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-3);
}

#[test]
fn aabb_is_measured_in_meters() {
    let b = make_aabb(coord! {x: 30.0, y: 60.0}, 10.0, 20.0).unwrap();
    let g = Geometry::Polygon(b);
    assert!((area(&g) - 200.0).abs() < 1e-6, "area = {}", area(&g));
    assert!(matches!(make_aabb(SPB, -1.0, 1.0), Err(GeoError::Argument(_))));
}

#[test]
fn length_of_sums_line_parts() {
    let line = make_line(SPB, 45.0, 100.0);
    let gc = Geometry::GeometryCollection(geo::GeometryCollection(vec![
        Geometry::LineString(line.clone()),
        Geometry::LineString(line),
        block(),
    ]));
    assert!((length_of(&gc) - 200.0).abs() < 0.1);
}

proptest! {
    #[test]
    fn normalized_azimuth_is_in_range_and_periodic(a in -1e6f64..1e6, k in -50i32..50) {
        let n = normalize_azimuth(a);
        prop_assert!((0.0..360.0).contains(&n));
        let shifted = normalize_azimuth(a + 360.0 * k as f64);
        let diff = (n - shifted).abs();
        prop_assert!(diff < 1e-6 || (360.0 - diff) < 1e-6, "{} vs {}", n, shifted);
    }
}
