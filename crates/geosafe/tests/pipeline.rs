//! End-to-end checks through the flat `api` surface on lon/lat input.

use geo::{coord, polygon, Area, Geometry, GeometryCollection, LineString};
use geosafe::api::*;
use geosafe::GeoError;

fn lonlat_box(x: f64, y: f64, d: f64) -> Geometry<f64> {
    Geometry::Polygon(polygon![
        (x: x, y: y),
        (x: x + d, y: y),
        (x: x + d, y: y + d),
        (x: x, y: y + d),
    ])
}

#[test]
fn buffered_bowtie_survives_safe_union() {
    let bowtie = Geometry::Polygon(polygon![
        (x: 30.0, y: 60.0), (x: 30.001, y: 60.001), (x: 30.001, y: 60.0), (x: 30.0, y: 60.001),
    ]);
    assert!(diagnose(&bowtie).is_some());
    let grown = buffer(&bowtie, 5.0, &BufferStyle::default());
    assert!(is_valid(&grown));
    let joined = safe_union(&grown, &lonlat_box(30.0005, 60.0, 0.002));
    assert!(area(&joined) > area(&lonlat_box(30.0005, 60.0, 0.002)));
}

#[test]
fn collection_difference_keeps_the_untouched_feature() {
    let f1 = lonlat_box(30.500, 59.900, 0.01);
    let f2 = lonlat_box(30.520, 59.900, 0.01);
    let f3 = lonlat_box(30.515, 59.895, 0.02);
    let f4 = lonlat_box(30.600, 59.950, 0.01);
    let a = Geometry::GeometryCollection(GeometryCollection::new_from(vec![f1.clone(), f2]));
    let b = Geometry::GeometryCollection(GeometryCollection::new_from(vec![f3, f4]));
    let out = safe_difference(&a, &b);
    assert!((out.unsigned_area() - f1.unsigned_area()).abs() < 1e-12);
}

#[test]
fn metric_round_trip_near_the_anchor() {
    let g = lonlat_box(37.6, 55.7, 0.01);
    let frame = LocalProjection::for_geometry(&g).unwrap();
    let back = frame.inverse(&frame.forward(&g).unwrap()).unwrap();
    let (Geometry::Polygon(a), Geometry::Polygon(b)) = (&g, &back) else {
        panic!("polygon expected");
    };
    for (p, q) in a.exterior().0.iter().zip(&b.exterior().0) {
        assert!((p.x - q.x).abs() < 1e-6 && (p.y - q.y).abs() < 1e-6);
    }
}

#[test]
fn geodesic_line_and_lloyd_fill() {
    let line: LineString<f64> = make_geodesic_line(coord! {x: 30.0, y: 60.0}, 45.0, 100.0);
    assert!((length(&line) - 100.0).abs() < 0.1);
    let doubled = increase_line_length(&line, 1.0).unwrap();
    assert!((length(&doubled) - 200.0).abs() < 0.5);
    assert!(matches!(
        increase_line_length(&make_line(&[coord! {x: 0.0, y: 0.0}]), 1.0),
        Err(GeoError::Argument(_))
    ));

    let area_box = Geometry::Polygon(make_aabb(coord! {x: 30.0, y: 60.0}, 20.0, 20.0).unwrap());
    let mut rng = SeedToken::new(1, 1).to_rng();
    let pts = generate_lloyd_points_geographic(&area_box, 2.0, &mut rng).unwrap();
    assert_eq!(pts.len(), 100);
    let prepared = PreparedOperand::new(&area_box);
    assert!(pts.iter().all(|c| prepared.covers(&Geometry::Point(make_point(*c)))));
}
