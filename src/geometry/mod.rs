//! Point-in-polygon tests against user-drawn GeoJSON areas.
//!
//! Coordinates are `x = longitude`, `y = latitude`. A MultiPolygon's rings are
//! treated as independent inclusion regions: a point inside any ring of any
//! polygon is inside the area, so interior rings do not cut holes.

use geojson::{PolygonType, Value};

use crate::error::GeometryError;

/// Read access to a point's X/Y, so the same tests work for GeoJSON positions,
/// tuples, `geo_types` coordinates and station locations.
pub trait Coordinate {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
}

impl Coordinate for [f64; 2] {
    fn x(&self) -> f64 {
        self[0]
    }

    fn y(&self) -> f64 {
        self[1]
    }
}

impl Coordinate for (f64, f64) {
    fn x(&self) -> f64 {
        self.0
    }

    fn y(&self) -> f64 {
        self.1
    }
}

/// GeoJSON positions. A position missing an axis reads as NaN, which never
/// compares inside anything.
impl Coordinate for [f64] {
    fn x(&self) -> f64 {
        self.first().copied().unwrap_or(f64::NAN)
    }

    fn y(&self) -> f64 {
        self.get(1).copied().unwrap_or(f64::NAN)
    }
}

impl Coordinate for Vec<f64> {
    fn x(&self) -> f64 {
        self.as_slice().x()
    }

    fn y(&self) -> f64 {
        self.as_slice().y()
    }
}

impl Coordinate for geo_types::Coord<f64> {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

impl Coordinate for geo_types::Point<f64> {
    fn x(&self) -> f64 {
        self.0.x
    }

    fn y(&self) -> f64 {
        self.0.y
    }
}

impl<T: Coordinate + ?Sized> Coordinate for &T {
    fn x(&self) -> f64 {
        (**self).x()
    }

    fn y(&self) -> f64 {
        (**self).y()
    }
}

/// Twice the signed area of the triangle `a, b, p`: positive when `p` is left
/// of the directed line `a -> b`, negative when right, zero when collinear.
fn is_left<A, B, P>(a: &A, b: &B, p: &P) -> f64
where
    A: Coordinate + ?Sized,
    B: Coordinate + ?Sized,
    P: Coordinate + ?Sized,
{
    (b.x() - a.x()) * (p.y() - a.y()) - (p.x() - a.x()) * (b.y() - a.y())
}

/// Winding-number containment test of `point` against a single ring.
///
/// The ring may be closed (first position repeated at the end) or open; an
/// open ring is closed implicitly. Rings with fewer than three vertices
/// contain nothing.
pub fn is_point_in_polygon<R, P>(ring: &[R], point: &P) -> bool
where
    R: Coordinate,
    P: Coordinate + ?Sized,
{
    let n = ring.len();
    let closed = n > 1 && ring[0].x() == ring[n - 1].x() && ring[0].y() == ring[n - 1].y();
    let vertex_count = if closed { n - 1 } else { n };
    if vertex_count < 3 {
        return false;
    }

    let py = point.y();
    let mut winding = 0i32;

    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];
        if a.y() <= py {
            // upward crossing
            if b.y() > py && is_left(a, b, point) > 0.0 {
                winding += 1;
            }
        } else if b.y() <= py && is_left(a, b, point) < 0.0 {
            // downward crossing
            winding -= 1;
        }
    }

    winding != 0
}

/// Name of a GeoJSON geometry variant, as it appears in the `type` member.
pub fn geometry_type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Fail unless `geometry` is a MultiPolygon.
pub fn check_multi_polygon(geometry: &geojson::Geometry) -> Result<(), GeometryError> {
    match &geometry.value {
        Value::MultiPolygon(_) => Ok(()),
        other => Err(GeometryError::InvalidGeometryType(geometry_type_name(other))),
    }
}

fn multi_polygon_parts(geometry: &geojson::Geometry) -> Result<&[PolygonType], GeometryError> {
    match &geometry.value {
        Value::MultiPolygon(polygons) => Ok(polygons),
        other => Err(GeometryError::InvalidGeometryType(geometry_type_name(other))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// `[[min_lon, max_lat], [max_lon, min_lat]]`: north-west then south-east.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [[self.min_lon, self.max_lat], [self.max_lon, self.min_lat]]
    }

    pub fn contains<P: Coordinate + ?Sized>(&self, point: &P) -> bool {
        let (x, y) = (point.x(), point.y());
        x >= self.min_lon && x <= self.max_lon && y >= self.min_lat && y <= self.max_lat
    }
}

/// Bounding box of every position of every ring of every polygon.
/// `None` when there are no positions.
pub fn bounding_box(polygons: &[PolygonType]) -> Option<BoundingBox> {
    polygons
        .iter()
        .flatten()
        .flatten()
        .fold(None, |bbox: Option<BoundingBox>, position| {
            let (x, y) = (position.x(), position.y());
            Some(match bbox {
                None => BoundingBox {
                    min_lon: x,
                    min_lat: y,
                    max_lon: x,
                    max_lat: y,
                },
                Some(b) => BoundingBox {
                    min_lon: b.min_lon.min(x),
                    min_lat: b.min_lat.min(y),
                    max_lon: b.max_lon.max(x),
                    max_lat: b.max_lat.max(y),
                },
            })
        })
}

/// Reusable containment test built once per area.
#[derive(Debug, Clone)]
pub struct AreaPredicate<'a> {
    region: Option<Region<'a>>,
}

#[derive(Debug, Clone)]
struct Region<'a> {
    bbox: Option<BoundingBox>,
    polygons: &'a [PolygonType],
}

impl AreaPredicate<'_> {
    /// True when the area is unrestricted or `point` lies in any of its rings.
    pub fn contains<P: Coordinate + ?Sized>(&self, point: &P) -> bool {
        let Some(region) = &self.region else {
            return true;
        };
        let Some(bbox) = &region.bbox else {
            return false;
        };
        if !bbox.contains(point) {
            return false;
        }
        region
            .polygons
            .iter()
            .flatten()
            .any(|ring| is_point_in_polygon(ring, point))
    }

    pub fn is_unrestricted(&self) -> bool {
        self.region.is_none()
    }
}

/// Build a containment predicate for `area`. `None` means no spatial
/// restriction and yields a predicate that accepts every point.
pub fn point_in_multi_polygon(
    area: Option<&geojson::Geometry>,
) -> Result<AreaPredicate<'_>, GeometryError> {
    let Some(geometry) = area else {
        return Ok(AreaPredicate { region: None });
    };
    check_multi_polygon(geometry)?;
    let polygons = multi_polygon_parts(geometry)?;
    Ok(AreaPredicate {
        region: Some(Region {
            bbox: bounding_box(polygons),
            polygons,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<[f64; 2]> {
        vec![[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0], [0.0, 0.0]]
    }

    fn multi_polygon(polygons: Vec<Vec<Vec<[f64; 2]>>>) -> geojson::Geometry {
        let value = polygons
            .into_iter()
            .map(|polygon| {
                polygon
                    .into_iter()
                    .map(|ring| ring.into_iter().map(|p| p.to_vec()).collect())
                    .collect()
            })
            .collect();
        geojson::Geometry::new(Value::MultiPolygon(value))
    }

    #[test]
    fn square_contains_center() {
        assert!(is_point_in_polygon(&square(), &[5.0, 5.0]));
        assert!(!is_point_in_polygon(&square(), &[15.0, 15.0]));
    }

    #[test]
    fn winding_is_orientation_independent() {
        let mut ring = square();
        ring.reverse();
        assert!(is_point_in_polygon(&ring, &(5.0, 5.0)));
        assert!(!is_point_in_polygon(&ring, &(-1.0, 5.0)));
    }

    #[test]
    fn open_rings_are_closed_implicitly() {
        let ring = vec![[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]];
        assert!(is_point_in_polygon(&ring, &[5.0, 5.0]));
    }

    #[test]
    fn concave_ring() {
        // U shape opening upwards
        let ring = vec![
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 10.0],
            [7.0, 10.0],
            [7.0, 3.0],
            [3.0, 3.0],
            [3.0, 10.0],
            [0.0, 10.0],
            [0.0, 0.0],
        ];
        assert!(is_point_in_polygon(&ring, &[1.0, 8.0]));
        assert!(is_point_in_polygon(&ring, &[5.0, 1.0]));
        assert!(!is_point_in_polygon(&ring, &[5.0, 8.0]));
    }

    #[test]
    fn point_level_with_horizontal_edge() {
        // ray from the point runs along the top edge of the lower step
        let ring = vec![
            [0.0, 0.0],
            [10.0, 0.0],
            [10.0, 5.0],
            [5.0, 5.0],
            [5.0, 10.0],
            [0.0, 10.0],
            [0.0, 0.0],
        ];
        assert!(is_point_in_polygon(&ring, &[2.0, 5.0]));
        assert!(!is_point_in_polygon(&ring, &[12.0, 5.0]));
    }

    #[test]
    fn degenerate_rings_contain_nothing() {
        let empty: Vec<[f64; 2]> = vec![];
        assert!(!is_point_in_polygon(&empty, &[0.0, 0.0]));
        let segment = vec![[0.0, 0.0], [10.0, 10.0], [0.0, 0.0]];
        assert!(!is_point_in_polygon(&segment, &[5.0, 5.0]));
        let pair = vec![[0.0, 0.0], [10.0, 10.0]];
        assert!(!is_point_in_polygon(&pair, &[5.0, 5.0]));
    }

    #[test]
    fn works_with_geo_types() {
        let ring: Vec<geo_types::Coord<f64>> = square()
            .into_iter()
            .map(|[x, y]| geo_types::coord! { x: x, y: y })
            .collect();
        assert!(is_point_in_polygon(&ring, &geo_types::Point::new(5.0, 5.0)));
    }

    #[test]
    fn check_rejects_other_geometry_types() {
        let polygon = geojson::Geometry::new(Value::Polygon(vec![vec![vec![0.0, 0.0]]]));
        assert_eq!(
            check_multi_polygon(&polygon),
            Err(GeometryError::InvalidGeometryType("Polygon"))
        );
        assert!(check_multi_polygon(&multi_polygon(vec![vec![square()]])).is_ok());
    }

    #[test]
    fn bounding_box_spans_all_polygons() {
        let area = multi_polygon(vec![
            vec![square()],
            vec![vec![[20.0, -5.0], [25.0, -5.0], [25.0, 2.0], [20.0, -5.0]]],
        ]);
        let Value::MultiPolygon(polygons) = &area.value else {
            unreachable!()
        };
        let bbox = bounding_box(polygons).unwrap();
        assert_eq!(bbox.corners(), [[0.0, 10.0], [25.0, -5.0]]);
        assert_eq!(bounding_box(&[]), None);
    }

    #[test]
    fn no_area_accepts_everything() {
        let predicate = point_in_multi_polygon(None).unwrap();
        assert!(predicate.is_unrestricted());
        assert!(predicate.contains(&[1000.0, -1000.0]));
    }

    #[test]
    fn multi_polygon_rings_are_independent_regions() {
        // an inner ring inside the square does not carve a hole
        let area = multi_polygon(vec![
            vec![
                square(),
                vec![[4.0, 4.0], [4.0, 6.0], [6.0, 6.0], [6.0, 4.0], [4.0, 4.0]],
            ],
            vec![vec![[20.0, 20.0], [20.0, 30.0], [30.0, 30.0], [30.0, 20.0], [20.0, 20.0]]],
        ]);
        let predicate = point_in_multi_polygon(Some(&area)).unwrap();
        assert!(predicate.contains(&[5.0, 5.0]));
        assert!(predicate.contains(&[25.0, 25.0]));
        // inside the bounding box but outside every ring
        assert!(!predicate.contains(&[15.0, 15.0]));
        assert!(!predicate.contains(&[50.0, 50.0]));
    }

    #[test]
    fn empty_multi_polygon_contains_nothing() {
        let area = multi_polygon(vec![]);
        let predicate = point_in_multi_polygon(Some(&area)).unwrap();
        assert!(!predicate.contains(&[0.0, 0.0]));
    }

    #[test]
    fn predicate_construction_validates_type() {
        let point = geojson::Geometry::new(Value::Point(vec![0.0, 0.0]));
        assert_eq!(
            point_in_multi_polygon(Some(&point)).unwrap_err(),
            GeometryError::InvalidGeometryType("Point")
        );
    }
}
