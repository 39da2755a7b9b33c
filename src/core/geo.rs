use crate::core::constants::MAX_LATITUDE;
use geo::{BoundingRect, HaversineDestination, HaversineDistance, Intersects};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

/// A geographic coordinate in degrees
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance in meters
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        geo_types::Point::from(*self).haversine_distance(&geo_types::Point::from(*other))
    }

    /// Coordinate reached by travelling `distance` meters along `bearing` degrees
    pub fn destination(&self, bearing: f64, distance: f64) -> LatLng {
        geo_types::Point::from(*self)
            .haversine_destination(bearing, distance)
            .into()
    }

    /// Spherical Mercator position in the unit square, origin at the north-west corner
    pub fn to_unit_mercator(&self) -> Point {
        let sin = self.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians().sin();
        Point::new(
            (self.lng + 180.0) / 360.0,
            0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI),
        )
    }

    /// Inverse of [`LatLng::to_unit_mercator`]
    pub fn from_unit_mercator(unit: Point) -> Self {
        let lat = (PI * (1.0 - 2.0 * unit.y)).sinh().atan().to_degrees();
        Self::new(lat, unit.x * 360.0 - 180.0)
    }
}

impl From<LatLng> for geo_types::Point<f64> {
    fn from(lat_lng: LatLng) -> Self {
        geo_types::Point::new(lat_lng.lng, lat_lng.lat)
    }
}

impl From<geo_types::Point<f64>> for LatLng {
    fn from(point: geo_types::Point<f64>) -> Self {
        LatLng::new(point.y(), point.x())
    }
}

/// Screen or world pixel position
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }
}

/// Axis-aligned geographic rectangle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self::new(LatLng::new(south, west), LatLng::new(north, east))
    }

    /// Smallest bounds containing every point, `None` for an empty set
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLng>,
    {
        let multi: geo_types::MultiPoint<f64> = points
            .into_iter()
            .map(geo_types::Point::from)
            .collect::<Vec<_>>()
            .into();

        multi.bounding_rect().map(Self::from)
    }

    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.north_east.lat, self.south_west.lng)
    }

    pub fn south_east(&self) -> LatLng {
        LatLng::new(self.south_west.lat, self.north_east.lng)
    }

    pub fn contains(&self, point: &LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }

    pub fn intersects(&self, other: &LatLngBounds) -> bool {
        geo_types::Rect::from(self).intersects(&geo_types::Rect::from(other))
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// Height and width in degrees
    pub fn span(&self) -> LatLng {
        LatLng::new(
            self.north_east.lat - self.south_west.lat,
            self.north_east.lng - self.south_west.lng,
        )
    }
}

impl From<&LatLngBounds> for geo_types::Rect<f64> {
    fn from(bounds: &LatLngBounds) -> Self {
        geo_types::Rect::new(
            geo_types::Point::from(bounds.south_west),
            geo_types::Point::from(bounds.north_east),
        )
    }
}

impl From<geo_types::Rect<f64>> for LatLngBounds {
    fn from(rect: geo_types::Rect<f64>) -> Self {
        Self::new(
            geo_types::Point::from(rect.min()).into(),
            geo_types::Point::from(rect.max()).into(),
        )
    }
}

/// Slippy map tile address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, z: u8) -> Self {
        Self { x, y, z }
    }

    /// Number of tiles along one axis at zoom `z`
    fn tiles_per_axis(z: u8) -> u32 {
        1u32 << z.min(31)
    }

    /// Tile containing `lat_lng` at `zoom`, clamped to the tile grid
    pub fn containing(lat_lng: &LatLng, zoom: u8) -> Self {
        let n = Self::tiles_per_axis(zoom);
        let unit = lat_lng.to_unit_mercator();
        let index = |v: f64| ((v * n as f64).floor().max(0.0) as u32).min(n - 1);

        Self::new(index(unit.x), index(unit.y), zoom)
    }

    pub fn north_west(&self) -> LatLng {
        let n = Self::tiles_per_axis(self.z) as f64;
        LatLng::from_unit_mercator(Point::new(self.x as f64 / n, self.y as f64 / n))
    }

    pub fn bounds(&self) -> LatLngBounds {
        let nw = self.north_west();
        let se = TileCoord::new(self.x + 1, self.y + 1, self.z).north_west();
        LatLngBounds::from_coords(se.lat, nw.lng, nw.lat, se.lng)
    }

    pub fn is_valid(&self) -> bool {
        let n = Self::tiles_per_axis(self.z);
        self.x < n && self.y < n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let zurich = LatLng::new(47.3769, 8.5417);
        let geneva = LatLng::new(46.2044, 6.1432);

        // roughly 224 km as the crow flies
        assert!((zurich.distance_to(&geneva) - 224_000.0).abs() < 3_000.0);
    }

    #[test]
    fn test_destination_north() {
        let origin = LatLng::new(47.0, 8.0);
        let north = origin.destination(0.0, 1000.0);

        assert!(north.lat > origin.lat);
        assert!((north.lng - origin.lng).abs() < 1e-9);
        assert!((origin.distance_to(&north) - 1000.0).abs() < 1.0);
    }

    #[test]
    fn test_unit_mercator() {
        let origin = LatLng::new(0.0, 0.0).to_unit_mercator();
        assert!((origin.x - 0.5).abs() < 1e-12 && (origin.y - 0.5).abs() < 1e-12);

        let zurich = LatLng::new(47.38991, 8.51604);
        let back = LatLng::from_unit_mercator(zurich.to_unit_mercator());
        assert!((back.lat - zurich.lat).abs() < 1e-9);
        assert!((back.lng - zurich.lng).abs() < 1e-9);
    }

    #[test]
    fn test_tile_containing() {
        let zurich = LatLng::new(47.38991, 8.51604);
        let tile = TileCoord::containing(&zurich, 16);

        assert_eq!((tile.x, tile.y), (34318, 22946));
        assert!(tile.bounds().contains(&zurich));
        assert!(TileCoord::containing(&LatLng::new(-89.0, 180.0), 2).is_valid());
    }

    #[test]
    fn test_bounds() {
        let bounds = LatLngBounds::from_points(vec![
            LatLng::new(47.1, 8.2),
            LatLng::new(47.5, 8.0),
            LatLng::new(47.3, 8.9),
        ])
        .unwrap();

        assert_eq!(bounds.south_west, LatLng::new(47.1, 8.0));
        assert_eq!(bounds.north_east, LatLng::new(47.5, 8.9));
        assert!(bounds.contains(&LatLng::new(47.2, 8.5)));
        assert!(!bounds.contains(&LatLng::new(47.6, 8.5)));
        assert!(bounds.intersects(&LatLngBounds::from_coords(47.4, 8.8, 48.0, 9.5)));
        assert!(!bounds.intersects(&LatLngBounds::from_coords(48.0, 8.0, 49.0, 9.0)));
        assert!(LatLngBounds::from_points(Vec::new()).is_none());
    }
}
