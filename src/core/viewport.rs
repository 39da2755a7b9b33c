use crate::core::constants::{EARTH_RADIUS, MAX_LATITUDE, TILE_SIZE};
use crate::core::geo::{LatLng, LatLngBounds, Point};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// What part of the world the map shows: center, zoom and container size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
    /// Container size in pixels
    pub size: Point,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        let mut viewport = Self {
            center: LatLng::default(),
            zoom,
            size,
            min_zoom: 0.0,
            max_zoom: 18.0,
        };
        viewport.set_center(center);
        viewport.set_zoom(zoom);
        viewport
    }

    /// Moves the center, clamped to the projectable world
    pub fn set_center(&mut self, center: LatLng) {
        self.center = LatLng::new(
            center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            center.lng.clamp(-180.0, 180.0),
        );
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn set_size(&mut self, size: Point) {
        self.size = size;
    }

    pub fn set_zoom_limits(&mut self, min_zoom: f64, max_zoom: f64) {
        self.min_zoom = min_zoom;
        self.max_zoom = max_zoom;
        self.set_zoom(self.zoom);
    }

    /// Width of the whole world in pixels at `zoom`
    fn world_size(zoom: f64) -> f64 {
        TILE_SIZE as f64 * 2_f64.powf(zoom)
    }

    fn half_size(&self) -> Point {
        self.size * 0.5
    }

    /// World pixel position of `lat_lng` (EPSG:3857); `None` uses the current zoom
    pub fn project(&self, lat_lng: &LatLng, zoom: Option<f64>) -> Point {
        lat_lng.to_unit_mercator() * Self::world_size(zoom.unwrap_or(self.zoom))
    }

    pub fn unproject(&self, pixel: &Point, zoom: Option<f64>) -> LatLng {
        LatLng::from_unit_mercator(*pixel * (1.0 / Self::world_size(zoom.unwrap_or(self.zoom))))
    }

    /// Container pixel of a coordinate
    pub fn lat_lng_to_pixel(&self, lat_lng: &LatLng) -> Point {
        self.project(lat_lng, None) - self.project(&self.center, None) + self.half_size()
    }

    /// Coordinate under a container pixel
    pub fn pixel_to_lat_lng(&self, pixel: &Point) -> LatLng {
        let world = self.project(&self.center, None) + (*pixel - self.half_size());
        self.unproject(&world, None)
    }

    /// Visible area
    pub fn bounds(&self) -> LatLngBounds {
        let north_west = self.pixel_to_lat_lng(&Point::default());
        let south_east = self.pixel_to_lat_lng(&self.size);
        LatLngBounds::from_coords(south_east.lat, north_west.lng, north_west.lat, south_east.lng)
    }

    /// Largest integer zoom at which `bounds` fits inside the container minus `padding` per side
    pub fn bounds_zoom(&self, bounds: &LatLngBounds, padding: f64) -> f64 {
        let available = self.size - Point::new(2.0 * padding, 2.0 * padding);
        let fits = |zoom: f64| {
            let extent =
                self.project(&bounds.south_east(), Some(zoom)) - self.project(&bounds.north_west(), Some(zoom));
            extent.x.abs() <= available.x && extent.y.abs() <= available.y
        };

        let min = self.min_zoom.ceil() as i32;
        let max = self.max_zoom.floor() as i32;
        (min..=max)
            .map(f64::from)
            .take_while(|zoom| fits(*zoom))
            .last()
            .unwrap_or(self.min_zoom)
    }

    /// Meters per pixel at the equator
    pub fn resolution(&self) -> f64 {
        2.0 * PI * EARTH_RADIUS / Self::world_size(self.zoom)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(LatLng::default(), 0.0, Point::new(800.0, 600.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zurich() -> Viewport {
        Viewport::new(LatLng::new(47.38991, 8.51604), 14.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_center_pixel_is_center_of_container() {
        let viewport = zurich();
        let center = viewport.lat_lng_to_pixel(&viewport.center);
        assert!((center.x - 400.0).abs() < 1e-6 && (center.y - 300.0).abs() < 1e-6);

        let back = viewport.pixel_to_lat_lng(&Point::new(400.0, 300.0));
        assert!((back.lat - viewport.center.lat).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_round_trip_off_center() {
        let viewport = zurich();
        let target = LatLng::new(47.39, 8.52);

        let back = viewport.pixel_to_lat_lng(&viewport.lat_lng_to_pixel(&target));

        assert!((back.lat - target.lat).abs() < 1e-9);
        assert!((back.lng - target.lng).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_limits() {
        let mut viewport = Viewport::default();
        viewport.set_zoom_limits(2.0, 15.0);
        assert_eq!(viewport.zoom, 2.0);

        viewport.set_zoom(20.0);
        assert_eq!(viewport.zoom, 15.0);
    }

    #[test]
    fn test_bounds_zoom_fits() {
        let mut viewport = Viewport::new(LatLng::default(), 3.0, Point::new(800.0, 600.0));
        let bounds = LatLngBounds::from_coords(47.37, 8.50, 47.40, 8.55);

        let zoom = viewport.bounds_zoom(&bounds, 0.0);
        viewport.set_center(bounds.center());
        viewport.set_zoom(zoom);

        let visible = viewport.bounds();
        assert!(visible.contains(&bounds.south_west));
        assert!(visible.contains(&bounds.north_east));
        assert!(zoom > 10.0);

        // padding can only make the fit looser
        assert!(viewport.bounds_zoom(&bounds, 150.0) <= zoom);
    }

    #[test]
    fn test_resolution_halves_per_zoom() {
        let mut viewport = Viewport::default();
        let coarse = viewport.resolution();
        viewport.set_zoom(1.0);
        assert!((coarse / viewport.resolution() - 2.0).abs() < 1e-12);
    }
}
