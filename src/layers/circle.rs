use crate::{
    core::{
        config::CircleOptions,
        geo::{LatLng, LatLngBounds},
    },
    layers::base::{LayerProperties, LayerTrait, LayerType},
};

/// A circle with a radius in meters
#[derive(Debug)]
pub struct Circle {
    properties: LayerProperties,
    center: LatLng,
    radius: f64,
    options: CircleOptions,
}

impl Circle {
    pub fn new(id: String, center: LatLng, radius: f64, options: CircleOptions) -> Self {
        Self {
            properties: LayerProperties::new(id, LayerType::Circle),
            center,
            radius: radius.max(0.0),
            options,
        }
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn style(&self) -> &CircleOptions {
        &self.options
    }

    /// Square around the circle, measured along the meridian and the parallel
    pub fn lat_lng_bounds(&self) -> LatLngBounds {
        let north = self.center.destination(0.0, self.radius);
        let east = self.center.destination(90.0, self.radius);
        let lat_delta = (north.lat - self.center.lat).abs();
        let lng_delta = (east.lng - self.center.lng).abs();

        LatLngBounds::from_coords(
            self.center.lat - lat_delta,
            self.center.lng - lng_delta,
            self.center.lat + lat_delta,
            self.center.lng + lng_delta,
        )
    }
}

impl LayerTrait for Circle {
    crate::impl_layer_trait!(Circle, properties);

    fn options(&self) -> serde_json::Value {
        serde_json::json!({
            "center": { "lat": self.center.lat, "lng": self.center.lng },
            "radius": self.radius,
            "weight": self.options.weight,
            "opacity": self.options.opacity,
            "fillOpacity": self.options.fill_opacity,
        })
    }

    fn bounds(&self) -> Option<LatLngBounds> {
        Some(self.lat_lng_bounds())
    }

    fn position(&self) -> Option<LatLng> {
        Some(self.center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_span_the_radius() {
        let center = LatLng::new(47.38991, 8.51604);
        let circle = Circle::new("c".into(), center, 1000.0, CircleOptions::default());
        let bounds = circle.lat_lng_bounds();

        assert!(bounds.contains(&center));
        let north = LatLng::new(bounds.north_east.lat, center.lng);
        let distance = center.distance_to(&north);
        assert!((distance - 1000.0).abs() < 1.0, "distance {}", distance);
        assert!(bounds.span().lng > bounds.span().lat);
    }

    #[test]
    fn test_circle_options_json() {
        let circle = Circle::new("c".into(), LatLng::new(0.0, 0.0), 50.0, CircleOptions::default());
        let options = circle.options();
        assert_eq!(options["radius"], 50.0);
        assert_eq!(options["weight"], 2.0);
        assert_eq!(options["fillOpacity"], 0.1);
    }
}
