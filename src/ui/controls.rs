use crate::core::{constants::SCALE_MAX_WIDTH, geo::Point, viewport::Viewport};

const FEET_PER_METER: f64 = 3.280_839_9;
const FEET_PER_MILE: f64 = 5280.0;

/// One bar of the scale control
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    pub label: String,
    /// Bar width in pixels
    pub width: f64,
}

/// Scale indicator with a metric and an imperial bar, like `L.control.scale()`
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleControl {
    pub max_width: f64,
    pub metric: bool,
    pub imperial: bool,
    metric_bar: Option<ScaleBar>,
    imperial_bar: Option<ScaleBar>,
}

impl Default for ScaleControl {
    fn default() -> Self {
        Self {
            max_width: SCALE_MAX_WIDTH,
            metric: true,
            imperial: true,
            metric_bar: None,
            imperial_bar: None,
        }
    }
}

impl ScaleControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes both bars from the ground distance covered by `max_width` pixels
    pub fn update(&mut self, viewport: &Viewport) {
        let y = viewport.size.y / 2.0;
        let left = viewport.pixel_to_lat_lng(&Point::new(0.0, y));
        let right = viewport.pixel_to_lat_lng(&Point::new(self.max_width, y));
        let max_meters = left.distance_to(&right);

        if !(max_meters.is_finite() && max_meters > 0.0) {
            self.metric_bar = None;
            self.imperial_bar = None;
            return;
        }

        self.metric_bar = self.metric.then(|| self.metric_bar_for(max_meters));
        self.imperial_bar = self.imperial.then(|| self.imperial_bar_for(max_meters));
    }

    fn metric_bar_for(&self, max_meters: f64) -> ScaleBar {
        let meters = round_number(max_meters);
        let label = if meters < 1000.0 {
            format!("{} m", meters)
        } else {
            format!("{} km", meters / 1000.0)
        };
        ScaleBar {
            label,
            width: (self.max_width * meters / max_meters).round(),
        }
    }

    fn imperial_bar_for(&self, max_meters: f64) -> ScaleBar {
        let max_feet = max_meters * FEET_PER_METER;

        if max_feet > FEET_PER_MILE {
            let max_miles = max_feet / FEET_PER_MILE;
            let miles = round_number(max_miles);
            ScaleBar {
                label: format!("{} mi", miles),
                width: (self.max_width * miles / max_miles).round(),
            }
        } else {
            let feet = round_number(max_feet);
            ScaleBar {
                label: format!("{} ft", feet),
                width: (self.max_width * feet / max_feet).round(),
            }
        }
    }

    pub fn metric_bar(&self) -> Option<&ScaleBar> {
        self.metric_bar.as_ref()
    }

    pub fn imperial_bar(&self) -> Option<&ScaleBar> {
        self.imperial_bar.as_ref()
    }

    /// Metric label followed by the imperial one, e.g. `"50 m / 200 ft"`
    pub fn label(&self) -> Option<String> {
        let labels: Vec<&str> = [self.metric_bar(), self.imperial_bar()]
            .into_iter()
            .flatten()
            .map(|bar| bar.label.as_str())
            .collect();

        (!labels.is_empty()).then(|| labels.join(" / "))
    }
}

/// Largest 1, 2, 3 or 5 times a power of ten not above `value`
pub fn round_number(value: f64) -> f64 {
    if value < 1.0 {
        return value;
    }

    let digits = value.floor().to_string().len() as i32;
    let pow10 = 10_f64.powi(digits - 1);
    let d = value / pow10;

    let d = if d >= 10.0 {
        10.0
    } else if d >= 5.0 {
        5.0
    } else if d >= 3.0 {
        3.0
    } else if d >= 2.0 {
        2.0
    } else {
        1.0
    };

    pow10 * d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;

    #[test]
    fn test_round_number() {
        assert_eq!(round_number(1.0), 1.0);
        assert_eq!(round_number(2.7), 2.0);
        assert_eq!(round_number(47.0), 30.0);
        assert_eq!(round_number(64.0), 50.0);
        assert_eq!(round_number(999.0), 500.0);
        assert_eq!(round_number(1234.0), 1000.0);
    }

    #[test]
    fn test_scale_at_city_zoom() {
        let viewport = Viewport::new(LatLng::new(47.38991, 8.51604), 16.0, Point::new(800.0, 600.0));
        let mut scale = ScaleControl::new();
        scale.update(&viewport);

        // ~1.6 m per pixel at this latitude, so 100px covers ~160 m
        let metric = scale.metric_bar().unwrap();
        assert_eq!(metric.label, "100 m");
        assert!(metric.width > 50.0 && metric.width <= 100.0);

        let imperial = scale.imperial_bar().unwrap();
        assert!(imperial.label.ends_with(" ft"));
        assert_eq!(scale.label().unwrap(), format!("100 m / {}", imperial.label));
    }

    #[test]
    fn test_scale_switches_units() {
        let viewport = Viewport::new(LatLng::new(0.0, 0.0), 5.0, Point::new(800.0, 600.0));
        let mut scale = ScaleControl::new();
        scale.update(&viewport);

        assert!(scale.metric_bar().unwrap().label.ends_with(" km"));
        assert!(scale.imperial_bar().unwrap().label.ends_with(" mi"));
    }
}
