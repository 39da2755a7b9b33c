//! Observable element state and the change set passed to each update cycle

use crate::core::constants::{DEFAULT_LATITUDE, DEFAULT_LONGITUDE, DEFAULT_MAX_ZOOM, DEFAULT_ZOOM};
use crate::core::geo::LatLng;
use crate::core::schema::AttributeValue;
use crate::prelude::HashSet;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// A labeled marker supplied by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerInformation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl MarkerInformation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            title: None,
            url: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Whether a popup should be bound for this marker
    pub fn has_popup(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
            || self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// Every observable property of the element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    Latitude,
    Longitude,
    Radius,
    Markers,
    SelectedMarker,
    UpdateCenterOnClick,
    DetectRetina,
    DefaultZoom,
    MaxZoom,
}

impl Property {
    pub const ALL: [Property; 9] = [
        Property::Latitude,
        Property::Longitude,
        Property::Radius,
        Property::Markers,
        Property::SelectedMarker,
        Property::UpdateCenterOnClick,
        Property::DetectRetina,
        Property::DefaultZoom,
        Property::MaxZoom,
    ];

    /// Property name as seen by the host
    pub fn name(&self) -> &'static str {
        match self {
            Property::Latitude => "latitude",
            Property::Longitude => "longitude",
            Property::Radius => "radius",
            Property::Markers => "markers",
            Property::SelectedMarker => "selectedMarker",
            Property::UpdateCenterOnClick => "updateCenterOnClick",
            Property::DetectRetina => "detectRetina",
            Property::DefaultZoom => "defaultZoom",
            Property::MaxZoom => "maxZoom",
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Current values of all observable properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapViewState {
    pub latitude: f64,
    pub longitude: f64,
    /// Radius circle in meters, 0 hides it
    pub radius: f64,
    pub markers: Vec<MarkerInformation>,
    pub selected_marker: Option<MarkerInformation>,
    pub update_center_on_click: bool,
    pub detect_retina: bool,
    pub default_zoom: i32,
    pub max_zoom: i32,
}

impl Default for MapViewState {
    fn default() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            radius: 0.0,
            markers: Vec::new(),
            selected_marker: None,
            update_center_on_click: false,
            detect_retina: true,
            default_zoom: DEFAULT_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl MapViewState {
    pub fn center(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Reads one property as a typed attribute value
    pub fn get(&self, property: Property) -> AttributeValue {
        match property {
            Property::Latitude => AttributeValue::Number(self.latitude),
            Property::Longitude => AttributeValue::Number(self.longitude),
            Property::Radius => AttributeValue::Number(self.radius),
            Property::Markers => AttributeValue::Markers(self.markers.clone()),
            Property::SelectedMarker => AttributeValue::Marker(self.selected_marker.clone()),
            Property::UpdateCenterOnClick => AttributeValue::Boolean(self.update_center_on_click),
            Property::DetectRetina => AttributeValue::Boolean(self.detect_retina),
            Property::DefaultZoom => AttributeValue::Integer(self.default_zoom as i64),
            Property::MaxZoom => AttributeValue::Integer(self.max_zoom as i64),
        }
    }

    /// Writes one property, returning whether its value changed
    pub fn set(&mut self, property: Property, value: AttributeValue) -> Result<bool> {
        let mismatch = || MapError::AttributeType {
            name: property.name(),
            expected: crate::core::schema::kind_of(property).name(),
        };

        let changed = match (property, value) {
            (Property::Latitude, AttributeValue::Number(v)) => replace_number(&mut self.latitude, v),
            (Property::Longitude, AttributeValue::Number(v)) => {
                replace_number(&mut self.longitude, v)
            }
            (Property::Radius, AttributeValue::Number(v)) => {
                if !v.is_finite() || v < 0.0 {
                    return Err(MapError::ParseError(format!(
                        "radius must be a finite, non-negative number of meters, got {}",
                        v
                    )));
                }
                replace_number(&mut self.radius, v)
            }
            (Property::Markers, AttributeValue::Markers(v)) => replace(&mut self.markers, v),
            (Property::SelectedMarker, AttributeValue::Marker(v)) => {
                replace(&mut self.selected_marker, v)
            }
            (Property::UpdateCenterOnClick, AttributeValue::Boolean(v)) => {
                replace(&mut self.update_center_on_click, v)
            }
            (Property::DetectRetina, AttributeValue::Boolean(v)) => {
                replace(&mut self.detect_retina, v)
            }
            (Property::DefaultZoom, AttributeValue::Integer(v)) => {
                replace(&mut self.default_zoom, to_i32(property, v)?)
            }
            (Property::MaxZoom, AttributeValue::Integer(v)) => {
                replace(&mut self.max_zoom, to_i32(property, v)?)
            }
            _ => return Err(mismatch()),
        };

        Ok(changed)
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

// NaN never equals itself, but assigning NaN over NaN is not a change
fn replace_number(slot: &mut f64, value: f64) -> bool {
    if *slot == value || (slot.is_nan() && value.is_nan()) {
        return false;
    }
    *slot = value;
    true
}

fn to_i32(property: Property, value: i64) -> Result<i32> {
    i32::try_from(value)
        .map_err(|_| MapError::ParseError(format!("{} out of range: {}", property, value)))
}

/// Set of properties that changed since the previous update cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyChanges {
    changed: HashSet<Property>,
}

impl PropertyChanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change set of a first update cycle, where everything is new
    pub fn all() -> Self {
        Property::ALL.iter().copied().collect()
    }

    /// Diffs two states property by property
    pub fn between(previous: &MapViewState, next: &MapViewState) -> Self {
        Property::ALL
            .iter()
            .copied()
            .filter(|property| {
                let mut probe = previous.clone();
                probe.set(*property, next.get(*property)).unwrap_or(true)
            })
            .collect()
    }

    pub fn insert(&mut self, property: Property) -> bool {
        self.changed.insert(property)
    }

    pub fn has(&self, property: Property) -> bool {
        self.changed.contains(&property)
    }

    pub fn has_any(&self, properties: &[Property]) -> bool {
        properties.iter().any(|p| self.has(*p))
    }

    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changed.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Property> + '_ {
        self.changed.iter().copied()
    }
}

impl FromIterator<Property> for PropertyChanges {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        Self {
            changed: iter.into_iter().collect(),
        }
    }
}
