//! Declarative attribute schema
//!
//! Each observable property is described once, with its host-facing name, the
//! HTML attribute it can be set from (if any), its value kind and its default.
//! Host framework glue consumes [`ATTRIBUTES`] instead of hard-coding fields.

use crate::core::state::{MapViewState, MarkerInformation, Property};
use crate::{MapError, Result};
use once_cell::sync::Lazy;

/// Primitive type of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Number,
    Integer,
    Boolean,
    MarkerList,
    Marker,
}

impl AttributeKind {
    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::Number => "number",
            AttributeKind::Integer => "integer",
            AttributeKind::Boolean => "boolean",
            AttributeKind::MarkerList => "marker list",
            AttributeKind::Marker => "marker",
        }
    }
}

/// A typed attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Number(f64),
    Integer(i64),
    Boolean(bool),
    Markers(Vec<MarkerInformation>),
    Marker(Option<MarkerInformation>),
}

impl AttributeValue {
    pub fn kind(&self) -> AttributeKind {
        match self {
            AttributeValue::Number(_) => AttributeKind::Number,
            AttributeValue::Integer(_) => AttributeKind::Integer,
            AttributeValue::Boolean(_) => AttributeKind::Boolean,
            AttributeValue::Markers(_) => AttributeKind::MarkerList,
            AttributeValue::Marker(_) => AttributeKind::Marker,
        }
    }

    /// Converts HTML attribute text into a typed value.
    ///
    /// `None` means the attribute was removed. Booleans follow HTML semantics:
    /// present (with any text) is `true`, absent is `false`. Numeric text that
    /// does not parse becomes NaN, which the element treats as an unusable
    /// coordinate rather than an error.
    pub fn parse(kind: AttributeKind, raw: Option<&str>) -> Result<Self> {
        match kind {
            AttributeKind::Boolean => Ok(AttributeValue::Boolean(raw.is_some())),
            AttributeKind::Number => Ok(AttributeValue::Number(
                raw.and_then(|text| text.trim().parse::<f64>().ok())
                    .unwrap_or(f64::NAN),
            )),
            AttributeKind::Integer => {
                let text = raw.unwrap_or_default().trim();
                match text.parse::<f64>() {
                    Ok(value) if value.is_finite() => {
                        Ok(AttributeValue::Integer(value.trunc() as i64))
                    }
                    _ => Err(MapError::ParseError(format!("not an integer: {:?}", text))),
                }
            }
            AttributeKind::MarkerList => match raw {
                Some(text) => Ok(AttributeValue::Markers(serde_json::from_str(text)?)),
                None => Ok(AttributeValue::Markers(Vec::new())),
            },
            AttributeKind::Marker => match raw {
                Some(text) => Ok(AttributeValue::Marker(serde_json::from_str(text)?)),
                None => Ok(AttributeValue::Marker(None)),
            },
        }
    }
}

/// Schema entry of one observable property
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    pub property: Property,
    /// HTML attribute name, `None` for internal state that is only settable as a property
    pub attribute: Option<&'static str>,
    pub kind: AttributeKind,
    pub default: AttributeValue,
}

impl AttributeSpec {
    /// Converts attribute text for this entry; a removed integer attribute falls back to its default
    pub fn parse(&self, raw: Option<&str>) -> Result<AttributeValue> {
        match (self.kind, raw) {
            (AttributeKind::Integer, None) => Ok(self.default.clone()),
            (kind, raw) => AttributeValue::parse(kind, raw),
        }
    }
}

/// The element's observed attributes, defaults taken from [`MapViewState::default`]
pub static ATTRIBUTES: Lazy<Vec<AttributeSpec>> = Lazy::new(|| {
    let defaults = MapViewState::default();

    Property::ALL
        .iter()
        .map(|&property| AttributeSpec {
            property,
            attribute: attribute_name(property),
            kind: kind_of(property),
            default: defaults.get(property),
        })
        .collect()
});

/// Value kind of a property
pub fn kind_of(property: Property) -> AttributeKind {
    match property {
        Property::Latitude | Property::Longitude | Property::Radius => AttributeKind::Number,
        Property::DefaultZoom | Property::MaxZoom => AttributeKind::Integer,
        Property::UpdateCenterOnClick | Property::DetectRetina => AttributeKind::Boolean,
        Property::Markers => AttributeKind::MarkerList,
        Property::SelectedMarker => AttributeKind::Marker,
    }
}

// Attribute names are the lowercased property names; marker state is property-only.
fn attribute_name(property: Property) -> Option<&'static str> {
    match property {
        Property::Latitude => Some("latitude"),
        Property::Longitude => Some("longitude"),
        Property::Radius => Some("radius"),
        Property::UpdateCenterOnClick => Some("updatecenteronclick"),
        Property::DetectRetina => Some("detectretina"),
        Property::DefaultZoom => Some("defaultzoom"),
        Property::MaxZoom => Some("maxzoom"),
        Property::Markers | Property::SelectedMarker => None,
    }
}

/// Looks up a schema entry by property name or HTML attribute name
pub fn lookup(name: &str) -> Option<&'static AttributeSpec> {
    ATTRIBUTES.iter().find(|spec| {
        spec.property.name() == name || spec.attribute.is_some_and(|attr| attr == name)
    })
}

/// Names of all HTML attributes the element observes
pub fn observed_attributes() -> Vec<&'static str> {
    ATTRIBUTES.iter().filter_map(|spec| spec.attribute).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_covers_every_property() {
        assert_eq!(ATTRIBUTES.len(), Property::ALL.len());
        for spec in ATTRIBUTES.iter() {
            assert_eq!(spec.default.kind(), spec.kind, "{}", spec.property);
        }
    }

    #[test]
    fn test_schema_defaults() {
        let latitude = lookup("latitude").unwrap();
        assert_eq!(latitude.default, AttributeValue::Number(47.38991));

        let max_zoom = lookup("maxzoom").unwrap();
        assert_eq!(max_zoom.property, Property::MaxZoom);
        assert_eq!(max_zoom.default, AttributeValue::Integer(19));

        let markers = lookup("markers").unwrap();
        assert!(markers.attribute.is_none());
        assert_eq!(markers.default, AttributeValue::Markers(Vec::new()));
    }

    #[test]
    fn test_observed_attributes() {
        let observed = observed_attributes();
        assert!(observed.contains(&"updatecenteronclick"));
        assert!(!observed.contains(&"markers"));
        assert!(lookup("zoom").is_none());
    }

    #[test]
    fn test_parse_html_values() {
        assert_eq!(
            AttributeValue::parse(AttributeKind::Number, Some(" 47.5 ")).unwrap(),
            AttributeValue::Number(47.5)
        );
        assert_eq!(
            AttributeValue::parse(AttributeKind::Boolean, Some("")).unwrap(),
            AttributeValue::Boolean(true)
        );
        assert_eq!(
            AttributeValue::parse(AttributeKind::Boolean, None).unwrap(),
            AttributeValue::Boolean(false)
        );
        assert_eq!(
            AttributeValue::parse(AttributeKind::Integer, Some("12")).unwrap(),
            AttributeValue::Integer(12)
        );
        assert!(AttributeValue::parse(AttributeKind::Integer, Some("high")).is_err());
        assert!(AttributeValue::parse(AttributeKind::Integer, Some("NaN")).is_err());
        assert!(AttributeValue::parse(AttributeKind::Integer, Some("inf")).is_err());

        match AttributeValue::parse(AttributeKind::Number, Some("north")).unwrap() {
            AttributeValue::Number(v) => assert!(v.is_nan()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_removed_integer_attribute_restores_default() {
        let default_zoom = lookup("defaultzoom").unwrap();
        assert_eq!(default_zoom.parse(None).unwrap(), AttributeValue::Integer(16));
        assert_eq!(default_zoom.parse(Some("12")).unwrap(), AttributeValue::Integer(12));
        assert!(default_zoom.parse(Some("NaN")).is_err());

        let radius = lookup("radius").unwrap();
        match radius.parse(None).unwrap() {
            AttributeValue::Number(v) => assert!(v.is_nan()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_marker_json() {
        let value = AttributeValue::parse(
            AttributeKind::MarkerList,
            Some(r#"[{"latitude": 1.5, "longitude": 2.5, "url": "https://example.org"}]"#),
        )
        .unwrap();

        assert_eq!(
            value,
            AttributeValue::Markers(vec![
                MarkerInformation::new(1.5, 2.5).with_url("https://example.org")
            ])
        );
        assert!(AttributeValue::parse(AttributeKind::MarkerList, Some("[{")).is_err());
        assert_eq!(
            AttributeValue::parse(AttributeKind::Marker, Some("null")).unwrap(),
            AttributeValue::Marker(None)
        );
    }
}
