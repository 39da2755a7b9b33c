pub mod config;
pub mod constants;
pub mod geo;
pub mod map;
pub mod schema;
pub mod state;
pub mod viewport;

pub use geo::{LatLng, LatLngBounds, Point, TileCoord};
pub use map::{Map, MapOptions};
pub use state::{MapViewState, MarkerInformation, Property, PropertyChanges};
