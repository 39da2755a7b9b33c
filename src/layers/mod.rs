pub mod base;
pub mod circle;
pub mod macros;
pub mod manager;
pub mod marker;
pub mod tile;

pub use base::{LayerId, LayerProperties, LayerTrait, LayerType};
pub use manager::LayerManager;
