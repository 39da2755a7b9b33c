pub mod controls;
pub mod popup;
pub mod style;

pub use controls::{ScaleBar, ScaleControl};
pub use popup::{marker_popup_html, Popup};
pub use style::ElementStyle;
