use crate::core::state::MarkerInformation;

/// Popup content bound to a layer
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    content: String,
    open: bool,
}

impl Popup {
    pub fn new(content: String) -> Self {
        Self {
            content,
            open: false,
        }
    }

    /// Popup for a labeled marker, `None` when it has neither title nor URL
    pub fn for_marker(marker: &MarkerInformation) -> Option<Self> {
        marker
            .has_popup()
            .then(|| Self::new(marker_popup_html(marker)))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }
}

/// HTML of a marker popup.
///
/// Title and URL are inserted as given; callers are expected to pass trusted
/// values. The `part` attributes let hosts style the popup from outside the
/// shadow root.
pub fn marker_popup_html(marker: &MarkerInformation) -> String {
    let mut html = String::from(r#"<div part="popup" class="popup">"#);

    if let Some(title) = marker.title.as_deref().filter(|t| !t.is_empty()) {
        html.push_str(&format!(
            r#"<span part="popup-title" class="popup-title">{}</span>"#,
            title
        ));
    }
    if let Some(url) = marker.url.as_deref().filter(|u| !u.is_empty()) {
        html.push_str(&format!(
            r#"<a part="popup-url" class="popup-url" href="{}">{}</a>"#,
            url, url
        ));
    }

    html.push_str("</div>");
    html
}
