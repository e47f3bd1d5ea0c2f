use std::io::Write;

use marker_sync::{MapView, MarkerId, MarkerLabel, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupFormat {
    #[default]
    Text,
    /// The markup a map widget would bind to the marker.
    Html,
}

/// Renders marker changes as text, for terminals and logs.
pub struct ConsoleMapView<W> {
    out: W,
    format: PopupFormat,
}

impl<W: Write> ConsoleMapView<W> {
    pub fn new(out: W, format: PopupFormat) -> Self {
        ConsoleMapView { out, format }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: std::fmt::Arguments) {
        if let Err(e) = self.out.write_fmt(text).and_then(|_| self.out.flush()) {
            tracing::warn!("could not write to console: {e}");
        }
    }
}

impl<W: Write> MapView for ConsoleMapView<W> {
    fn set_position(&mut self, id: &MarkerId, position: Position) {
        tracing::info!(%id, lat = position.lat, lng = position.lng, "marker moved");
    }

    fn bind_popup(&mut self, id: &MarkerId, label: &MarkerLabel) {
        match self.format {
            PopupFormat::Text => self.write(format_args!("[marker {id}]\n{label}\n")),
            PopupFormat::Html => self.write(format_args!("[marker {id}]\n{}\n", label.to_popup_html())),
        }
    }

    fn acknowledge(&mut self, message: &str) {
        self.write(format_args!("{message}\n"));
    }
}
