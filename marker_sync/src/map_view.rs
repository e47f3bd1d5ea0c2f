use msgs::{MarkerId, Position};

use crate::marker::MarkerLabel;

/// What the receiver asks of the map widget.
pub trait MapView {
    fn set_position(&mut self, id: &MarkerId, position: Position);

    /// Replaces the popup content of the marker.
    fn bind_popup(&mut self, id: &MarkerId, label: &MarkerLabel);

    /// Shows `message` to the user and returns once it has been shown.
    fn acknowledge(&mut self, message: &str);
}
