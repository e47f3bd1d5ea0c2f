use msgs::server_client_msg::{NameUpdated, ServerClientMsg, UpdateMarker};
use tracing::{debug, warn};

use crate::{map_view::MapView, marker::MarkerLabel, marker_store::MarkerStore};

/// Shown to the user after a `name_updated` event was applied.
pub const LOCKED_ACKNOWLEDGMENT: &str = "Bus details updated and locked.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The marker existed and was updated.
    Updated,
    /// No marker with the event's id; nothing changed.
    UnknownMarker,
    /// The frame carried an event this receiver does not subscribe to.
    Skipped,
    /// The frame could not be decoded and was dropped.
    Malformed,
}

/// Applies pushed events to a [`MarkerStore`] and mirrors the changes on a
/// [`MapView`].
///
/// Events are handled one at a time and each one independently, so replaying
/// an event leaves the store as it was after the first delivery.
pub struct EventReceiver<V> {
    view: V,
}

impl<V: MapView> EventReceiver<V> {
    pub fn new(view: V) -> Self {
        EventReceiver { view }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Decodes a text frame and applies it. Malformed frames are logged and
    /// dropped.
    pub fn handle_frame(&mut self, store: &mut MarkerStore, frame: &str) -> Handled {
        match ServerClientMsg::decode(frame) {
            Ok(Some(msg)) => self.handle(store, msg),
            Ok(None) => {
                debug!("skipping frame for an unsubscribed event");
                Handled::Skipped
            }
            Err(e) => {
                warn!("dropping malformed event: {e}");
                Handled::Malformed
            }
        }
    }

    pub fn handle(&mut self, store: &mut MarkerStore, msg: ServerClientMsg) -> Handled {
        match msg {
            ServerClientMsg::UpdateMarker(update) => self.update_marker(store, update),
            ServerClientMsg::NameUpdated(update) => self.name_updated(store, update),
        }
    }

    fn update_marker(&mut self, store: &mut MarkerStore, update: UpdateMarker) -> Handled {
        let Some(marker) = store.get_mut(&update.id) else {
            debug!(id = %update.id, "update_marker for unknown marker");
            return Handled::UnknownMarker;
        };

        marker.position = update.position();
        marker.label = MarkerLabel::with_defaults(update.new_bus_number, update.new_route_name, update.name);

        self.view.set_position(&marker.id, marker.position);
        self.view.bind_popup(&marker.id, &marker.label);
        debug!(id = %marker.id, lat = marker.position.lat, lng = marker.position.lng, "marker moved");
        Handled::Updated
    }

    fn name_updated(&mut self, store: &mut MarkerStore, update: NameUpdated) -> Handled {
        let Some(marker) = store.get_mut(&update.id) else {
            debug!(id = %update.id, "name_updated for unknown marker");
            return Handled::UnknownMarker;
        };

        marker.label = MarkerLabel::new(update.new_bus_number, update.new_route_name, update.new_name);
        marker.locked = true;

        self.view.bind_popup(&marker.id, &marker.label);
        self.view.acknowledge(LOCKED_ACKNOWLEDGMENT);
        debug!(id = %marker.id, "marker details locked");
        Handled::Updated
    }
}
