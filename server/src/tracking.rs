//! State changes requested by drivers and dispatchers.

use msgs::{
    client_server_msg::{EditName, LocationUpdate},
    BusId, Position, ServerClientMsg,
};
use thiserror::Error;
use warp::http::StatusCode;

use crate::{context::TrackerContextRef, fleet::Fleet};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpdateRejected {
    #[error("bus {0} not found")]
    NotFound(BusId),

    #[error("invalid coordinates ({lat}, {lng})")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("bus {0} is locked")]
    Locked(BusId),

    #[error("bus number {0} is already in use")]
    BusNumberTaken(String),

    #[error("a newer location update for bus {0} arrived first")]
    Superseded(BusId),
}

impl UpdateRejected {
    pub fn status(&self) -> StatusCode {
        match self {
            UpdateRejected::NotFound(_) => StatusCode::NOT_FOUND,
            UpdateRejected::InvalidCoordinates { .. } => StatusCode::BAD_REQUEST,
            UpdateRejected::Locked(_) | UpdateRejected::BusNumberTaken(_) | UpdateRejected::Superseded(_) => {
                StatusCode::CONFLICT
            }
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            UpdateRejected::NotFound(_) => "Bus not found",
            UpdateRejected::InvalidCoordinates { .. } => "Invalid coordinates",
            UpdateRejected::Locked(_) => "Bus details are locked",
            UpdateRejected::BusNumberTaken(_) => "Bus number already in use",
            UpdateRejected::Superseded(_) => "Superseded by a newer update",
        }
    }
}

/// Moves a bus and tells every frontend about it.
///
/// Updates for the same bus commit in arrival order. One that is overtaken
/// while its place name is looked up is dropped as [`UpdateRejected::Superseded`].
pub async fn apply_location_update(
    update: LocationUpdate,
    context_ref: &TrackerContextRef,
) -> Result<ServerClientMsg, UpdateRejected> {
    let LocationUpdate { id, lat, lng } = update;

    let (geocoder, ticket) = {
        let mut context = context_ref.write().await;
        if context.fleet.get(id).is_none() {
            return Err(UpdateRejected::NotFound(id));
        }
        if !Position::new(lat, lng).is_valid() {
            return Err(UpdateRejected::InvalidCoordinates { lat, lng });
        }
        (context.geocoder.clone(), context.take_location_ticket(id))
    };

    let name = geocoder.place_name(lat, lng).await;

    let mut context = context_ref.write().await;
    if !context.is_latest_location_ticket(id, ticket) {
        tracing::debug!(id, lat, lng, "location update overtaken by a newer one");
        return Err(UpdateRejected::Superseded(id));
    }
    let location = context.fleet.get_mut(id).ok_or(UpdateRejected::NotFound(id))?;
    location.lat = lat;
    location.lng = lng;
    location.name = name;
    let msg = ServerClientMsg::UpdateMarker(location.update_marker());

    context.broadcast(&msg);
    tracing::info!(id, lat, lng, "bus moved");
    Ok(msg)
}

/// Sets bus number and route name once; afterwards the bus is locked.
pub async fn apply_edit_name(edit: EditName, context_ref: &TrackerContextRef) -> Result<ServerClientMsg, UpdateRejected> {
    let (geocoder, lat, lng) = {
        let context = context_ref.read().await;
        let location = check_editable(&context.fleet, &edit)?;
        (context.geocoder.clone(), location.lat, location.lng)
    };

    let name = geocoder.place_name(lat, lng).await;

    let mut context = context_ref.write().await;
    // the bus may have been edited while the place name was looked up
    check_editable(&context.fleet, &edit)?;
    let location = context.fleet.get_mut(edit.id).ok_or(UpdateRejected::NotFound(edit.id))?;
    location.bus_number = edit.new_bus_number;
    location.route_name = edit.new_route_name;
    location.name = name;
    location.is_locked = true;
    let msg = ServerClientMsg::NameUpdated(location.name_updated());

    context.broadcast(&msg);
    tracing::info!(id = edit.id, "bus details edited and locked");
    Ok(msg)
}

fn check_editable<'a>(fleet: &'a Fleet, edit: &EditName) -> Result<&'a msgs::Location, UpdateRejected> {
    let location = fleet.get(edit.id).ok_or(UpdateRejected::NotFound(edit.id))?;
    if location.is_locked {
        return Err(UpdateRejected::Locked(edit.id));
    }
    if fleet.bus_number_taken(&edit.new_bus_number, edit.id) {
        return Err(UpdateRejected::BusNumberTaken(edit.new_bus_number.clone()));
    }
    Ok(location)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, convert::Infallible, time::Duration};

    use msgs::{MarkerId, UNKNOWN_LOCATION};
    use tokio::sync::mpsc;
    use warp::Filter;

    use super::*;
    use crate::{context::TrackerContext, geocode::Geocoder};

    fn context_ref() -> TrackerContextRef {
        TrackerContext::new(Fleet::seeded().unwrap(), Geocoder::Disabled).into_ref()
    }

    fn edit(id: BusId, bus_number: &str, route_name: &str) -> EditName {
        EditName {
            id,
            new_bus_number: bus_number.to_string(),
            new_route_name: route_name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_location_update_moves_bus_and_broadcasts() {
        let context_ref = context_ref();
        let (tx, mut rx) = mpsc::unbounded_channel();
        context_ref.write().await.to_frontend_senders.insert("dashboard".to_string(), tx);

        let msg = apply_location_update(LocationUpdate { id: 3, lat: 17.5, lng: 78.6 }, &context_ref).await.unwrap();

        let ServerClientMsg::UpdateMarker(update) = &msg else { panic!("expected update_marker") };
        assert_eq!(update.id, MarkerId::from(3u32));
        assert_eq!(update.name, UNKNOWN_LOCATION);
        assert_eq!(update.new_bus_number.as_deref(), Some("3"));
        assert_eq!(update.new_route_name.as_deref(), Some("Kushaiguda"));

        let location = context_ref.read().await.fleet.get(3).cloned().unwrap();
        assert_eq!((location.lat, location.lng), (17.5, 78.6));

        let pushed = rx.try_recv().unwrap().unwrap();
        assert_eq!(pushed.to_str().unwrap(), msg.encode().unwrap());
    }

    #[tokio::test]
    async fn test_location_update_rejections() {
        let context_ref = context_ref();

        let unknown = apply_location_update(LocationUpdate { id: 99, lat: 0.0, lng: 0.0 }, &context_ref).await;
        assert_eq!(unknown, Err(UpdateRejected::NotFound(99)));

        let invalid = apply_location_update(LocationUpdate { id: 1, lat: 91.0, lng: 0.0 }, &context_ref).await;
        assert_eq!(invalid, Err(UpdateRejected::InvalidCoordinates { lat: 91.0, lng: 0.0 }));

        let location = context_ref.read().await.fleet.get(1).cloned().unwrap();
        assert_eq!(location.name, "Initial Location");
    }

    #[tokio::test]
    async fn test_edit_name_locks_bus() {
        let context_ref = context_ref();

        let msg = apply_edit_name(edit(2, "202", "Nagaram Express"), &context_ref).await.unwrap();
        let ServerClientMsg::NameUpdated(update) = msg else { panic!("expected name_updated") };
        assert_eq!(update.new_bus_number, "202");
        assert_eq!(update.new_route_name, "Nagaram Express");
        assert_eq!(update.new_name, UNKNOWN_LOCATION);
        assert!(update.is_locked);

        let second = apply_edit_name(edit(2, "203", "Nagaram"), &context_ref).await;
        assert_eq!(second, Err(UpdateRejected::Locked(2)));
        assert_eq!(context_ref.read().await.fleet.get(2).unwrap().bus_number, "202");
    }

    #[tokio::test]
    async fn test_edit_name_rejects_taken_bus_number() {
        let context_ref = context_ref();
        let taken = apply_edit_name(edit(2, "3", "Nagaram"), &context_ref).await;
        assert_eq!(taken, Err(UpdateRejected::BusNumberTaken("3".to_string())));
        assert!(!context_ref.read().await.fleet.get(2).unwrap().is_locked);
    }

    #[tokio::test]
    async fn test_location_update_still_allowed_when_locked() {
        let context_ref = context_ref();
        apply_edit_name(edit(4, "4", "Charlapally"), &context_ref).await.unwrap();
        let moved = apply_location_update(LocationUpdate { id: 4, lat: 17.0, lng: 78.0 }, &context_ref).await;
        assert!(moved.is_ok());
    }

    /// Serves `/reverse`, answering for latitude 1 only after `delay`.
    fn slow_nominatim(delay: Duration) -> String {
        let reverse = warp::path("reverse").and(warp::query::<HashMap<String, String>>()).and_then(
            move |query: HashMap<String, String>| async move {
                let lat = query.get("lat").cloned().unwrap_or_default();
                if lat == "1" {
                    tokio::time::sleep(delay).await;
                }
                Ok::<_, Infallible>(warp::reply::json(&serde_json::json!({ "display_name": format!("place {lat}") })))
            },
        );
        let (addr, server) = warp::serve(reverse).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_slow_lookup_does_not_overwrite_newer_position() {
        let geocoder = Geocoder::nominatim(&slow_nominatim(Duration::from_millis(400))).unwrap();
        let context_ref = TrackerContext::new(Fleet::seeded().unwrap(), geocoder).into_ref();
        let (tx, mut rx) = mpsc::unbounded_channel();
        context_ref.write().await.to_frontend_senders.insert("dashboard".to_string(), tx);

        let older = tokio::spawn({
            let context_ref = context_ref.clone();
            async move { apply_location_update(LocationUpdate { id: 1, lat: 1.0, lng: 1.0 }, &context_ref).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let newer = apply_location_update(LocationUpdate { id: 1, lat: 2.0, lng: 2.0 }, &context_ref).await;

        assert!(newer.is_ok());
        assert_eq!(older.await.unwrap(), Err(UpdateRejected::Superseded(1)));

        let location = context_ref.read().await.fleet.get(1).cloned().unwrap();
        assert_eq!((location.lat, location.lng), (2.0, 2.0));
        assert_eq!(location.name, "place 2");

        let pushed = rx.try_recv().unwrap().unwrap();
        assert!(pushed.to_str().unwrap().contains("place 2"));
        assert!(rx.try_recv().is_err());
    }
}
