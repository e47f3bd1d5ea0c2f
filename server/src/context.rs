use std::{collections::HashMap, sync::Arc};

use msgs::{BusId, ServerClientMsg};
use tokio::sync::{mpsc, RwLock};
use warp::filters::ws::Message;

use crate::{fleet::Fleet, geocode::Geocoder};

pub type FrontendSender = mpsc::UnboundedSender<Result<Message, warp::Error>>;

pub struct TrackerContext {
    pub to_frontend_senders: HashMap<String, FrontendSender>,
    pub fleet: Fleet,
    pub geocoder: Arc<Geocoder>,
    /// Last location update ticket handed out per bus.
    location_tickets: HashMap<BusId, u64>,
}

pub type TrackerContextRef = Arc<RwLock<TrackerContext>>;

impl TrackerContext {
    pub fn new(fleet: Fleet, geocoder: Geocoder) -> TrackerContext {
        TrackerContext {
            to_frontend_senders: HashMap::new(),
            fleet,
            geocoder: Arc::new(geocoder),
            location_tickets: HashMap::new(),
        }
    }

    pub fn into_ref(self) -> TrackerContextRef {
        Arc::new(RwLock::new(self))
    }

    /// Numbers location updates for `id` in arrival order.
    pub fn take_location_ticket(&mut self, id: BusId) -> u64 {
        let ticket = self.location_tickets.entry(id).or_insert(0);
        *ticket += 1;
        *ticket
    }

    /// False once a later update for `id` has arrived.
    pub fn is_latest_location_ticket(&self, id: BusId, ticket: u64) -> bool {
        self.location_tickets.get(&id) == Some(&ticket)
    }

    /// Pushes `msg` to every connected frontend.
    pub fn broadcast(&self, msg: &ServerClientMsg) {
        let json = match msg.encode() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("could not encode {}: {e}", msg.event_name());
                return;
            }
        };

        for (id, to_frontend_sender) in self.to_frontend_senders.iter() {
            if to_frontend_sender.send(Ok(Message::text(json.clone()))).is_err() {
                tracing::debug!("frontend {id} is gone, skipping {}", msg.event_name());
            }
        }
    }
}
