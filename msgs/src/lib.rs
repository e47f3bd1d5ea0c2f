pub mod client_server_msg;
pub mod decode_error;
pub mod discover_server;
pub mod frame;
pub mod location;
pub mod marker_id;
pub mod position;
pub mod server_client_msg;

pub use client_server_msg::ClientServerMsg;
pub use decode_error::DecodeError;
pub use location::{BusId, Location};
pub use marker_id::MarkerId;
pub use position::Position;
pub use server_client_msg::ServerClientMsg;

/// Location name used whenever reverse geocoding has nothing better.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// mDNS service type the tracker server announces itself under.
pub const SERVICE_TYPE: &str = "_bus-tracker._tcp.local.";
