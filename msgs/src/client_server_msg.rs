use serde::{Deserialize, Serialize};

use crate::{decode_error::DecodeError, frame, location::BusId};

pub const LOCATION_UPDATE: &str = "location_update";
pub const EDIT_NAME: &str = "edit_name";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub id: BusId,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditName {
    pub id: BusId,
    pub new_bus_number: String,
    pub new_route_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientServerMsg {
    LocationUpdate(LocationUpdate),
    EditName(EditName),
}

impl ClientServerMsg {
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientServerMsg::LocationUpdate(_) => LOCATION_UPDATE,
            ClientServerMsg::EditName(_) => EDIT_NAME,
        }
    }

    /// Returns `Ok(None)` for events the server does not handle.
    pub fn decode(input: &str) -> Result<Option<ClientServerMsg>, DecodeError> {
        let (event, data) = frame::split(input)?;
        let msg = match event.as_str() {
            LOCATION_UPDATE => ClientServerMsg::LocationUpdate(frame::payload(LOCATION_UPDATE, data)?),
            EDIT_NAME => ClientServerMsg::EditName(frame::payload(EDIT_NAME, data)?),
            _ => return Ok(None),
        };
        Ok(Some(msg))
    }

    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_location_update() {
        let input = r#"{"event":"location_update","data":{"id":4,"lat":17.5,"lng":78.5}}"#;
        let msg = ClientServerMsg::decode(input).unwrap();
        assert_eq!(msg, Some(ClientServerMsg::LocationUpdate(LocationUpdate { id: 4, lat: 17.5, lng: 78.5 })));
    }

    #[test]
    fn test_decode_edit_name_missing_route_is_malformed() {
        let input = r#"{"event":"edit_name","data":{"id":4,"new_bus_number":"40"}}"#;
        assert!(matches!(
            ClientServerMsg::decode(input),
            Err(DecodeError::MalformedPayload { event: EDIT_NAME, .. })
        ));
    }

    #[test]
    fn test_encode_uses_event_envelope() {
        let msg = ClientServerMsg::EditName(EditName {
            id: 2,
            new_bus_number: "22".to_string(),
            new_route_name: "Nagaram".to_string(),
        });
        let frame = msg.encode().unwrap();
        assert_eq!(
            frame,
            r#"{"event":"edit_name","data":{"id":2,"new_bus_number":"22","new_route_name":"Nagaram"}}"#
        );
    }
}
