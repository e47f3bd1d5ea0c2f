use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{decode_error::DecodeError, frame, marker_id::MarkerId, position::Position};

pub const UPDATE_MARKER: &str = "update_marker";
pub const NAME_UPDATED: &str = "name_updated";

/// A bus moved. Bus number and route name may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateMarker {
    pub id: MarkerId,
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(default, deserialize_with = "lenient_label", skip_serializing_if = "Option::is_none")]
    pub new_bus_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_label", skip_serializing_if = "Option::is_none")]
    pub new_route_name: Option<String>,
}

impl UpdateMarker {
    pub fn position(&self) -> Position {
        Position::new(self.lat, self.lng)
    }
}

/// Bus details were edited and locked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameUpdated {
    pub id: MarkerId,
    #[serde(deserialize_with = "text_or_number")]
    pub new_bus_number: String,
    #[serde(deserialize_with = "text_or_number")]
    pub new_route_name: String,
    pub new_name: String,
    #[serde(default)]
    pub is_locked: bool,
}

fn lenient_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(frame::label_text(value))
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    frame::required_label_text(value).ok_or_else(|| de::Error::custom("expected a string or a number"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerClientMsg {
    UpdateMarker(UpdateMarker),
    NameUpdated(NameUpdated),
}

impl ServerClientMsg {
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerClientMsg::UpdateMarker(_) => UPDATE_MARKER,
            ServerClientMsg::NameUpdated(_) => NAME_UPDATED,
        }
    }

    /// Returns `Ok(None)` for events this side does not subscribe to.
    pub fn decode(input: &str) -> Result<Option<ServerClientMsg>, DecodeError> {
        let (event, data) = frame::split(input)?;
        let msg = match event.as_str() {
            UPDATE_MARKER => ServerClientMsg::UpdateMarker(frame::payload(UPDATE_MARKER, data)?),
            NAME_UPDATED => ServerClientMsg::NameUpdated(frame::payload(NAME_UPDATED, data)?),
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
    fn test_decode_update_marker_with_optional_fields_missing() {
        let input = r#"{"event":"update_marker","data":{"id":"bus-7","lat":1.0,"lng":2.0,"name":"Main St"}}"#;
        let msg = ServerClientMsg::decode(input).unwrap().unwrap();
        let ServerClientMsg::UpdateMarker(update) = msg else { panic!("wrong variant") };
        assert_eq!(update.id, MarkerId::from("bus-7"));
        assert_eq!(update.position(), Position::new(1.0, 2.0));
        assert_eq!(update.name, "Main St");
        assert_eq!(update.new_bus_number, None);
        assert_eq!(update.new_route_name, None);
    }

    #[test]
    fn test_decode_update_marker_from_server_shape() {
        let input = r#"{"event":"update_marker","data":{"id":3,"lat":17.6,"lng":78.4,"name":"ECIL","new_bus_number":"3","new_route_name":"Kushaiguda"}}"#;
        let Some(ServerClientMsg::UpdateMarker(update)) = ServerClientMsg::decode(input).unwrap() else {
            panic!("expected update_marker")
        };
        assert_eq!(update.id, MarkerId::from(3u32));
        assert_eq!(update.new_bus_number.as_deref(), Some("3"));
        assert_eq!(update.new_route_name.as_deref(), Some("Kushaiguda"));
    }

    #[test]
    fn test_update_marker_missing_required_field_is_malformed() {
        let input = r#"{"event":"update_marker","data":{"id":"bus-7","lat":1.0,"name":"Main St"}}"#;
        let err = ServerClientMsg::decode(input).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPayload { event: UPDATE_MARKER, .. }));
    }

    #[test]
    fn test_name_updated_requires_all_fields() {
        let input = r#"{"event":"name_updated","data":{"id":"bus-7","new_bus_number":"7","new_name":"Koti"}}"#;
        let err = ServerClientMsg::decode(input).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedPayload { event: NAME_UPDATED, .. }));
    }

    #[test]
    fn test_name_updated_accepts_numeric_details() {
        let input = r#"{"event":"name_updated","data":{"id":7,"new_bus_number":77,"new_route_name":"Koti","new_name":"Abids"}}"#;
        let Some(ServerClientMsg::NameUpdated(update)) = ServerClientMsg::decode(input).unwrap() else {
            panic!("expected name_updated")
        };
        assert_eq!(update.new_bus_number, "77");
        assert_eq!(update.new_route_name, "Koti");
        assert!(!update.is_locked);
    }

    #[test]
    fn test_name_updated_rejects_null_details() {
        let input = r#"{"event":"name_updated","data":{"id":7,"new_bus_number":null,"new_route_name":"Koti","new_name":"Abids"}}"#;
        assert!(matches!(
            ServerClientMsg::decode(input),
            Err(DecodeError::MalformedPayload { event: NAME_UPDATED, .. })
        ));
    }

    #[test]
    fn test_unknown_event_is_skipped() {
        let input = r#"{"event":"connect","data":{}}"#;
        assert_eq!(ServerClientMsg::decode(input).unwrap(), None);
    }

    #[test]
    fn test_encoded_frame_decodes_back() {
        let msg = ServerClientMsg::NameUpdated(NameUpdated {
            id: MarkerId::from(5u32),
            new_bus_number: "55".to_string(),
            new_route_name: "ECIL".to_string(),
            new_name: "Unknown Location".to_string(),
            is_locked: true,
        });
        let frame = msg.encode().unwrap();
        assert!(frame.starts_with(r#"{"event":"name_updated","data":"#));
        assert_eq!(ServerClientMsg::decode(&frame).unwrap(), Some(msg));
    }
}
