use serde::{Deserialize, Serialize};

use crate::{
    marker_id::MarkerId,
    position::Position,
    server_client_msg::{NameUpdated, UpdateMarker},
    UNKNOWN_LOCATION,
};

pub type BusId = u32;

/// One tracked bus as the server knows it and as dashboards receive it when
/// they initialize their map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: BusId,
    pub bus_number: String,
    pub route_name: String,
    #[serde(default = "unknown_location")]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub is_locked: bool,
}

fn unknown_location() -> String {
    UNKNOWN_LOCATION.to_string()
}

impl Location {
    pub fn marker_id(&self) -> MarkerId {
        MarkerId::from(self.id)
    }

    pub fn position(&self) -> Position {
        Position::new(self.lat, self.lng)
    }

    pub fn update_marker(&self) -> UpdateMarker {
        UpdateMarker {
            id: self.marker_id(),
            lat: self.lat,
            lng: self.lng,
            name: self.name.clone(),
            new_bus_number: Some(self.bus_number.clone()),
            new_route_name: Some(self.route_name.clone()),
        }
    }

    pub fn name_updated(&self) -> NameUpdated {
        NameUpdated {
            id: self.marker_id(),
            new_bus_number: self.bus_number.clone(),
            new_route_name: self.route_name.clone(),
            new_name: self.name.clone(),
            is_locked: self.is_locked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        Location {
            id: 9,
            bus_number: "9".to_string(),
            route_name: "Canaranagar".to_string(),
            name: "Initial Location".to_string(),
            lat: 17.6114937425493,
            lng: 78.49495051843427,
            is_locked: false,
        }
    }

    #[test]
    fn test_update_marker_carries_details() {
        let update = location().update_marker();
        assert_eq!(update.id, MarkerId::from("9"));
        assert_eq!(update.new_bus_number.as_deref(), Some("9"));
        assert_eq!(update.new_route_name.as_deref(), Some("Canaranagar"));
        assert_eq!(update.name, "Initial Location");
    }

    #[test]
    fn test_missing_name_defaults_to_unknown_location() {
        let json = r#"{"id":1,"bus_number":"1","route_name":"Rampally x Road","lat":17.6,"lng":78.4}"#;
        let location: Location = serde_json::from_str(json).unwrap();
        assert_eq!(location.name, UNKNOWN_LOCATION);
        assert!(!location.is_locked);
    }
}
