use std::fmt;

use msgs::{Location, MarkerId, Position};

/// Label text used when a bus number or route name is not known.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerLabel {
    pub bus_number: String,
    pub route_name: String,
    pub location: String,
}

impl MarkerLabel {
    pub fn new(bus_number: impl Into<String>, route_name: impl Into<String>, location: impl Into<String>) -> MarkerLabel {
        MarkerLabel {
            bus_number: bus_number.into(),
            route_name: route_name.into(),
            location: location.into(),
        }
    }

    /// Missing bus number or route name become [`UNKNOWN`].
    pub fn with_defaults(bus_number: Option<String>, route_name: Option<String>, location: String) -> MarkerLabel {
        MarkerLabel {
            bus_number: bus_number.unwrap_or_else(|| UNKNOWN.to_string()),
            route_name: route_name.unwrap_or_else(|| UNKNOWN.to_string()),
            location,
        }
    }

    pub fn to_popup_html(&self) -> String {
        format!(
            "<b>Bus Number:</b> {}<br>\n<b>Route Name:</b> {}<br>\n<b>Current Location:</b> {}",
            escape_html(&self.bus_number),
            escape_html(&self.route_name),
            escape_html(&self.location),
        )
    }
}

impl fmt::Display for MarkerLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bus Number: {}", self.bus_number)?;
        writeln!(f, "Route Name: {}", self.route_name)?;
        write!(f, "Current Location: {}", self.location)
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// A marker as the dashboard holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRecord {
    pub id: MarkerId,
    pub position: Position,
    pub label: MarkerLabel,
    /// Set once the bus details have been edited; they cannot change again.
    pub locked: bool,
}

impl MarkerRecord {
    pub fn new(id: impl Into<MarkerId>, position: Position, label: MarkerLabel) -> MarkerRecord {
        MarkerRecord {
            id: id.into(),
            position,
            label,
            locked: false,
        }
    }
}

impl From<&Location> for MarkerRecord {
    fn from(location: &Location) -> Self {
        MarkerRecord {
            id: location.marker_id(),
            position: location.position(),
            label: MarkerLabel::new(&location.bus_number, &location.route_name, &location.name),
            locked: location.is_locked,
        }
    }
}
