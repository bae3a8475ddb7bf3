//! Gate and route records and their storage shape.
//!
//! Gates are stored as `{name, x, y}` and routes as
//! `{gate, dest, line: [{x, y}, ...]}`. Older data wrote coordinates as
//! fixed-precision strings, so reads accept either numbers or numeric
//! strings; writes always emit numbers.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::Point;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "GateRecord", into = "GateRecord")]
pub struct Gate {
    pub name: String,
    pub position: Point,
}

impl Gate {
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }

    /// Marker label: the first character of the name.
    pub fn initial(&self) -> String {
        self.name.chars().next().map(String::from).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "gate")]
    pub gate_name: String,
    #[serde(rename = "dest")]
    pub destination: String,
    pub line: Vec<Point>,
}

impl Route {
    pub fn new(gate_name: impl Into<String>, destination: impl Into<String>, line: Vec<Point>) -> Self {
        Self {
            gate_name: gate_name.into(),
            destination: destination.into(),
            line,
        }
    }

    pub fn is_for(&self, gate_name: &str, destination: &str) -> bool {
        self.gate_name == gate_name && self.destination == destination
    }
}

/// Everything a viewer needs to draw the site, keyed the same way as the
/// persisted records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSnapshot {
    #[serde(default)]
    pub site_image: Option<String>,
    #[serde(default)]
    pub site_gates: Vec<Gate>,
    #[serde(default)]
    pub site_routes: Vec<Route>,
}

impl SiteSnapshot {
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|source| Error::Decode {
            key: "snapshot",
            source,
        })
    }

    /// Routes leaving `gate_name`, in insertion order.
    pub fn routes_for_gate(&self, gate_name: &str) -> Vec<&Route> {
        self.site_routes
            .iter()
            .filter(|route| route.gate_name == gate_name)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PointRecord {
    x: Coordinate,
    y: Coordinate,
}

impl From<PointRecord> for Point {
    fn from(record: PointRecord) -> Self {
        Point::new(record.x.as_f64(), record.y.as_f64())
    }
}

impl From<Point> for PointRecord {
    fn from(point: Point) -> Self {
        Self {
            x: Coordinate::Number(point.x()),
            y: Coordinate::Number(point.y()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GateRecord {
    name: String,
    x: Coordinate,
    y: Coordinate,
}

impl From<GateRecord> for Gate {
    fn from(record: GateRecord) -> Self {
        Gate {
            name: record.name,
            position: Point::new(record.x.as_f64(), record.y.as_f64()),
        }
    }
}

impl From<Gate> for GateRecord {
    fn from(gate: Gate) -> Self {
        Self {
            name: gate.name,
            x: Coordinate::Number(gate.position.x()),
            y: Coordinate::Number(gate.position.y()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum Coordinate {
    Number(f64),
    String(String),
}

impl Coordinate {
    /// Unparseable strings become NaN, which `Point::new` maps to 0.
    fn as_f64(&self) -> f64 {
        match self {
            Coordinate::Number(val) => *val,
            Coordinate::String(val) => val.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_legacy_string_coordinates() {
        let raw = r#"[{"name":"Gate 9","x":"0.2500","y":"0.7500"}]"#;
        let gates: Vec<Gate> = serde_json::from_str(raw).unwrap();
        assert_eq!(gates[0].name, "Gate 9");
        assert_eq!(gates[0].position, Point::new(0.25, 0.75));
    }

    #[test]
    fn writes_route_in_storage_shape() {
        let route = Route::new("G1", "Dock", vec![Point::new(0.5, 0.5), Point::new(1.0, 1.0)]);
        let value = serde_json::to_value(&route).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "gate": "G1",
                "dest": "Dock",
                "line": [{"x": 0.5, "y": 0.5}, {"x": 1.0, "y": 1.0}]
            })
        );
    }

    #[test]
    fn out_of_range_stored_points_are_clamped() {
        let raw = r#"{"x": 1.7, "y": "-0.2"}"#;
        let point: Point = serde_json::from_str(raw).unwrap();
        assert_eq!(point, Point::new(1.0, 0.0));
    }

    #[test]
    fn snapshot_uses_storage_key_names() {
        let raw = r#"{
            "siteImage": "data:image/png;base64,AAAA",
            "siteGates": [{"name": "North", "x": 0.1, "y": 0.2}],
            "siteRoutes": [{"gate": "North", "dest": "Silo", "line": [{"x": 0, "y": 0}, {"x": 1, "y": 1}]}]
        }"#;
        let snapshot = SiteSnapshot::from_json(raw).unwrap();
        assert_eq!(snapshot.site_gates.len(), 1);
        assert_eq!(snapshot.routes_for_gate("North").len(), 1);
        assert!(snapshot.routes_for_gate("South").is_empty());
    }

    #[test]
    fn gate_initial_handles_multibyte_names() {
        assert_eq!(Gate::new("Östra", Point::default()).initial(), "Ö");
        assert_eq!(Gate::new("", Point::default()).initial(), "");
    }
}
