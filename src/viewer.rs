//! Driver-facing selection: which gate the driver starts from and which
//! destination they are heading to.
//!
//! Destinations are only looked up within the selected gate, so two gates
//! may both have a route to a destination with the same name.

use crate::error::{Error, Result};
use crate::model::{Route, SiteSnapshot};
use crate::overlay::OverlayScene;

pub fn resolve_route<'a>(snapshot: &'a SiteSnapshot, gate_name: &str, destination: &str) -> Result<&'a Route> {
    snapshot
        .site_routes
        .iter()
        .find(|route| route.is_for(gate_name, destination))
        .ok_or_else(|| Error::NotFound(format!("route `{gate_name}` -> `{destination}`")))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriverView {
    gate: Option<String>,
    destination: Option<String>,
}

impl DriverView {
    /// Starts on `gate_name` if given, otherwise on the first gate of the site.
    pub fn open(snapshot: &SiteSnapshot, gate_name: Option<&str>) -> Result<Self> {
        let mut view = Self::default();
        match gate_name {
            Some(name) => view.select_gate(snapshot, name)?,
            None => {
                if let Some(first) = snapshot.site_gates.first() {
                    view.select_gate(snapshot, &first.name)?;
                }
            }
        }
        Ok(view)
    }

    pub fn gate(&self) -> Option<&str> {
        self.gate.as_deref()
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Switching gates resets the destination to the gate's first route.
    pub fn select_gate(&mut self, snapshot: &SiteSnapshot, gate_name: &str) -> Result<()> {
        if !snapshot.site_gates.iter().any(|gate| gate.name == gate_name) {
            return Err(Error::UnknownGate(gate_name.to_string()));
        }
        self.destination = snapshot
            .routes_for_gate(gate_name)
            .first()
            .map(|route| route.destination.clone());
        self.gate = Some(gate_name.to_string());
        Ok(())
    }

    pub fn select_destination(&mut self, snapshot: &SiteSnapshot, destination: &str) -> Result<()> {
        let gate = self
            .gate
            .as_deref()
            .ok_or_else(|| Error::NotFound("selected gate".to_string()))?;
        resolve_route(snapshot, gate, destination)?;
        self.destination = Some(destination.to_string());
        Ok(())
    }

    /// Destinations reachable from the selected gate, in insertion order.
    pub fn destinations<'a>(&self, snapshot: &'a SiteSnapshot) -> Vec<&'a str> {
        match self.gate.as_deref() {
            Some(gate) => snapshot
                .routes_for_gate(gate)
                .into_iter()
                .map(|route| route.destination.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn route<'a>(&self, snapshot: &'a SiteSnapshot) -> Option<&'a Route> {
        let gate = self.gate.as_deref()?;
        let destination = self.destination.as_deref()?;
        resolve_route(snapshot, gate, destination).ok()
    }

    /// Overlay for the current choice at the image's live size.
    pub fn scene(&self, snapshot: &SiteSnapshot, width: f64, height: f64) -> Option<OverlayScene> {
        let route = self.route(snapshot)?;
        Some(OverlayScene::driver(
            snapshot.site_image.as_deref(),
            route,
            width,
            height,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::Gate;

    fn snapshot() -> SiteSnapshot {
        let line = vec![Point::new(0.1, 0.1), Point::new(0.2, 0.2)];
        let other = vec![Point::new(0.9, 0.9), Point::new(0.8, 0.8)];
        SiteSnapshot {
            site_image: Some("yard.png".to_string()),
            site_gates: vec![
                Gate::new("Gate 1", Point::new(0.1, 0.1)),
                Gate::new("Gate 9", Point::new(0.9, 0.9)),
            ],
            site_routes: vec![
                Route::new("Gate 1", "Loading Dock", line.clone()),
                Route::new("Gate 1", "Stockpile", line),
                Route::new("Gate 9", "Loading Dock", other),
            ],
        }
    }

    #[test]
    fn opens_on_first_gate_and_first_destination() {
        let snapshot = snapshot();
        let view = DriverView::open(&snapshot, None).unwrap();
        assert_eq!(view.gate(), Some("Gate 1"));
        assert_eq!(view.destination(), Some("Loading Dock"));
        assert_eq!(view.destinations(&snapshot), ["Loading Dock", "Stockpile"]);
    }

    #[test]
    fn same_destination_name_resolves_per_gate() {
        let snapshot = snapshot();
        let mut view = DriverView::open(&snapshot, Some("Gate 9")).unwrap();
        view.select_destination(&snapshot, "Loading Dock").unwrap();
        let route = view.route(&snapshot).unwrap();
        assert_eq!(route.gate_name, "Gate 9");
        assert_eq!(route.line[0], Point::new(0.9, 0.9));
    }

    #[test]
    fn destination_of_another_gate_is_not_found() {
        let snapshot = snapshot();
        let mut view = DriverView::open(&snapshot, Some("Gate 9")).unwrap();
        assert!(matches!(
            view.select_destination(&snapshot, "Stockpile"),
            Err(Error::NotFound(_))
        ));
        assert_eq!(view.destination(), Some("Loading Dock"));
    }

    #[test]
    fn switching_gate_resets_destination() {
        let snapshot = snapshot();
        let mut view = DriverView::open(&snapshot, None).unwrap();
        view.select_destination(&snapshot, "Stockpile").unwrap();
        view.select_gate(&snapshot, "Gate 9").unwrap();
        assert_eq!(view.destination(), Some("Loading Dock"));
        assert!(matches!(
            view.select_gate(&snapshot, "Gate 5"),
            Err(Error::UnknownGate(_))
        ));
    }

    #[test]
    fn scene_uses_live_size() {
        let snapshot = snapshot();
        let view = DriverView::open(&snapshot, None).unwrap();
        let scene = view.scene(&snapshot, 1000.0, 500.0).unwrap();
        assert_eq!(scene.routes[0].points[1].x, 200.0);
        assert_eq!(scene.routes[0].points[1].y, 100.0);
        let unmeasured = view.scene(&snapshot, 0.0, 0.0).unwrap();
        assert!(unmeasured.routes.is_empty());
    }

    #[test]
    fn empty_site_has_no_route() {
        let snapshot = SiteSnapshot::default();
        let view = DriverView::open(&snapshot, None).unwrap();
        assert_eq!(view.gate(), None);
        assert!(view.scene(&snapshot, 100.0, 100.0).is_none());
    }
}
