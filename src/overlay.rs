//! Pixel-space overlays for the editing surface and the driver view.
//!
//! Every function takes the image's current measured size. Nothing here
//! caches a size, so a resized image is redrawn by calling again with the
//! new dimensions. An unmeasured image (zero or non-finite size) yields an
//! empty overlay.

use crate::authoring::RouteAuthoring;
use crate::geometry::{ImageSize, PixelPoint, Point};
use crate::model::Route;
use crate::site::Site;
use crate::store::KeyValueStore;

pub fn render_overlay(line: &[Point], width: f64, height: f64) -> Vec<PixelPoint> {
    let Some(size) = ImageSize::measured(width, height) else {
        return Vec::new();
    };
    line.iter().map(|point| size.to_pixel(*point)).collect()
}

pub fn route_overlay(route: &Route, width: f64, height: f64) -> Vec<PixelPoint> {
    render_overlay(&route.line, width, height)
}

/// SVG `points` attribute value: `x,y x,y ...`.
pub fn polyline_points(points: &[PixelPoint]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", trim_float(p.x), trim_float(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn trim_float(value: f64) -> String {
    let text = format!("{value:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteStroke {
    pub gate_name: String,
    pub destination: String,
    pub points: Vec<PixelPoint>,
    /// Drawn at full strength; other routes are dimmed.
    pub emphasized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GateMarker {
    pub name: String,
    pub label: String,
    pub at: PixelPoint,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneKind {
    Editor,
    Driver,
}

/// Everything drawn over the site image at one measured size.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayScene {
    pub kind: SceneKind,
    pub width: f64,
    pub height: f64,
    pub image: Option<String>,
    pub routes: Vec<RouteStroke>,
    pub draft: Vec<PixelPoint>,
    pub gates: Vec<GateMarker>,
    pub caption: Option<String>,
}

impl OverlayScene {
    fn empty(kind: SceneKind, image: Option<&str>, width: f64, height: f64) -> Self {
        Self {
            kind,
            width,
            height,
            image: image.map(str::to_string),
            routes: Vec::new(),
            draft: Vec::new(),
            gates: Vec::new(),
            caption: None,
        }
    }

    pub fn is_measured(&self) -> bool {
        ImageSize::measured(self.width, self.height).is_some()
    }

    /// Editing surface: every route, the line being drawn and all gate
    /// markers. Routes from the gate being drawn from are emphasized.
    pub fn editor<S: KeyValueStore>(
        site: &Site<S>,
        authoring: &RouteAuthoring,
        width: f64,
        height: f64,
    ) -> Self {
        let mut scene = Self::empty(SceneKind::Editor, site.image(), width, height);
        let Some(size) = ImageSize::measured(width, height) else {
            return scene;
        };
        let active = authoring.selected_gate();

        scene.routes = site
            .routes()
            .iter()
            .map(|route| RouteStroke {
                gate_name: route.gate_name.clone(),
                destination: route.destination.clone(),
                points: route.line.iter().map(|p| size.to_pixel(*p)).collect(),
                emphasized: active == Some(route.gate_name.as_str()),
            })
            .collect();
        scene.draft = authoring.preview(width, height);
        scene.gates = site
            .gates()
            .iter()
            .map(|gate| GateMarker {
                name: gate.name.clone(),
                label: gate.initial(),
                at: size.to_pixel(gate.position),
                selected: active == Some(gate.name.as_str()),
            })
            .collect();
        scene
    }

    /// Driver view: one route and its destination caption.
    pub fn driver(image: Option<&str>, route: &Route, width: f64, height: f64) -> Self {
        let mut scene = Self::empty(SceneKind::Driver, image, width, height);
        scene.caption = Some(route.destination.clone());
        let points = route_overlay(route, width, height);
        if !points.is_empty() {
            scene.routes.push(RouteStroke {
                gate_name: route.gate_name.clone(),
                destination: route.destination.clone(),
                points,
                emphasized: true,
            });
        }
        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn dock_route() -> Route {
        Route::new("G1", "Dock", vec![Point::new(0.5, 0.5), Point::new(1.0, 1.0)])
    }

    #[test]
    fn zero_size_draws_nothing() {
        let route = dock_route();
        assert!(route_overlay(&route, 0.0, 0.0).is_empty());
        assert!(route_overlay(&route, 800.0, 0.0).is_empty());
        assert!(route_overlay(&route, f64::NAN, 10.0).is_empty());
    }

    #[test]
    fn follows_the_size_it_is_given() {
        let route = dock_route();
        assert_eq!(
            route_overlay(&route, 800.0, 400.0),
            vec![PixelPoint::new(400.0, 200.0), PixelPoint::new(800.0, 400.0)]
        );
        assert_eq!(
            route_overlay(&route, 1600.0, 800.0),
            vec![PixelPoint::new(800.0, 400.0), PixelPoint::new(1600.0, 800.0)]
        );
    }

    #[test]
    fn formats_polyline_points() {
        let points = [PixelPoint::new(400.0, 200.5), PixelPoint::new(12.346, 0.0)];
        assert_eq!(polyline_points(&points), "400,200.5 12.35,0");
        assert_eq!(polyline_points(&[]), "");
    }

    #[test]
    fn editor_scene_emphasizes_the_active_gate() {
        let mut site = Site::load(MemoryStore::new()).unwrap();
        site.add_gate("North", Point::new(0.25, 0.5)).unwrap();
        site.add_gate("South", Point::new(0.75, 0.5)).unwrap();
        let line = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        site.add_route("North", "Dock", line.clone()).unwrap();
        site.add_route("South", "Dock", line).unwrap();

        let mut authoring = RouteAuthoring::new();
        authoring.select_gate(&site, "North").unwrap();
        authoring.add_point(10.0, 20.0, 100.0, 100.0).unwrap();

        let scene = OverlayScene::editor(&site, &authoring, 200.0, 100.0);
        assert_eq!(scene.routes.len(), 2);
        assert!(scene.routes[0].emphasized);
        assert!(!scene.routes[1].emphasized);
        assert_eq!(scene.draft, vec![PixelPoint::new(20.0, 20.0)]);
        assert_eq!(scene.gates[0].at, PixelPoint::new(50.0, 50.0));
        assert_eq!(scene.gates[0].label, "N");
        assert!(scene.gates[0].selected);
        assert!(!scene.gates[1].selected);
    }

    #[test]
    fn unmeasured_editor_scene_is_empty() {
        let mut site = Site::load(MemoryStore::new()).unwrap();
        site.add_gate("North", Point::new(0.25, 0.5)).unwrap();
        let scene = OverlayScene::editor(&site, &RouteAuthoring::new(), 0.0, 0.0);
        assert!(!scene.is_measured());
        assert!(scene.gates.is_empty());
        assert!(scene.routes.is_empty());
    }

    #[test]
    fn driver_scene_carries_the_destination() {
        let scene = OverlayScene::driver(Some("yard.png"), &dock_route(), 800.0, 400.0);
        assert_eq!(scene.kind, SceneKind::Driver);
        assert_eq!(scene.caption.as_deref(), Some("Dock"));
        assert_eq!(scene.routes[0].points.len(), 2);
        assert_eq!(scene.image.as_deref(), Some("yard.png"));
    }
}
