use gatemap::{
    AuthoringState, DriverView, Error, FileStore, MemoryStore, PixelPoint, Point, RouteAuthoring,
    Site, Theme, render_svg, route_overlay, to_normalized, to_pixel,
};

#[test]
fn drawn_route_survives_resize() {
    let mut site = Site::load(MemoryStore::new()).expect("empty store loads");
    site.add_gate("G1", Point::new(0.5, 0.5)).unwrap();

    let mut authoring = RouteAuthoring::new();
    authoring.select_gate(&site, "G1").unwrap();
    authoring.add_point(400.0, 200.0, 800.0, 400.0).unwrap();
    authoring.add_point(800.0, 400.0, 800.0, 400.0).unwrap();
    let route = authoring.commit(&mut site, "Dock").unwrap();

    assert_eq!(authoring.state(), AuthoringState::Idle);
    assert_eq!(route.gate_name, "G1");
    assert_eq!(route.destination, "Dock");
    assert_eq!(route.line, vec![Point::new(0.5, 0.5), Point::new(1.0, 1.0)]);

    let stored = site.store().get_routes_json();
    assert_eq!(
        stored,
        serde_json::json!([
            {"gate": "G1", "dest": "Dock", "line": [{"x": 0.5, "y": 0.5}, {"x": 1.0, "y": 1.0}]}
        ])
    );

    assert_eq!(
        route_overlay(&route, 1600.0, 800.0),
        vec![PixelPoint::new(800.0, 400.0), PixelPoint::new(1600.0, 800.0)]
    );
}

#[test]
fn round_trip_law_holds_across_sizes() {
    for (w, h) in [(640.0, 480.0), (3.0, 7.0), (1024.0, 1.0), (12345.0, 678.0)] {
        for step in 0..=20 {
            let t = step as f64 / 20.0;
            let p = Point::new(t, 1.0 - t * 0.37);
            let px = to_pixel(p, w, h);
            let back = to_normalized(px.x, px.y, w, h).unwrap();
            assert!((back.x() - p.x()).abs() <= 1e-4);
            assert!((back.y() - p.y()).abs() <= 1e-4);
        }
    }
}

#[test]
fn cancelled_session_leaves_no_trace() {
    let mut site = Site::load(MemoryStore::new()).unwrap();
    site.add_gate("G", Point::new(0.1, 0.1)).unwrap();
    let mut authoring = RouteAuthoring::new();

    authoring.select_gate(&site, "G").unwrap();
    for i in 1..=3 {
        authoring.add_point(i as f64 * 10.0, 5.0, 100.0, 100.0).unwrap();
    }
    authoring.cancel();

    assert!(matches!(authoring.commit(&mut site, "Dock"), Err(Error::NoActiveSession)));
    assert!(site.routes().is_empty());
}

#[test]
fn file_store_site_reloads_and_feeds_driver_view() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut site = Site::load(FileStore::open(dir.path()).unwrap()).unwrap();
        site.set_image("yard.png").unwrap();
        site.add_gate("Gate 1", Point::new(0.2, 0.8)).unwrap();
        site.add_gate("Gate 9", Point::new(0.8, 0.8)).unwrap();
        let line = vec![Point::new(0.2, 0.8), Point::new(0.5, 0.1)];
        site.add_route("Gate 1", "Loading Dock", line.clone()).unwrap();
        site.add_route("Gate 9", "Loading Dock", line).unwrap();
        site.delete_gate("Gate 1").unwrap();
    }

    let site = Site::load(FileStore::open(dir.path()).unwrap()).unwrap();
    assert_eq!(site.image(), Some("yard.png"));
    assert_eq!(site.gates().len(), 1);
    assert!(site.routes_for_gate("Gate 1").is_empty());

    let snapshot = site.snapshot();
    let view = DriverView::open(&snapshot, None).unwrap();
    assert_eq!(view.gate(), Some("Gate 9"));
    assert_eq!(view.destination(), Some("Loading Dock"));

    let scene = view.scene(&snapshot, 1000.0, 500.0).unwrap();
    let svg = render_svg(&scene, &Theme::site_default());
    assert!(svg.contains("points=\"200,400 500,50\""));
    assert!(svg.contains("href=\"yard.png\""));
}

trait RoutesJson {
    fn get_routes_json(&self) -> serde_json::Value;
}

impl RoutesJson for MemoryStore {
    fn get_routes_json(&self) -> serde_json::Value {
        use gatemap::KeyValueStore;
        let raw = self
            .get(gatemap::store::SITE_ROUTES_KEY)
            .unwrap()
            .expect("routes were written");
        serde_json::from_str(&raw).unwrap()
    }
}
