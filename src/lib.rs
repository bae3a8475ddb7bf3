pub mod authoring;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod model;
pub mod overlay;
pub mod render;
pub mod site;
pub mod store;
pub mod theme;
pub mod viewer;

pub use authoring::{AuthoringState, DrawingSession, RouteAuthoring};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, RenderConfig, load_config};
pub use error::{Error, Result};
pub use geometry::{ImageSize, PixelPoint, Point, to_normalized, to_pixel};
pub use model::{Gate, Route, SiteSnapshot};
pub use overlay::{OverlayScene, render_overlay, route_overlay};
pub use render::render_svg;
pub use site::Site;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use theme::Theme;
pub use viewer::{DriverView, resolve_route};

/// Renders the driver view for `gate_name` -> `destination` from a site
/// snapshot at the given measured image size.
pub fn render_driver_svg(
    snapshot: &SiteSnapshot,
    gate_name: &str,
    destination: &str,
    width: f64,
    height: f64,
    theme: &Theme,
) -> Result<String> {
    let route = resolve_route(snapshot, gate_name, destination)?;
    let scene = OverlayScene::driver(snapshot.site_image.as_deref(), route, width, height);
    Ok(render_svg(&scene, theme))
}
