use crate::authoring::RouteAuthoring;
use crate::config::{Config, load_config};
use crate::geometry::ImageSize;
use crate::overlay::OverlayScene;
use crate::render::{render_svg, write_output_png, write_output_svg};
use crate::site::Site;
use crate::store::FileStore;
use crate::viewer::DriverView;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

static PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)\s*$").unwrap());
static SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*[xX×]\s*(\d+(?:\.\d+)?)\s*$").unwrap());

#[derive(Parser, Debug)]
#[command(name = "gatemap", version, about = "Annotate a site map with gates and routes")]
pub struct Args {
    /// Config JSON/JSON5 file (theme, render size, store directory)
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the site records. Overrides the config file.
    #[arg(short = 's', long = "store", global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Site map image reference
    #[command(subcommand)]
    Image(ImageCommand),
    /// Named gates on the map
    #[command(subcommand)]
    Gate(GateCommand),
    /// Routes from a gate to a destination
    #[command(subcommand)]
    Route(RouteCommand),
    /// Draw overlays as SVG or PNG
    #[command(subcommand)]
    Render(RenderCommand),
}

#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    /// Set the image reference (path, URL or data URL)
    Set { reference: String },
    /// Print the current image reference
    Show,
}

#[derive(Subcommand, Debug)]
pub enum GateCommand {
    /// Add a gate where the operator clicked
    Add {
        name: String,
        /// Click position in pixels, `X,Y`
        #[arg(long)]
        at: String,
        /// Measured image size the click was made on, `WxH`
        #[arg(long)]
        size: String,
    },
    /// Delete a gate and every route leaving it
    Delete {
        name: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    List,
}

#[derive(Subcommand, Debug)]
pub enum RouteCommand {
    /// Draw a route by replaying clicks, then save it under a destination
    Draw {
        #[arg(long)]
        gate: String,
        /// Click position in pixels, `X,Y`; repeat in drawing order
        #[arg(long = "point", required = true)]
        points: Vec<String>,
        /// Measured image size the clicks were made on, `WxH`
        #[arg(long)]
        size: String,
        #[arg(long)]
        dest: String,
    },
    /// Delete one route
    Delete {
        #[arg(long)]
        gate: String,
        #[arg(long)]
        dest: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    List {
        #[arg(long)]
        gate: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RenderCommand {
    /// Editing surface: all gates and routes, optionally an unsaved line
    Editor {
        /// Image size to draw at, `WxH`. Defaults to the configured size.
        #[arg(long)]
        size: Option<String>,
        /// Preview a line from this gate without saving it
        #[arg(long)]
        gate: Option<String>,
        /// Preview click position in pixels, `X,Y`
        #[arg(long = "point", requires = "gate")]
        points: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Driver view: one route from a gate to a destination
    Driver {
        /// Starting gate. Defaults to the first gate.
        #[arg(long)]
        gate: Option<String>,
        /// Destination. Defaults to the gate's first route.
        #[arg(long)]
        dest: Option<String>,
        #[arg(long)]
        size: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct OutputArgs {
    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    execute(Args::parse())
}

pub fn execute(args: Args) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(dir) = args.store {
        config.store.dir = dir;
    }
    let store = FileStore::open(&config.store.dir)
        .with_context(|| format!("opening store {}", config.store.dir.display()))?;
    let mut site = Site::load(store)?;

    match args.command {
        Command::Image(cmd) => run_image(&mut site, cmd),
        Command::Gate(cmd) => run_gate(&mut site, cmd),
        Command::Route(cmd) => run_route(&mut site, cmd),
        Command::Render(cmd) => run_render(&site, &config, cmd),
    }
}

fn run_image(site: &mut Site<FileStore>, cmd: ImageCommand) -> Result<()> {
    match cmd {
        ImageCommand::Set { reference } => {
            site.set_image(reference)?;
        }
        ImageCommand::Show => match site.image() {
            Some(image) => println!("{image}"),
            None => println!("(no site image)"),
        },
    }
    Ok(())
}

fn run_gate(site: &mut Site<FileStore>, cmd: GateCommand) -> Result<()> {
    match cmd {
        GateCommand::Add { name, at, size } => {
            let (px, py) = parse_pair(&at)?;
            let size = parse_size(&size)?;
            let gate = site.add_gate(&name, size.to_normalized(px, py))?;
            println!(
                "{}\t{:.4}\t{:.4}",
                gate.name,
                gate.position.x(),
                gate.position.y()
            );
        }
        GateCommand::Delete { name, yes } => {
            let routes = site.routes_for_gate(&name).len();
            if !yes {
                anyhow::bail!(
                    "refusing to delete gate `{name}` and its {routes} route(s) without --yes"
                );
            }
            site.delete_gate(&name)?;
        }
        GateCommand::List => {
            for gate in site.gates() {
                println!(
                    "{}\t{:.4}\t{:.4}\t{} route(s)",
                    gate.name,
                    gate.position.x(),
                    gate.position.y(),
                    site.routes_for_gate(&gate.name).len()
                );
            }
        }
    }
    Ok(())
}

fn run_route(site: &mut Site<FileStore>, cmd: RouteCommand) -> Result<()> {
    match cmd {
        RouteCommand::Draw {
            gate,
            points,
            size,
            dest,
        } => {
            let size = parse_size(&size)?;
            let mut authoring = RouteAuthoring::new();
            authoring.select_gate(site, &gate)?;
            for raw in &points {
                let (px, py) = parse_pair(raw)?;
                authoring.add_point(px, py, size.width(), size.height())?;
            }
            let route = authoring
                .commit(site, &dest)
                .with_context(|| format!("saving route `{gate}` -> `{dest}`"))?;
            println!(
                "{}\t{}\t{} point(s)",
                route.gate_name,
                route.destination,
                route.line.len()
            );
        }
        RouteCommand::Delete { gate, dest, yes } => {
            if !yes {
                anyhow::bail!("refusing to delete route `{gate}` -> `{dest}` without --yes");
            }
            site.delete_route_for(&gate, &dest)?;
        }
        RouteCommand::List { gate } => {
            let routes = site
                .routes()
                .iter()
                .filter(|route| gate.as_deref().is_none_or(|g| route.gate_name == g));
            for route in routes {
                let line = route
                    .line
                    .iter()
                    .map(|p| format!("{:.4},{:.4}", p.x(), p.y()))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("{}\t{}\t{}", route.gate_name, route.destination, line);
            }
        }
    }
    Ok(())
}

fn run_render(site: &Site<FileStore>, config: &Config, cmd: RenderCommand) -> Result<()> {
    match cmd {
        RenderCommand::Editor {
            size,
            gate,
            points,
            output,
        } => {
            let size = render_size(size.as_deref(), config)?;
            let mut authoring = RouteAuthoring::new();
            if let Some(gate) = gate.as_deref() {
                authoring.select_gate(site, gate)?;
                for raw in &points {
                    let (px, py) = parse_pair(raw)?;
                    authoring.add_point(px, py, size.width(), size.height())?;
                }
            }
            let scene = OverlayScene::editor(site, &authoring, size.width(), size.height());
            emit(&scene, config, &output, site.store().dir())
        }
        RenderCommand::Driver {
            gate,
            dest,
            size,
            output,
        } => {
            let size = render_size(size.as_deref(), config)?;
            let snapshot = site.snapshot();
            let mut view = DriverView::open(&snapshot, gate.as_deref())?;
            if let Some(dest) = dest.as_deref() {
                view.select_destination(&snapshot, dest)?;
            }
            let scene = view
                .scene(&snapshot, size.width(), size.height())
                .ok_or_else(|| anyhow::anyhow!("No routes for gate {}", view.gate().unwrap_or("(none)")))?;
            emit(&scene, config, &output, site.store().dir())
        }
    }
}

fn emit(scene: &OverlayScene, config: &Config, output: &OutputArgs, resources: &Path) -> Result<()> {
    let svg = render_svg(scene, &config.theme);
    match output.output_format {
        OutputFormat::Svg => write_output_svg(&svg, output.output.as_deref()),
        OutputFormat::Png => {
            let path = output
                .output
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            write_output_png(&svg, path, &config.render, Some(resources))
        }
    }
}

fn render_size(raw: Option<&str>, config: &Config) -> Result<ImageSize> {
    match raw {
        Some(raw) => parse_size(raw),
        None => ImageSize::measured(config.render.width, config.render.height)
            .ok_or_else(|| anyhow::anyhow!("Configured render size must be positive")),
    }
}

fn parse_pair(raw: &str) -> Result<(f64, f64)> {
    let caps = PAIR_RE
        .captures(raw)
        .ok_or_else(|| anyhow::anyhow!("Expected `X,Y`, got `{raw}`"))?;
    Ok((caps[1].parse()?, caps[2].parse()?))
}

fn parse_size(raw: &str) -> Result<ImageSize> {
    let caps = SIZE_RE
        .captures(raw)
        .ok_or_else(|| anyhow::anyhow!("Expected `WxH`, got `{raw}`"))?;
    let width: f64 = caps[1].parse()?;
    let height: f64 = caps[2].parse()?;
    ImageSize::measured(width, height)
        .ok_or_else(|| anyhow::anyhow!("Image size `{raw}` has a zero side"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    fn run_in(dir: &Path, argv: &[&str]) -> Result<()> {
        let mut full = vec!["gatemap", "--store", dir.to_str().unwrap()];
        full.extend_from_slice(argv);
        execute(Args::try_parse_from(full)?)
    }

    #[test]
    fn parses_pairs_and_sizes() {
        assert_eq!(parse_pair("400,200").unwrap(), (400.0, 200.0));
        assert_eq!(parse_pair(" 12.5 , -3 ").unwrap(), (12.5, -3.0));
        assert!(parse_pair("400;200").is_err());

        let size = parse_size("800x400").unwrap();
        assert_eq!((size.width(), size.height()), (800.0, 400.0));
        assert!(parse_size("800x0").is_err());
        assert!(parse_size("wide").is_err());
    }

    #[test]
    fn draws_and_lists_routes_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        run_in(dir.path(), &["gate", "add", "G1", "--at", "400,200", "--size", "800x400"]).unwrap();
        run_in(
            dir.path(),
            &[
                "route", "draw", "--gate", "G1", "--size", "800x400", "--point", "400,200",
                "--point", "800,400", "--dest", "Dock",
            ],
        )
        .unwrap();

        let site = Site::load(FileStore::open(dir.path()).unwrap()).unwrap();
        assert_eq!(site.gates()[0].position, Point::new(0.5, 0.5));
        let route = site.route_for("G1", "Dock").unwrap();
        assert_eq!(route.line, vec![Point::new(0.5, 0.5), Point::new(1.0, 1.0)]);
    }

    #[test]
    fn single_click_route_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        run_in(dir.path(), &["gate", "add", "G1", "--at", "1,1", "--size", "10x10"]).unwrap();
        let err = run_in(
            dir.path(),
            &["route", "draw", "--gate", "G1", "--size", "10x10", "--point", "5,5", "--dest", "Dock"],
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("at least 2 points"));
        let site = Site::load(FileStore::open(dir.path()).unwrap()).unwrap();
        assert!(site.routes().is_empty());
    }

    #[test]
    fn deletion_needs_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        run_in(dir.path(), &["gate", "add", "G1", "--at", "1,1", "--size", "10x10"]).unwrap();
        assert!(run_in(dir.path(), &["gate", "delete", "G1"]).is_err());
        run_in(dir.path(), &["gate", "delete", "G1", "--yes"]).unwrap();
        let site = Site::load(FileStore::open(dir.path()).unwrap()).unwrap();
        assert!(site.gates().is_empty());
    }

    #[test]
    fn renders_driver_view_to_file() {
        let dir = tempfile::tempdir().unwrap();
        run_in(dir.path(), &["gate", "add", "G1", "--at", "1,1", "--size", "10x10"]).unwrap();
        run_in(
            dir.path(),
            &[
                "route", "draw", "--gate", "G1", "--size", "10x10", "--point", "5,5", "--point",
                "10,10", "--dest", "Dock",
            ],
        )
        .unwrap();
        let out = dir.path().join("driver.svg");
        run_in(
            dir.path(),
            &[
                "render", "driver", "--gate", "G1", "--dest", "Dock", "--size", "1600x800", "-o",
                out.to_str().unwrap(),
            ],
        )
        .unwrap();
        let svg = std::fs::read_to_string(out).unwrap();
        assert!(svg.contains("points=\"800,400 1600,800\""));
    }
}
