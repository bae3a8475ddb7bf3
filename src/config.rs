use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("site-data"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub render: RenderConfig,
    pub store: StoreConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::site_default();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            render,
            store: StoreConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f64>,
    background: Option<String>,
    route_color: Option<String>,
    route_width: Option<f64>,
    dimmed_route_opacity: Option<f64>,
    draft_color: Option<String>,
    draft_width: Option<f64>,
    driver_route_color: Option<String>,
    driver_route_width: Option<f64>,
    gate_fill: Option<String>,
    gate_text_color: Option<String>,
    gate_border: Option<String>,
    gate_radius: Option<f64>,
    selected_gate_fill: Option<String>,
    selected_gate_text_color: Option<String>,
    selected_gate_border: Option<String>,
    selected_gate_halo: Option<String>,
    caption_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreConfigFile {
    dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    render: Option<RenderConfigFile>,
    store: Option<StoreConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Accepts plain JSON as well as JSON5 (comments, trailing commas).
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    match parsed.theme.as_deref() {
        Some("modern") => config.theme = Theme::modern(),
        Some("default") | Some("base") => config.theme = Theme::site_default(),
        Some(other) => log::warn!("unknown theme `{other}`, keeping the default"),
        None => {}
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.route_color {
            config.theme.route_color = v;
        }
        if let Some(v) = vars.route_width {
            config.theme.route_width = v;
        }
        if let Some(v) = vars.dimmed_route_opacity {
            config.theme.dimmed_route_opacity = v.clamp(0.0, 1.0);
        }
        if let Some(v) = vars.draft_color {
            config.theme.draft_color = v;
        }
        if let Some(v) = vars.draft_width {
            config.theme.draft_width = v;
        }
        if let Some(v) = vars.driver_route_color {
            config.theme.driver_route_color = v;
        }
        if let Some(v) = vars.driver_route_width {
            config.theme.driver_route_width = v;
        }
        if let Some(v) = vars.gate_fill {
            config.theme.gate_fill = v;
        }
        if let Some(v) = vars.gate_text_color {
            config.theme.gate_text_color = v;
        }
        if let Some(v) = vars.gate_border {
            config.theme.gate_border = v;
        }
        if let Some(v) = vars.gate_radius {
            config.theme.gate_radius = v;
        }
        if let Some(v) = vars.selected_gate_fill {
            config.theme.selected_gate_fill = v;
        }
        if let Some(v) = vars.selected_gate_text_color {
            config.theme.selected_gate_text_color = v;
        }
        if let Some(v) = vars.selected_gate_border {
            config.theme.selected_gate_border = v;
        }
        if let Some(v) = vars.selected_gate_halo {
            config.theme.selected_gate_halo = v;
        }
        if let Some(v) = vars.caption_color {
            config.theme.caption_color = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
    }

    if let Some(store) = parsed.store {
        if let Some(v) = store.dir {
            config.store.dir = v;
        }
    }

    config.render.background = config.theme.background.clone();

    Ok(config)
}
