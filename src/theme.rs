use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub background: String,
    pub route_color: String,
    pub route_width: f64,
    pub dimmed_route_opacity: f64,
    pub draft_color: String,
    pub draft_width: f64,
    pub driver_route_color: String,
    pub driver_route_width: f64,
    pub gate_fill: String,
    pub gate_text_color: String,
    pub gate_border: String,
    pub gate_radius: f64,
    pub selected_gate_fill: String,
    pub selected_gate_text_color: String,
    pub selected_gate_border: String,
    pub selected_gate_halo: String,
    pub caption_color: String,
}

impl Theme {
    pub fn site_default() -> Self {
        Self {
            font_family: "system-ui, -apple-system, Segoe UI, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            route_color: "#6366F1".to_string(),
            route_width: 3.0,
            dimmed_route_opacity: 0.5,
            draft_color: "#CC0000".to_string(),
            draft_width: 4.0,
            driver_route_color: "#CC0000".to_string(),
            driver_route_width: 4.0,
            gate_fill: "#6366F1".to_string(),
            gate_text_color: "#FFFFFF".to_string(),
            gate_border: "#FFFFFF".to_string(),
            gate_radius: 14.0,
            selected_gate_fill: "#FACC15".to_string(),
            selected_gate_text_color: "#232946".to_string(),
            selected_gate_border: "#232946".to_string(),
            selected_gate_halo: "#FDE68A".to_string(),
            caption_color: "#232946".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#F8FAFF".to_string(),
            route_color: "#7A8AA6".to_string(),
            route_width: 3.0,
            dimmed_route_opacity: 0.4,
            draft_color: "#E4572E".to_string(),
            draft_width: 4.0,
            driver_route_color: "#E4572E".to_string(),
            driver_route_width: 5.0,
            gate_fill: "#1C2430".to_string(),
            gate_text_color: "#FFFFFF".to_string(),
            gate_border: "#C7D2E5".to_string(),
            gate_radius: 12.0,
            selected_gate_fill: "#F5B700".to_string(),
            selected_gate_text_color: "#1C2430".to_string(),
            selected_gate_border: "#1C2430".to_string(),
            selected_gate_halo: "#FFE8A3".to_string(),
            caption_color: "#1C2430".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::site_default()
    }
}
