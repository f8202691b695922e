use foundation::math::{LatLng, Vec2};

use crate::providers::Prediction;

/// The map's camera as the user currently sees it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportState {
    pub center: LatLng,
    pub zoom: f64,
    pub tilt: f64,
    pub heading: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub title: String,
    pub icon_url: Option<String>,
}

impl MarkerSpec {
    pub fn new(position: LatLng, title: impl Into<String>) -> Self {
        Self {
            position,
            title: title.into(),
            icon_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelAction {
    /// Open the model viewer on one floor of a building.
    ViewFloor { building: String, floor: i32 },
    PlanRoute,
}

impl PanelAction {
    pub fn label(&self) -> String {
        match self {
            PanelAction::ViewFloor { floor, .. } => format!("{floor}F"),
            PanelAction::PlanRoute => "Route here".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelContent {
    pub title: String,
    pub subtitle: Option<String>,
    pub photo_url: String,
    pub lines: Vec<String>,
    pub actions: Vec<PanelAction>,
}

/// Everything the workflow does to the map.
///
/// Handles are owned: removing a marker or closing a panel consumes it, so
/// the workflow cannot keep using a detached overlay.
pub trait MapSurface {
    type Marker;
    type Panel;
    type Listener;
    type Route;

    fn viewport(&self) -> ViewportState;
    fn set_center(&mut self, center: LatLng);
    fn set_zoom(&mut self, zoom: f64);

    fn add_marker(&mut self, spec: &MarkerSpec) -> Self::Marker;
    fn remove_marker(&mut self, marker: Self::Marker);

    fn open_panel(&mut self, content: &PanelContent, anchor: &Self::Marker) -> Self::Panel;
    fn close_panel(&mut self, panel: Self::Panel);
    /// Wires one action button of an open panel to the workflow.
    fn bind_action(&mut self, panel: &Self::Panel, action: &PanelAction) -> Self::Listener;
    fn unbind_action(&mut self, listener: Self::Listener);

    fn show_route(&mut self, route: &Self::Route);
    fn clear_route(&mut self);

    /// Opens `url` in a new browser context.
    fn open_url(&mut self, url: &str);
}

/// The search form: text input plus suggestion dropdown.
pub trait SearchBox {
    fn input_value(&self) -> String;
    fn set_input_value(&mut self, value: &str);
    /// Page position just below the input's bottom-left corner.
    fn dropdown_anchor(&self) -> Vec2;
    /// Replaces the dropdown contents entirely.
    fn render_suggestions(&mut self, anchor: Vec2, suggestions: &[Prediction]);
}
