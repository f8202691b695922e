use foundation::math::LatLng;
use tracing::debug;

use crate::providers::Place;
use crate::surface::{MapSurface, MarkerSpec, PanelContent};

/// What is known about the place under an ad-hoc marker.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerPlace {
    /// Only a point (and a label for it); details need one nearby lookup.
    Unresolved { position: LatLng, label: String },
    Resolved(Place),
}

impl MarkerPlace {
    /// Search results that carry a place id need no further lookup.
    pub fn from_search(place: Place) -> Self {
        if place.is_resolved() {
            MarkerPlace::Resolved(place)
        } else {
            MarkerPlace::Unresolved {
                position: place.location,
                label: place.name,
            }
        }
    }

    pub fn position(&self) -> LatLng {
        match self {
            MarkerPlace::Unresolved { position, .. } => *position,
            MarkerPlace::Resolved(place) => place.location,
        }
    }
}

pub struct ActiveMarker<M: MapSurface> {
    marker: M::Marker,
    position: LatLng,
    place: MarkerPlace,
}

impl<M: MapSurface> ActiveMarker<M> {
    pub fn marker(&self) -> &M::Marker {
        &self.marker
    }

    /// Where the pin sits. Resolving the place never moves it.
    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn place(&self) -> &MarkerPlace {
        &self.place
    }
}

struct ActivePanel<M: MapSurface> {
    panel: M::Panel,
    listeners: Vec<M::Listener>,
}

/// Mutable UI state of the workflow.
///
/// Invariants:
/// - at most one destination; selecting replaces it.
/// - at most one ad-hoc marker and one info panel on the map; the old one is
///   detached (panel listeners first) before the new one is attached.
/// - at most one rendered route.
pub struct AppState<M: MapSurface> {
    destination: Option<LatLng>,
    active_marker: Option<ActiveMarker<M>>,
    marker_generation: u64,
    active_panel: Option<ActivePanel<M>>,
    route_shown: bool,
}

impl<M: MapSurface> Default for AppState<M> {
    fn default() -> Self {
        Self {
            destination: None,
            active_marker: None,
            marker_generation: 0,
            active_panel: None,
            route_shown: false,
        }
    }
}

impl<M: MapSurface> AppState<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destination(&self) -> Option<LatLng> {
        self.destination
    }

    /// Replaces the destination, returning the previous one.
    pub fn select_destination(&mut self, at: LatLng) -> Option<LatLng> {
        debug!("destination selected: {}, {}", at.lat, at.lng);
        self.destination.replace(at)
    }

    pub fn active_marker(&self) -> Option<&ActiveMarker<M>> {
        self.active_marker.as_ref()
    }

    /// Bumped every time the ad-hoc marker is replaced.
    pub fn marker_generation(&self) -> u64 {
        self.marker_generation
    }

    /// Detaches the current ad-hoc marker (and any panel on it), then adds
    /// the new one.
    pub fn replace_marker(&mut self, map: &mut M, spec: &MarkerSpec, place: MarkerPlace) {
        self.close_panel(map);
        if let Some(old) = self.active_marker.take() {
            map.remove_marker(old.marker);
        }
        let marker = map.add_marker(spec);
        self.active_marker = Some(ActiveMarker {
            marker,
            position: spec.position,
            place,
        });
        self.marker_generation += 1;
    }

    /// Records resolved details for the current marker so later clicks need
    /// no lookup.
    pub fn resolve_marker(&mut self, place: Place) {
        if let Some(active) = self.active_marker.as_mut() {
            active.place = MarkerPlace::Resolved(place);
        }
    }

    /// Opens a panel anchored at `anchor`, closing the previous one first.
    pub fn open_panel(&mut self, map: &mut M, content: &PanelContent, anchor: &M::Marker) {
        Self::swap_panel(&mut self.active_panel, map, content, anchor);
    }

    /// Opens a panel anchored at the current ad-hoc marker. Returns `false`
    /// when there is no such marker.
    pub fn open_panel_at_marker(&mut self, map: &mut M, content: &PanelContent) -> bool {
        let Some(active) = self.active_marker.as_ref() else {
            return false;
        };
        Self::swap_panel(&mut self.active_panel, map, content, &active.marker);
        true
    }

    fn swap_panel(
        slot: &mut Option<ActivePanel<M>>,
        map: &mut M,
        content: &PanelContent,
        anchor: &M::Marker,
    ) {
        Self::detach_panel(slot, map);
        let panel = map.open_panel(content, anchor);
        let listeners = content
            .actions
            .iter()
            .map(|action| map.bind_action(&panel, action))
            .collect();
        *slot = Some(ActivePanel { panel, listeners });
    }

    fn detach_panel(slot: &mut Option<ActivePanel<M>>, map: &mut M) {
        let Some(old) = slot.take() else {
            return;
        };
        for listener in old.listeners {
            map.unbind_action(listener);
        }
        map.close_panel(old.panel);
    }

    pub fn close_panel(&mut self, map: &mut M) {
        Self::detach_panel(&mut self.active_panel, map);
    }

    pub fn has_open_panel(&self) -> bool {
        self.active_panel.is_some()
    }

    /// Listeners held by the open panel (zero when none is open).
    pub fn bound_listener_count(&self) -> usize {
        self.active_panel
            .as_ref()
            .map_or(0, |panel| panel.listeners.len())
    }

    pub fn show_route(&mut self, map: &mut M, route: &M::Route) {
        if self.route_shown {
            map.clear_route();
        }
        map.show_route(route);
        self.route_shown = true;
    }

    pub fn route_shown(&self) -> bool {
        self.route_shown
    }
}
