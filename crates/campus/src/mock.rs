//! Recording surface and scripted providers for workflow tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::future::{Future, poll_fn};
use std::task::Poll;

use foundation::math::{LatLng, Vec2};

use crate::error::ProviderError;
use crate::providers::{
    Autocomplete, AutocompleteRequest, Directions, GeocodeResult, Geocoder, Geolocation,
    NearbyRequest, Place, PlaceSearch, Prediction, RouteRequest,
};
use crate::surface::{MapSurface, MarkerSpec, PanelAction, PanelContent, SearchBox, ViewportState};

#[derive(Debug)]
pub struct MockSurface {
    pub center: LatLng,
    pub zoom: f64,
    next_handle: u32,
    pub markers: BTreeMap<u32, MarkerSpec>,
    pub panels: BTreeMap<u32, PanelContent>,
    pub listeners: BTreeSet<u32>,
    pub route: Option<String>,
    pub route_clears: usize,
    pub opened_urls: Vec<String>,
    pub input: String,
    pub anchor: Vec2,
    pub renders: Vec<Vec<String>>,
}

impl Default for MockSurface {
    fn default() -> Self {
        Self {
            center: LatLng::new(24.9877, 121.5756),
            zoom: 16.0,
            next_handle: 0,
            markers: BTreeMap::new(),
            panels: BTreeMap::new(),
            listeners: BTreeSet::new(),
            route: None,
            route_clears: 0,
            opened_urls: Vec::new(),
            input: String::new(),
            anchor: Vec2::new(10.0, 42.0),
            renders: Vec::new(),
        }
    }
}

impl MockSurface {
    fn handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn live_markers(&self) -> usize {
        self.markers.len()
    }

    pub fn live_panels(&self) -> usize {
        self.panels.len()
    }

    pub fn live_listeners(&self) -> usize {
        self.listeners.len()
    }

    pub fn current_panel(&self) -> Option<&PanelContent> {
        self.panels.values().next()
    }

    pub fn last_render(&self) -> Option<&Vec<String>> {
        self.renders.last()
    }
}

/// Owned marker handle; deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct MockMarker(pub u32);

impl MapSurface for MockSurface {
    type Marker = MockMarker;
    type Panel = u32;
    type Listener = u32;
    type Route = String;

    fn viewport(&self) -> ViewportState {
        ViewportState {
            center: self.center,
            zoom: self.zoom,
            tilt: 0.0,
            heading: 0.0,
        }
    }

    fn set_center(&mut self, center: LatLng) {
        self.center = center;
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }

    fn add_marker(&mut self, spec: &MarkerSpec) -> MockMarker {
        let id = self.handle();
        self.markers.insert(id, spec.clone());
        MockMarker(id)
    }

    fn remove_marker(&mut self, marker: MockMarker) {
        assert!(self.markers.remove(&marker.0).is_some(), "marker removed twice");
    }

    fn open_panel(&mut self, content: &PanelContent, anchor: &MockMarker) -> u32 {
        assert!(self.markers.contains_key(&anchor.0), "panel anchored to a detached marker");
        let id = self.handle();
        self.panels.insert(id, content.clone());
        id
    }

    fn close_panel(&mut self, panel: u32) {
        assert!(self.panels.remove(&panel).is_some(), "panel closed twice");
    }

    fn bind_action(&mut self, panel: &u32, _action: &PanelAction) -> u32 {
        assert!(self.panels.contains_key(panel));
        let id = self.handle();
        self.listeners.insert(id);
        id
    }

    fn unbind_action(&mut self, listener: u32) {
        assert!(self.listeners.remove(&listener), "listener unbound twice");
    }

    fn show_route(&mut self, route: &String) {
        self.route = Some(route.clone());
    }

    fn clear_route(&mut self) {
        self.route = None;
        self.route_clears += 1;
    }

    fn open_url(&mut self, url: &str) {
        self.opened_urls.push(url.to_string());
    }
}

impl SearchBox for MockSurface {
    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        self.input = value.to_string();
    }

    fn dropdown_anchor(&self) -> Vec2 {
        self.anchor
    }

    fn render_suggestions(&mut self, anchor: Vec2, suggestions: &[Prediction]) {
        self.anchor = anchor;
        self.renders
            .push(suggestions.iter().map(|p| p.description.clone()).collect());
    }
}

/// Queue of canned responses. A call whose response has not been pushed yet
/// stays pending until one is.
pub struct Script<T> {
    responses: RefCell<VecDeque<Result<T, ProviderError>>>,
    calls: Cell<usize>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            responses: RefCell::new(VecDeque::new()),
            calls: Cell::new(0),
        }
    }
}

impl<T> Script<T> {
    pub fn push(&self, response: Result<T, ProviderError>) {
        self.responses.borrow_mut().push_back(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn next(&self) -> impl Future<Output = Result<T, ProviderError>> + '_ {
        self.calls.set(self.calls.get() + 1);
        poll_fn(move |_| match self.responses.borrow_mut().pop_front() {
            Some(response) => Poll::Ready(response),
            None => Poll::Pending,
        })
    }
}

#[derive(Default)]
pub struct MockProviders {
    pub text_search: Script<Vec<Place>>,
    pub nearby: Script<Vec<Place>>,
    pub predictions: Script<Vec<Prediction>>,
    pub geocode: Script<Vec<GeocodeResult>>,
    pub position: Script<LatLng>,
    pub routes: Script<String>,
    pub route_requests: RefCell<Vec<RouteRequest>>,
    pub autocomplete_requests: RefCell<Vec<AutocompleteRequest>>,
}

impl PlaceSearch for MockProviders {
    fn text_search(&self, _query: &str) -> impl Future<Output = Result<Vec<Place>, ProviderError>> {
        self.text_search.next()
    }

    fn nearby_search(
        &self,
        _request: &NearbyRequest,
    ) -> impl Future<Output = Result<Vec<Place>, ProviderError>> {
        self.nearby.next()
    }
}

impl Autocomplete for MockProviders {
    fn predictions(
        &self,
        request: &AutocompleteRequest,
    ) -> impl Future<Output = Result<Vec<Prediction>, ProviderError>> {
        self.autocomplete_requests.borrow_mut().push(request.clone());
        self.predictions.next()
    }
}

impl Geocoder for MockProviders {
    fn reverse_geocode(
        &self,
        _at: LatLng,
    ) -> impl Future<Output = Result<Vec<GeocodeResult>, ProviderError>> {
        self.geocode.next()
    }
}

impl Geolocation for MockProviders {
    fn current_position(&self) -> impl Future<Output = Result<LatLng, ProviderError>> {
        self.position.next()
    }
}

impl Directions for MockProviders {
    type Route = String;

    fn route(&self, request: &RouteRequest) -> impl Future<Output = Result<String, ProviderError>> {
        self.route_requests.borrow_mut().push(request.clone());
        self.routes.next()
    }
}
