use foundation::math::LatLng;
use tracing::{debug, info, warn};

use crate::controller::Campus;
use crate::error::ProviderError;
use crate::providers::{Directions, Geocoder, Geolocation, NearbyRequest, Place, PlaceSearch};
use crate::route::RouteOutcome;
use crate::state::MarkerPlace;
use crate::surface::{MapSurface, MarkerSpec, PanelAction, PanelContent};
use crate::viewer::model_viewer_url;

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerClickOutcome {
    NoMarker,
    /// Panel opened with full place details.
    Opened(Place),
    /// The single nearby lookup failed or found nothing; the panel shows the
    /// bare position.
    OpenedUnresolved(LatLng),
    /// The marker was replaced while its details were being looked up.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DestinationOutcome {
    Selected { at: LatLng, address: String },
    InvalidCoordinates,
    NoResults,
    Failed(ProviderError),
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    OpenedViewer(String),
    Route(RouteOutcome),
}

fn coordinates_line(at: LatLng) -> String {
    format!("{:.6}, {:.6}", at.lat, at.lng)
}

/// Info panel for a search result or a resolved ad-hoc marker.
pub fn place_panel(place: &Place, placeholder_photo: &str) -> PanelContent {
    let mut lines = Vec::new();
    if let Some(address) = &place.address {
        lines.push(address.clone());
    }
    lines.push(coordinates_line(place.location));
    PanelContent {
        title: place.name.clone(),
        subtitle: None,
        photo_url: place
            .photo_url
            .clone()
            .unwrap_or_else(|| placeholder_photo.to_string()),
        lines,
        actions: vec![PanelAction::PlanRoute],
    }
}

fn unresolved_panel(position: LatLng, label: &str, placeholder_photo: &str) -> PanelContent {
    PanelContent {
        title: label.to_string(),
        subtitle: None,
        photo_url: placeholder_photo.to_string(),
        lines: vec![coordinates_line(position)],
        actions: vec![PanelAction::PlanRoute],
    }
}

impl<M: MapSurface, P> Campus<M, P> {
    /// Places one permanent marker per configured building. Calling it again
    /// replaces the previous set.
    pub fn install_buildings(&self) -> usize {
        let mut surface = self.surface.borrow_mut();
        let mut markers = self.building_markers.borrow_mut();
        self.state.borrow_mut().close_panel(&mut surface);
        for marker in markers.drain(..) {
            surface.remove_marker(marker);
        }
        for building in &self.config.buildings {
            markers.push(surface.add_marker(&building.marker_spec()));
        }
        info!("installed {} building markers", markers.len());
        markers.len()
    }

    /// Opens the floor panel of building `index` and targets it for routing.
    pub fn on_building_click(&self, index: usize) -> bool {
        let Some(building) = self.config.buildings.get(index) else {
            return false;
        };
        let markers = self.building_markers.borrow();
        let Some(marker) = markers.get(index) else {
            warn!("building {} has no marker installed", building.code);
            return false;
        };

        let content = building.panel_content(&self.config.placeholder_photo_url);
        let mut surface = self.surface.borrow_mut();
        let mut state = self.state.borrow_mut();
        state.open_panel(&mut surface, &content, marker);
        state.select_destination(building.position);
        debug!("opened panel for {}", building.code);
        true
    }
}

impl<M: MapSurface, P: PlaceSearch> Campus<M, P> {
    /// Opens the info panel of the ad-hoc marker.
    ///
    /// An unresolved marker gets exactly one nearby lookup; whatever it
    /// yields, the marker is never looked up again.
    pub async fn on_marker_click(&self) -> MarkerClickOutcome {
        let (generation, place) = {
            let state = self.state.borrow();
            let Some(active) = state.active_marker() else {
                return MarkerClickOutcome::NoMarker;
            };
            (state.marker_generation(), active.place().clone())
        };

        let (position, label) = match place {
            MarkerPlace::Resolved(place) => {
                self.show_place(&place);
                return MarkerClickOutcome::Opened(place);
            }
            MarkerPlace::Unresolved { position, label } => (position, label),
        };

        let request = NearbyRequest {
            location: position,
            radius_m: self.config.search.nearby_radius_m,
        };
        let found = match self.providers.nearby_search(&request).await {
            Ok(places) => places.into_iter().next(),
            Err(err) => {
                warn!("nearby lookup for '{label}' failed: {err}");
                None
            }
        };

        if self.state.borrow().marker_generation() != generation {
            debug!("marker replaced during lookup for '{label}'");
            return MarkerClickOutcome::Superseded;
        }

        match found {
            Some(place) => {
                self.state.borrow_mut().resolve_marker(place.clone());
                self.show_place(&place);
                MarkerClickOutcome::Opened(place)
            }
            None => {
                // Record the bare point as final so the lookup is not repeated.
                let bare = Place::at(position, label.clone());
                self.state.borrow_mut().resolve_marker(bare);
                let content =
                    unresolved_panel(position, &label, &self.config.placeholder_photo_url);
                let mut surface = self.surface.borrow_mut();
                let mut state = self.state.borrow_mut();
                state.open_panel_at_marker(&mut surface, &content);
                state.select_destination(position);
                MarkerClickOutcome::OpenedUnresolved(position)
            }
        }
    }

    /// Opens the place details on the ad-hoc marker and targets the pin
    /// itself, not the looked-up place.
    fn show_place(&self, place: &Place) {
        let content = place_panel(place, &self.config.placeholder_photo_url);
        let mut surface = self.surface.borrow_mut();
        let mut state = self.state.borrow_mut();
        state.open_panel_at_marker(&mut surface, &content);
        let pin = state.active_marker().map(|active| active.position());
        if let Some(pin) = pin.filter(LatLng::is_finite) {
            state.select_destination(pin);
        }
    }
}

impl<M: MapSurface, P: Geocoder> Campus<M, P> {
    /// Targets the clicked point and marks it with its street address.
    pub async fn on_map_click(&self, at: LatLng) -> DestinationOutcome {
        if !at.is_finite() {
            warn!("ignoring map click at a non-finite position");
            return DestinationOutcome::InvalidCoordinates;
        }

        let seq = self.sequencer.borrow_mut().map_click.next_id();
        let results = match self.providers.reverse_geocode(at).await {
            Ok(results) => results,
            Err(err) => {
                warn!("reverse geocoding {} failed: {err}", coordinates_line(at));
                return DestinationOutcome::Failed(err);
            }
        };

        if !self.sequencer.borrow().map_click.is_latest(seq) {
            return DestinationOutcome::Superseded;
        }
        let Some(result) = results.into_iter().next() else {
            info!("no address at {}", coordinates_line(at));
            return DestinationOutcome::NoResults;
        };

        let address = result.formatted_address;
        let spec = MarkerSpec::new(at, address.clone());
        {
            let mut surface = self.surface.borrow_mut();
            let mut state = self.state.borrow_mut();
            state.select_destination(at);
            state.replace_marker(
                &mut surface,
                &spec,
                MarkerPlace::Unresolved {
                    position: at,
                    label: address.clone(),
                },
            );
        }
        info!("destination set to {address}");
        DestinationOutcome::Selected { at, address }
    }
}

impl<M, P> Campus<M, P>
where
    M: MapSurface,
    P: Geolocation + Directions<Route = M::Route>,
{
    /// Runs the workflow behind an info-panel button.
    pub async fn handle_action(&self, action: &PanelAction) -> ActionOutcome {
        match action {
            PanelAction::ViewFloor { building, floor } => {
                let url = model_viewer_url(&self.config.model_viewer_page, building, *floor);
                debug!("opening model viewer at {url}");
                self.surface.borrow_mut().open_url(&url);
                ActionOutcome::OpenedViewer(url)
            }
            PanelAction::PlanRoute => ActionOutcome::Route(self.plan_route().await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionOutcome, DestinationOutcome, MarkerClickOutcome, place_panel};
    use crate::config::CampusConfig;
    use crate::controller::Campus;
    use crate::error::{ProviderError, ProviderStatus};
    use crate::mock::{MockProviders, MockSurface};
    use crate::providers::{GeocodeResult, Place};
    use crate::state::MarkerPlace;
    use crate::surface::PanelAction;
    use foundation::math::LatLng;
    use pretty_assertions::assert_eq;
    use std::future::Future;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    fn campus() -> Campus<MockSurface, MockProviders> {
        Campus::new(
            CampusConfig::default(),
            MockSurface::default(),
            MockProviders::default(),
        )
    }

    fn resolved(name: &str, at: LatLng) -> Place {
        Place {
            place_id: Some(format!("id-{name}")),
            name: name.to_string(),
            location: at,
            address: Some(format!("{name} Rd.")),
            photo_url: None,
        }
    }

    fn geocoded(address: &str, at: LatLng) -> GeocodeResult {
        GeocodeResult {
            formatted_address: address.to_string(),
            location: at,
        }
    }

    #[test]
    fn building_markers_are_installed_once() {
        let campus = campus();
        assert_eq!(campus.install_buildings(), 2);
        assert_eq!(campus.install_buildings(), 2);
        assert_eq!(campus.surface().live_markers(), 2);
    }

    #[test]
    fn building_click_lists_floors_and_selects_destination() {
        let campus = campus();
        campus.install_buildings();

        assert!(campus.on_building_click(0));

        let surface = campus.surface();
        let panel = surface.current_panel().unwrap();
        assert_eq!(panel.title, "General Classroom Building");
        assert_eq!(panel.photo_url, "images/placeholder.png");
        // five floors plus the route button
        assert_eq!(panel.actions.len(), 6);
        assert_eq!(campus.destination(), Some(LatLng::new(24.9873, 121.5754)));
    }

    #[test]
    fn building_found_by_its_marker() {
        let campus = campus();
        campus.install_buildings();
        let library = campus
            .surface()
            .markers
            .iter()
            .find(|(_, spec)| spec.title == "Library")
            .map(|(key, _)| *key);
        assert_eq!(campus.find_building(|m| Some(m.0) == library), Some(1));
        assert_eq!(campus.find_building(|m| m.0 == 999), None);
    }

    #[test]
    fn unknown_building_is_ignored() {
        let campus = campus();
        assert!(!campus.on_building_click(0));
        campus.install_buildings();
        assert!(!campus.on_building_click(7));
        assert_eq!(campus.surface().live_panels(), 0);
    }

    #[test]
    fn listeners_track_only_the_current_panel() {
        let campus = campus();
        campus.install_buildings();

        for index in [0, 1, 0, 1, 1] {
            campus.on_building_click(index);
            let expected = campus.config().buildings[index].panel_actions().len();
            assert_eq!(campus.state().bound_listener_count(), expected);
            assert_eq!(campus.surface().live_listeners(), expected);
            assert_eq!(campus.surface().live_panels(), 1);
        }
    }

    #[test]
    fn destinations_follow_the_latest_selection() {
        let campus = campus();
        campus.install_buildings();
        campus.on_building_click(0);
        campus.on_building_click(1);
        assert_eq!(campus.destination(), Some(LatLng::new(24.9869, 121.5762)));
    }

    #[test]
    fn click_without_marker_does_nothing() {
        let campus = campus();
        assert_eq!(
            pollster::block_on(campus.on_marker_click()),
            MarkerClickOutcome::NoMarker
        );
        assert_eq!(campus.providers().nearby.calls(), 0);
    }

    #[test]
    fn unresolved_marker_is_looked_up_once() {
        let campus = campus();
        let at = LatLng::new(24.98, 121.57);
        campus.providers().geocode.push(Ok(vec![geocoded("No. 64, Sec. 2", at)]));
        pollster::block_on(campus.on_map_click(at));

        let place = resolved("Library", at);
        campus.providers().nearby.push(Ok(vec![place.clone()]));
        assert_eq!(
            pollster::block_on(campus.on_marker_click()),
            MarkerClickOutcome::Opened(place.clone())
        );
        assert_eq!(
            pollster::block_on(campus.on_marker_click()),
            MarkerClickOutcome::Opened(place)
        );

        assert_eq!(campus.providers().nearby.calls(), 1);
        let surface = campus.surface();
        let panel = surface.current_panel().unwrap();
        assert_eq!(panel.title, "Library");
        assert_eq!(panel.lines[0], "Library Rd.");
        assert_eq!(surface.live_panels(), 1);
    }

    #[test]
    fn resolved_marker_keeps_the_clicked_point_as_destination() {
        let campus = campus();
        let clicked = LatLng::new(24.987, 121.575);
        campus
            .providers()
            .geocode
            .push(Ok(vec![geocoded("No. 64, Sec. 2", clicked)]));
        pollster::block_on(campus.on_map_click(clicked));

        let cafe = resolved("Cafe", LatLng::new(24.9874, 121.5754));
        campus.providers().nearby.push(Ok(vec![cafe.clone()]));
        assert_eq!(
            pollster::block_on(campus.on_marker_click()),
            MarkerClickOutcome::Opened(cafe)
        );

        let pin = campus.state().active_marker().map(|active| active.position());
        assert_eq!(pin, Some(clicked));
        assert_eq!(campus.destination(), Some(clicked));
        assert_eq!(campus.surface().current_panel().unwrap().title, "Cafe");
    }

    #[test]
    fn failed_lookup_opens_bare_panel_and_is_not_retried() {
        let campus = campus();
        let at = LatLng::new(24.5, 121.5);
        campus.providers().geocode.push(Ok(vec![geocoded("Somewhere", at)]));
        pollster::block_on(campus.on_map_click(at));

        campus
            .providers()
            .nearby
            .push(Err(ProviderError::Status(ProviderStatus::ZeroResults)));
        assert_eq!(
            pollster::block_on(campus.on_marker_click()),
            MarkerClickOutcome::OpenedUnresolved(at)
        );
        assert!(matches!(
            pollster::block_on(campus.on_marker_click()),
            MarkerClickOutcome::Opened(_)
        ));
        assert_eq!(campus.providers().nearby.calls(), 1);

        let surface = campus.surface();
        let panel = surface.current_panel().unwrap();
        assert_eq!(panel.title, "Somewhere");
        assert_eq!(panel.actions, vec![PanelAction::PlanRoute]);
    }

    #[test]
    fn replaced_marker_drops_lookup_result() {
        let campus = campus();
        let mut cx = Context::from_waker(Waker::noop());
        let a = LatLng::new(1.0, 1.0);
        campus.providers().geocode.push(Ok(vec![geocoded("A", a)]));
        pollster::block_on(campus.on_map_click(a));

        let mut click = pin!(campus.on_marker_click());
        assert!(click.as_mut().poll(&mut cx).is_pending());

        let b = LatLng::new(2.0, 2.0);
        campus.providers().geocode.push(Ok(vec![geocoded("B", b)]));
        pollster::block_on(campus.on_map_click(b));

        campus.providers().nearby.push(Ok(vec![resolved("A", a)]));
        assert_eq!(
            click.as_mut().poll(&mut cx),
            Poll::Ready(MarkerClickOutcome::Superseded)
        );
        assert_eq!(campus.surface().live_panels(), 0);
        assert!(matches!(
            campus.state().active_marker().unwrap().place(),
            MarkerPlace::Unresolved { .. }
        ));
    }

    #[test]
    fn map_click_sets_destination_and_marker() {
        let campus = campus();
        let at = LatLng::new(24.99, 121.58);
        campus.providers().geocode.push(Ok(vec![geocoded("Zhinan Rd.", at)]));

        assert_eq!(
            pollster::block_on(campus.on_map_click(at)),
            DestinationOutcome::Selected {
                at,
                address: "Zhinan Rd.".to_string()
            }
        );
        assert_eq!(campus.destination(), Some(at));
        let surface = campus.surface();
        assert_eq!(surface.live_markers(), 1);
        assert_eq!(surface.markers.values().next().unwrap().title, "Zhinan Rd.");
    }

    #[test]
    fn failed_geocode_changes_nothing() {
        let campus = campus();
        campus
            .providers()
            .geocode
            .push(Err(ProviderError::Network("offline".to_string())));
        let outcome = pollster::block_on(campus.on_map_click(LatLng::new(1.0, 1.0)));
        assert!(matches!(outcome, DestinationOutcome::Failed(_)));
        assert_eq!(campus.destination(), None);
        assert_eq!(campus.surface().live_markers(), 0);
    }

    #[test]
    fn non_finite_click_makes_no_request() {
        let campus = campus();
        let outcome = pollster::block_on(campus.on_map_click(LatLng::new(f64::INFINITY, 0.0)));
        assert_eq!(outcome, DestinationOutcome::InvalidCoordinates);
        assert_eq!(campus.providers().geocode.calls(), 0);
    }

    #[test]
    fn floor_button_opens_model_viewer() {
        let campus = campus();
        let action = PanelAction::ViewFloor {
            building: "GCB".to_string(),
            floor: 3,
        };
        let expected = "glb-model.html?param1=GCB-3F-cube.glb&param2=GCB-3F-nav.glb";
        assert_eq!(
            pollster::block_on(campus.handle_action(&action)),
            ActionOutcome::OpenedViewer(expected.to_string())
        );
        assert_eq!(campus.surface().opened_urls, vec![expected.to_string()]);
    }

    #[test]
    fn place_without_photo_uses_placeholder() {
        let panel = place_panel(&Place::at(LatLng::new(1.0, 2.0), "Gate"), "none.png");
        assert_eq!(panel.photo_url, "none.png");
        assert_eq!(panel.lines, vec!["1.000000, 2.000000".to_string()]);
    }
}
