use foundation::ids::Id;
use tracing::{debug, info, warn};

use crate::controller::Campus;
use crate::error::ProviderError;
use crate::providers::{Autocomplete, AutocompleteRequest, Place, PlaceSearch, Prediction};
use crate::state::MarkerPlace;
use crate::surface::{MapSurface, MarkerSpec, SearchBox};

#[derive(Debug, Clone, PartialEq)]
pub enum AutocompleteOutcome {
    /// Blank input; the dropdown was emptied without asking the provider.
    Cleared,
    Rendered(usize),
    Failed(ProviderError),
    /// A newer response was already rendered.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    EmptyQuery,
    Failed(ProviderError),
    NoResults,
    InvalidCoordinates,
    /// Another search was submitted while this one was in flight.
    Superseded,
    Found(Place),
}

impl<M: MapSurface + SearchBox, P> Campus<M, P> {
    /// Fills the search input with the clicked suggestion.
    pub fn on_suggestion_click(&self, index: usize) -> Option<String> {
        let description = self
            .suggestions
            .borrow()
            .suggestions
            .get(index)
            .map(|p| p.description.clone())?;
        self.surface.borrow_mut().set_input_value(&description);
        Some(description)
    }

    pub fn suggestions(&self) -> Vec<Prediction> {
        self.suggestions.borrow().suggestions.clone()
    }

    /// Renders `predictions` unless a response issued after `seq` is already
    /// on screen.
    fn render_suggestions(&self, seq: Id, predictions: Vec<Prediction>) -> bool {
        let mut session = self.suggestions.borrow_mut();
        if session.last_rendered.is_some_and(|last| last > seq) {
            return false;
        }
        let mut surface = self.surface.borrow_mut();
        let anchor = surface.dropdown_anchor();
        surface.render_suggestions(anchor, &predictions);
        session.last_rendered = Some(seq);
        session.suggestions = predictions;
        true
    }
}

impl<M: MapSurface + SearchBox, P: Autocomplete> Campus<M, P> {
    /// Handles one keystroke in the search input.
    pub async fn on_input(&self, text: &str) -> AutocompleteOutcome {
        let seq = self.suggestions.borrow_mut().issued.next_id();

        if text.trim().is_empty() {
            return if self.render_suggestions(seq, Vec::new()) {
                AutocompleteOutcome::Cleared
            } else {
                AutocompleteOutcome::Stale
            };
        }

        let request = AutocompleteRequest {
            input: text.to_string(),
            country: self.config.search.country.clone(),
        };
        let predictions = match self.providers.predictions(&request).await {
            Ok(predictions) => predictions,
            Err(err) => {
                warn!("autocomplete for '{text}' failed: {err}");
                return AutocompleteOutcome::Failed(err);
            }
        };

        let count = predictions.len();
        if self.render_suggestions(seq, predictions) {
            AutocompleteOutcome::Rendered(count)
        } else {
            debug!("dropping stale autocomplete response #{}", seq.get());
            AutocompleteOutcome::Stale
        }
    }
}

impl<M: MapSurface, P: PlaceSearch> Campus<M, P> {
    /// Runs a free-text search and moves the map to the first result.
    pub async fn submit_search(&self, term: &str) -> SearchOutcome {
        let term = term.trim();
        if term.is_empty() {
            debug!("ignoring empty search");
            return SearchOutcome::EmptyQuery;
        }

        let seq = self.sequencer.borrow_mut().search.next_id();
        let places = match self.providers.text_search(term).await {
            Ok(places) => places,
            Err(err) => {
                warn!("search for '{term}' failed: {err}");
                return SearchOutcome::Failed(err);
            }
        };

        if !self.sequencer.borrow().search.is_latest(seq) {
            debug!("search '{term}' superseded");
            return SearchOutcome::Superseded;
        }

        let Some(place) = places.into_iter().next() else {
            info!("no results for '{term}'");
            return SearchOutcome::NoResults;
        };
        if !place.location.is_finite() {
            warn!("search result '{}' has invalid coordinates", place.name);
            return SearchOutcome::InvalidCoordinates;
        }

        let spec = MarkerSpec::new(place.location, place.name.clone());
        {
            let mut surface = self.surface.borrow_mut();
            surface.set_center(place.location);
            surface.set_zoom(self.config.search.result_zoom);
            let mut state = self.state.borrow_mut();
            state.select_destination(place.location);
            state.replace_marker(&mut surface, &spec, MarkerPlace::from_search(place.clone()));
        }
        info!("search '{term}' found {}", place.name);
        SearchOutcome::Found(place)
    }
}

#[cfg(test)]
mod tests {
    use super::{AutocompleteOutcome, SearchOutcome};
    use crate::config::CampusConfig;
    use crate::controller::Campus;
    use crate::error::{ProviderError, ProviderStatus};
    use crate::mock::{MockProviders, MockSurface};
    use crate::providers::{Place, Prediction};
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

    fn predictions(names: &[&str]) -> Vec<Prediction> {
        names.iter().map(|n| Prediction::new(*n)).collect()
    }

    #[test]
    fn search_centers_zooms_and_places_one_marker() {
        let campus = campus();
        let at = LatLng::new(24.98, 121.57);
        campus.providers().text_search.push(Ok(vec![Place::at(at, "Library")]));

        let outcome = pollster::block_on(campus.submit_search("Library"));

        assert_eq!(outcome, SearchOutcome::Found(Place::at(at, "Library")));
        let surface = campus.surface();
        assert_eq!(surface.center, at);
        assert_eq!(surface.zoom, 18.0);
        assert_eq!(surface.live_markers(), 1);
        assert_eq!(campus.destination(), Some(at));
    }

    #[test]
    fn only_first_result_is_used() {
        let campus = campus();
        campus.providers().text_search.push(Ok(vec![
            Place::at(LatLng::new(1.0, 2.0), "first"),
            Place::at(LatLng::new(3.0, 4.0), "second"),
        ]));
        pollster::block_on(campus.submit_search("x"));
        assert_eq!(campus.surface().center, LatLng::new(1.0, 2.0));
        assert_eq!(campus.surface().live_markers(), 1);
    }

    #[test]
    fn repeated_searches_keep_one_marker() {
        let campus = campus();
        for name in ["a", "b", "c"] {
            campus
                .providers()
                .text_search
                .push(Ok(vec![Place::at(LatLng::new(1.0, 1.0), name)]));
            pollster::block_on(campus.submit_search(name));
        }
        assert_eq!(campus.surface().live_markers(), 1);
        assert_eq!(campus.state().marker_generation(), 3);
    }

    #[test]
    fn non_finite_coordinates_change_nothing() {
        let campus = campus();
        let before = campus.viewport();
        campus
            .providers()
            .text_search
            .push(Ok(vec![Place::at(LatLng::new(f64::NAN, 121.0), "bad")]));

        let outcome = pollster::block_on(campus.submit_search("bad"));

        assert_eq!(outcome, SearchOutcome::InvalidCoordinates);
        assert_eq!(campus.viewport(), before);
        assert_eq!(campus.surface().live_markers(), 0);
        assert_eq!(campus.destination(), None);
    }

    #[test]
    fn provider_failure_changes_nothing() {
        let campus = campus();
        let error = ProviderError::Status(ProviderStatus::OverQueryLimit);
        campus.providers().text_search.push(Err(error.clone()));
        let outcome = pollster::block_on(campus.submit_search("Library"));
        assert_eq!(outcome, SearchOutcome::Failed(error));
        assert_eq!(campus.surface().live_markers(), 0);
        assert_eq!(campus.surface().zoom, 16.0);
    }

    #[test]
    fn empty_term_makes_no_request() {
        let campus = campus();
        let outcome = pollster::block_on(campus.submit_search("   "));
        assert_eq!(outcome, SearchOutcome::EmptyQuery);
        assert_eq!(campus.providers().text_search.calls(), 0);
    }

    #[test]
    fn zero_results_is_reported() {
        let campus = campus();
        campus.providers().text_search.push(Ok(Vec::new()));
        assert_eq!(
            pollster::block_on(campus.submit_search("nowhere")),
            SearchOutcome::NoResults
        );
    }

    #[test]
    fn older_search_is_superseded() {
        let campus = campus();
        let mut cx = Context::from_waker(Waker::noop());

        let mut first = pin!(campus.submit_search("first"));
        assert!(first.as_mut().poll(&mut cx).is_pending());

        campus
            .providers()
            .text_search
            .push(Ok(vec![Place::at(LatLng::new(1.0, 1.0), "second")]));
        let second = pollster::block_on(campus.submit_search("second"));
        assert!(matches!(second, SearchOutcome::Found(_)));

        campus
            .providers()
            .text_search
            .push(Ok(vec![Place::at(LatLng::new(9.0, 9.0), "first")]));
        assert_eq!(
            first.as_mut().poll(&mut cx),
            Poll::Ready(SearchOutcome::Superseded)
        );
        assert_eq!(campus.surface().center, LatLng::new(1.0, 1.0));
    }

    #[test]
    fn autocomplete_renders_and_restricts_country() {
        let campus = campus();
        campus
            .providers()
            .predictions
            .push(Ok(predictions(&["Library", "Lib Cafe"])));

        let outcome = pollster::block_on(campus.on_input("Lib"));

        assert_eq!(outcome, AutocompleteOutcome::Rendered(2));
        assert_eq!(
            campus.surface().last_render(),
            Some(&vec!["Library".to_string(), "Lib Cafe".to_string()])
        );
        assert_eq!(campus.providers().autocomplete_requests.borrow()[0].country, "tw");
    }

    #[test]
    fn autocomplete_failure_leaves_dropdown_untouched() {
        let campus = campus();
        campus.providers().predictions.push(Ok(predictions(&["A"])));
        pollster::block_on(campus.on_input("A"));

        campus
            .providers()
            .predictions
            .push(Err(ProviderError::Status(ProviderStatus::ZeroResults)));
        let outcome = pollster::block_on(campus.on_input("Ax"));

        assert!(matches!(outcome, AutocompleteOutcome::Failed(_)));
        assert_eq!(campus.surface().renders.len(), 1);
        assert_eq!(campus.suggestions(), predictions(&["A"]));
    }

    #[test]
    fn stale_autocomplete_never_overwrites_newer() {
        let campus = campus();
        let mut cx = Context::from_waker(Waker::noop());

        let mut slow = pin!(campus.on_input("L"));
        assert!(slow.as_mut().poll(&mut cx).is_pending());

        campus.providers().predictions.push(Ok(predictions(&["Library"])));
        assert_eq!(
            pollster::block_on(campus.on_input("Li")),
            AutocompleteOutcome::Rendered(1)
        );

        campus.providers().predictions.push(Ok(predictions(&["Lake", "Lane"])));
        assert_eq!(
            slow.as_mut().poll(&mut cx),
            Poll::Ready(AutocompleteOutcome::Stale)
        );
        assert_eq!(campus.surface().renders.len(), 1);
        assert_eq!(campus.suggestions(), predictions(&["Library"]));
    }

    #[test]
    fn blank_input_clears_without_request() {
        let campus = campus();
        campus.providers().predictions.push(Ok(predictions(&["A"])));
        pollster::block_on(campus.on_input("A"));

        assert_eq!(
            pollster::block_on(campus.on_input(" ")),
            AutocompleteOutcome::Cleared
        );
        assert_eq!(campus.providers().predictions.calls(), 1);
        assert_eq!(campus.surface().last_render(), Some(&Vec::new()));
    }

    #[test]
    fn clicking_suggestion_fills_input() {
        let campus = campus();
        campus
            .providers()
            .predictions
            .push(Ok(predictions(&["Library", "Lab"])));
        pollster::block_on(campus.on_input("L"));

        assert_eq!(campus.on_suggestion_click(1), Some("Lab".to_string()));
        assert_eq!(campus.surface().input, "Lab");
        assert_eq!(campus.on_suggestion_click(5), None);
    }
}
