use std::cell::{Ref, RefCell};

use foundation::ids::{Id, IdAllocator};
use foundation::math::LatLng;

use crate::config::CampusConfig;
use crate::state::AppState;
use crate::surface::{MapSurface, ViewportState};

/// Issue order of the in-flight requests of each workflow.
///
/// A response is applied only if its request is still the newest of its
/// kind (autocomplete uses its own, looser rule in `search`).
#[derive(Debug, Default)]
pub(crate) struct Sequencer {
    pub(crate) search: IdAllocator,
    pub(crate) map_click: IdAllocator,
    pub(crate) route: IdAllocator,
}

#[derive(Debug, Default)]
pub(crate) struct SuggestionState {
    pub(crate) issued: IdAllocator,
    pub(crate) last_rendered: Option<Id>,
    pub(crate) suggestions: Vec<crate::providers::Prediction>,
}

/// Single owner of the campus map workflow.
///
/// All event handlers take `&self`; state lives in `RefCell`s and no borrow
/// is held across an `.await`, so an `Rc<Campus>` can serve overlapping
/// browser events on one thread.
pub struct Campus<M: MapSurface, P> {
    pub(crate) config: CampusConfig,
    pub(crate) surface: RefCell<M>,
    pub(crate) state: RefCell<AppState<M>>,
    pub(crate) providers: P,
    pub(crate) building_markers: RefCell<Vec<M::Marker>>,
    pub(crate) suggestions: RefCell<SuggestionState>,
    pub(crate) sequencer: RefCell<Sequencer>,
}

impl<M: MapSurface, P> Campus<M, P> {
    pub fn new(config: CampusConfig, surface: M, providers: P) -> Self {
        Self {
            config,
            surface: RefCell::new(surface),
            state: RefCell::new(AppState::new()),
            providers,
            building_markers: RefCell::new(Vec::new()),
            suggestions: RefCell::new(SuggestionState::default()),
            sequencer: RefCell::new(Sequencer::default()),
        }
    }

    pub fn config(&self) -> &CampusConfig {
        &self.config
    }

    pub fn providers(&self) -> &P {
        &self.providers
    }

    pub fn surface(&self) -> Ref<'_, M> {
        self.surface.borrow()
    }

    pub fn state(&self) -> Ref<'_, AppState<M>> {
        self.state.borrow()
    }

    pub fn viewport(&self) -> ViewportState {
        self.surface.borrow().viewport()
    }

    pub fn destination(&self) -> Option<LatLng> {
        self.state.borrow().destination()
    }

    /// Index of the building whose marker satisfies `matches`.
    pub fn find_building(&self, matches: impl Fn(&M::Marker) -> bool) -> Option<usize> {
        self.building_markers.borrow().iter().position(matches)
    }
}
