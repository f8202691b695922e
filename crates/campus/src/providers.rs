use std::future::Future;

use foundation::math::LatLng;

use crate::error::ProviderError;

/// A place returned by text or nearby search.
///
/// `location` is copied from the provider as-is and may be non-finite.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub place_id: Option<String>,
    pub name: String,
    pub location: LatLng,
    pub address: Option<String>,
    pub photo_url: Option<String>,
}

impl Place {
    /// Bare place for a point with nothing but a label.
    pub fn at(location: LatLng, name: impl Into<String>) -> Self {
        Self {
            place_id: None,
            name: name.into(),
            location,
            address: None,
            photo_url: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.place_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub description: String,
    pub place_id: Option<String>,
}

impl Prediction {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            place_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub formatted_address: String,
    pub location: LatLng,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteRequest {
    pub input: String,
    /// ISO 3166-1 alpha-2 country the predictions are restricted to.
    pub country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyRequest {
    pub location: LatLng,
    pub radius_m: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TravelMode {
    Driving,
}

impl TravelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "DRIVING",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: LatLng,
    pub destination: LatLng,
    pub travel_mode: TravelMode,
}

// Each provider call is one request in flight; nothing is cancelled when a
// newer call supersedes it. Callers sequence the responses themselves.

pub trait PlaceSearch {
    fn text_search(&self, query: &str) -> impl Future<Output = Result<Vec<Place>, ProviderError>>;

    fn nearby_search(
        &self,
        request: &NearbyRequest,
    ) -> impl Future<Output = Result<Vec<Place>, ProviderError>>;
}

pub trait Autocomplete {
    fn predictions(
        &self,
        request: &AutocompleteRequest,
    ) -> impl Future<Output = Result<Vec<Prediction>, ProviderError>>;
}

pub trait Geocoder {
    fn reverse_geocode(
        &self,
        at: LatLng,
    ) -> impl Future<Output = Result<Vec<GeocodeResult>, ProviderError>>;
}

pub trait Geolocation {
    /// One-shot position fix.
    fn current_position(&self) -> impl Future<Output = Result<LatLng, ProviderError>>;
}

pub trait Directions {
    /// Provider-specific route handle, passed back to the map for display.
    type Route;

    fn route(
        &self,
        request: &RouteRequest,
    ) -> impl Future<Output = Result<Self::Route, ProviderError>>;
}
