use campus::{
    Autocomplete, AutocompleteRequest, Directions, GeocodeResult, Geocoder, Geolocation,
    NearbyRequest, Place, PlaceSearch, Prediction, ProviderError, ProviderStatus, RouteRequest,
};
use foundation::math::LatLng;
use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::js::{self, array, get, get_f64, get_string, service_call, to_js};
use crate::maps::{AutocompleteService, DirectionsService, GoogleMap, PlacesService};

const PHOTO_MAX_WIDTH: f64 = 400.0;

#[derive(Serialize)]
struct TextSearchRequest<'a> {
    query: &'a str,
}

#[derive(Serialize)]
struct NearbySearchRequest {
    location: LatLng,
    radius: f64,
}

#[derive(Serialize)]
struct ComponentRestrictions<'a> {
    country: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictionsRequest<'a> {
    input: &'a str,
    component_restrictions: ComponentRestrictions<'a>,
}

#[derive(Serialize)]
struct GeocodeRequest {
    location: LatLng,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DirectionsRequest {
    origin: LatLng,
    destination: LatLng,
    travel_mode: &'static str,
}

fn status(raw: &JsValue) -> ProviderStatus {
    ProviderStatus::parse(&raw.as_string().unwrap_or_default())
}

fn location(result: &JsValue) -> LatLng {
    get(result, "geometry")
        .and_then(|geometry| get(&geometry, "location"))
        .map(|at| js::lat_lng(&at))
        .unwrap_or(LatLng::new(f64::NAN, f64::NAN))
}

fn photo_url(result: &JsValue) -> Option<String> {
    let photo = array(get(result, "photos")).into_iter().next()?;
    let get_url: Function = get(&photo, "getUrl")?.dyn_into().ok()?;
    let options = Object::new();
    let _ = Reflect::set(
        &options,
        &"maxWidth".into(),
        &JsValue::from_f64(PHOTO_MAX_WIDTH),
    );
    get_url.call1(&photo, &options).ok()?.as_string()
}

fn place(result: &JsValue) -> Place {
    Place {
        place_id: get_string(result, "place_id"),
        name: get_string(result, "name").unwrap_or_default(),
        location: location(result),
        address: get_string(result, "formatted_address").or_else(|| get_string(result, "vicinity")),
        photo_url: photo_url(result),
    }
}

fn places(results: &JsValue, raw_status: &JsValue) -> Result<Vec<Place>, ProviderError> {
    ProviderError::check(status(raw_status))?;
    Ok(array(Some(results.clone())).iter().map(place).collect())
}

/// Google place, geocoding and directions services plus browser geolocation.
pub struct WebProviders {
    places: PlacesService,
    autocomplete: AutocompleteService,
    geocoder: crate::maps::Geocoder,
    directions: DirectionsService,
}

impl WebProviders {
    pub fn new(map: &GoogleMap) -> Self {
        Self {
            places: PlacesService::new(map),
            autocomplete: AutocompleteService::new(),
            geocoder: crate::maps::Geocoder::new(),
            directions: DirectionsService::new(),
        }
    }
}

impl PlaceSearch for WebProviders {
    async fn text_search(&self, query: &str) -> Result<Vec<Place>, ProviderError> {
        let request = to_js(&TextSearchRequest { query })?;
        let (results, raw_status) =
            service_call(|callback| self.places.text_search(&request, callback)).await?;
        places(&results, &raw_status)
    }

    async fn nearby_search(&self, request: &NearbyRequest) -> Result<Vec<Place>, ProviderError> {
        let request = to_js(&NearbySearchRequest {
            location: request.location,
            radius: request.radius_m,
        })?;
        let (results, raw_status) =
            service_call(|callback| self.places.nearby_search(&request, callback)).await?;
        places(&results, &raw_status)
    }
}

impl Autocomplete for WebProviders {
    async fn predictions(
        &self,
        request: &AutocompleteRequest,
    ) -> Result<Vec<Prediction>, ProviderError> {
        let request = to_js(&PredictionsRequest {
            input: &request.input,
            component_restrictions: ComponentRestrictions {
                country: &request.country,
            },
        })?;
        let (results, raw_status) = service_call(|callback| {
            self.autocomplete.get_place_predictions(&request, callback)
        })
        .await?;
        ProviderError::check(status(&raw_status))?;
        Ok(array(Some(results))
            .iter()
            .map(|p| Prediction {
                description: get_string(p, "description").unwrap_or_default(),
                place_id: get_string(p, "place_id"),
            })
            .collect())
    }
}

impl Geocoder for WebProviders {
    async fn reverse_geocode(&self, at: LatLng) -> Result<Vec<GeocodeResult>, ProviderError> {
        let request = to_js(&GeocodeRequest { location: at })?;
        let (results, raw_status) =
            service_call(|callback| self.geocoder.geocode(&request, callback)).await?;
        ProviderError::check(status(&raw_status))?;
        Ok(array(Some(results))
            .iter()
            .map(|r| GeocodeResult {
                formatted_address: get_string(r, "formatted_address").unwrap_or_default(),
                location: location(r),
            })
            .collect())
    }
}

impl Geolocation for WebProviders {
    async fn current_position(&self) -> Result<LatLng, ProviderError> {
        let navigator = web_sys::window()
            .ok_or(ProviderError::Unsupported)?
            .navigator();
        let geolocation = get(&navigator, "geolocation").ok_or(ProviderError::Unsupported)?;
        let get_position: Function = get(&geolocation, "getCurrentPosition")
            .and_then(|f| f.dyn_into().ok())
            .ok_or(ProviderError::Unsupported)?;

        let promise = Promise::new(&mut |resolve: Function, reject: Function| {
            let _ = get_position.call2(&geolocation, &resolve, &reject);
        });
        match JsFuture::from(promise).await {
            Ok(position) => {
                let coords = get(&position, "coords")
                    .ok_or_else(|| ProviderError::InvalidResponse("position without coords".into()))?;
                let at = LatLng::new(
                    get_f64(&coords, "latitude").unwrap_or(f64::NAN),
                    get_f64(&coords, "longitude").unwrap_or(f64::NAN),
                );
                if at.is_finite() {
                    Ok(at)
                } else {
                    Err(ProviderError::InvalidResponse("non-finite position".into()))
                }
            }
            // GeolocationPositionError codes.
            Err(err) => Err(match get_f64(&err, "code").map(|code| code as u32) {
                Some(1) => ProviderError::PermissionDenied,
                Some(3) => ProviderError::Timeout,
                _ => ProviderError::Unavailable,
            }),
        }
    }
}

impl Directions for WebProviders {
    type Route = JsValue;

    async fn route(&self, request: &RouteRequest) -> Result<JsValue, ProviderError> {
        let request = to_js(&DirectionsRequest {
            origin: request.origin,
            destination: request.destination,
            travel_mode: request.travel_mode.as_str(),
        })?;
        let (result, raw_status) =
            service_call(|callback| self.directions.route(&request, callback)).await?;
        ProviderError::check(status(&raw_status))?;
        Ok(result)
    }
}
