//! Bindings to the parts of the Google Maps JavaScript API the app uses.
//!
//! The API is loaded by a script tag at runtime (see `lib.rs`), so nothing
//! here may be called before that script has finished loading.

use js_sys::Function;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Clone)]
    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = Map)]
    pub type GoogleMap;

    #[wasm_bindgen(constructor, js_namespace = ["google", "maps"], js_class = "Map")]
    pub fn new(container: &web_sys::HtmlElement, options: &JsValue) -> GoogleMap;

    #[wasm_bindgen(method, js_name = getCenter)]
    pub fn get_center(this: &GoogleMap) -> JsValue;

    #[wasm_bindgen(method, js_name = setCenter)]
    pub fn set_center(this: &GoogleMap, center: &JsValue);

    #[wasm_bindgen(method, js_name = getZoom)]
    pub fn get_zoom(this: &GoogleMap) -> Option<f64>;

    #[wasm_bindgen(method, js_name = setZoom)]
    pub fn set_zoom(this: &GoogleMap, zoom: f64);

    #[wasm_bindgen(method, js_name = getTilt)]
    pub fn get_tilt(this: &GoogleMap) -> Option<f64>;

    #[wasm_bindgen(method, js_name = getHeading)]
    pub fn get_heading(this: &GoogleMap) -> Option<f64>;

    #[wasm_bindgen(method, js_name = getDiv)]
    pub fn get_div(this: &GoogleMap) -> web_sys::HtmlElement;

    #[wasm_bindgen(method, js_name = addListener)]
    pub fn add_listener(this: &GoogleMap, event: &str, handler: &Function) -> MapsEventListener;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = MapsEventListener)]
    pub type MapsEventListener;

    #[wasm_bindgen(method)]
    pub fn remove(this: &MapsEventListener);
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = Marker)]
    pub type Marker;

    #[wasm_bindgen(constructor, js_namespace = ["google", "maps"], js_class = "Marker")]
    pub fn new(options: &JsValue) -> Marker;

    #[wasm_bindgen(method, js_name = setMap)]
    pub fn set_map(this: &Marker, map: Option<&GoogleMap>);

    #[wasm_bindgen(method, js_name = addListener)]
    pub fn add_listener(this: &Marker, event: &str, handler: &Function) -> MapsEventListener;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = InfoWindow)]
    pub type InfoWindow;

    #[wasm_bindgen(constructor, js_namespace = ["google", "maps"], js_class = "InfoWindow")]
    pub fn new(options: &JsValue) -> InfoWindow;

    #[wasm_bindgen(method, js_name = setContent)]
    pub fn set_content(this: &InfoWindow, content: &web_sys::Node);

    /// `options` is `{ anchor, map }`.
    #[wasm_bindgen(method)]
    pub fn open(this: &InfoWindow, options: &JsValue);

    #[wasm_bindgen(method)]
    pub fn close(this: &InfoWindow);
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = WebGLOverlayView)]
    pub type WebGLOverlayView;

    #[wasm_bindgen(constructor, js_namespace = ["google", "maps"], js_class = "WebGLOverlayView")]
    pub fn new() -> WebGLOverlayView;

    #[wasm_bindgen(method, setter = onAdd)]
    pub fn set_on_add(this: &WebGLOverlayView, hook: &Function);

    #[wasm_bindgen(method, setter = onContextRestored)]
    pub fn set_on_context_restored(this: &WebGLOverlayView, hook: &Function);

    #[wasm_bindgen(method, setter = onDraw)]
    pub fn set_on_draw(this: &WebGLOverlayView, hook: &Function);

    #[wasm_bindgen(method, js_name = setMap)]
    pub fn set_map(this: &WebGLOverlayView, map: &GoogleMap);

    #[wasm_bindgen(method, js_name = requestRedraw)]
    pub fn request_redraw(this: &WebGLOverlayView);
}

#[wasm_bindgen]
extern "C" {
    /// The `transformer` handed to `onDraw`; only valid during that call.
    pub type CoordinateTransformer;

    #[wasm_bindgen(method, js_name = fromLatLngAltitude)]
    pub fn from_lat_lng_altitude(this: &CoordinateTransformer, at: &JsValue) -> JsValue;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["google", "maps", "places"], js_name = PlacesService)]
    pub type PlacesService;

    #[wasm_bindgen(constructor, js_namespace = ["google", "maps", "places"], js_class = "PlacesService")]
    pub fn new(map: &GoogleMap) -> PlacesService;

    #[wasm_bindgen(method, js_name = textSearch)]
    pub fn text_search(this: &PlacesService, request: &JsValue, callback: &Function);

    #[wasm_bindgen(method, js_name = nearbySearch)]
    pub fn nearby_search(this: &PlacesService, request: &JsValue, callback: &Function);

    #[wasm_bindgen(js_namespace = ["google", "maps", "places"], js_name = AutocompleteService)]
    pub type AutocompleteService;

    #[wasm_bindgen(constructor, js_namespace = ["google", "maps", "places"], js_class = "AutocompleteService")]
    pub fn new() -> AutocompleteService;

    #[wasm_bindgen(method, js_name = getPlacePredictions)]
    pub fn get_place_predictions(this: &AutocompleteService, request: &JsValue, callback: &Function);
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = Geocoder)]
    pub type Geocoder;

    #[wasm_bindgen(constructor, js_namespace = ["google", "maps"], js_class = "Geocoder")]
    pub fn new() -> Geocoder;

    #[wasm_bindgen(method)]
    pub fn geocode(this: &Geocoder, request: &JsValue, callback: &Function);

    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = DirectionsService)]
    pub type DirectionsService;

    #[wasm_bindgen(constructor, js_namespace = ["google", "maps"], js_class = "DirectionsService")]
    pub fn new() -> DirectionsService;

    #[wasm_bindgen(method)]
    pub fn route(this: &DirectionsService, request: &JsValue, callback: &Function);

    #[wasm_bindgen(js_namespace = ["google", "maps"], js_name = DirectionsRenderer)]
    pub type DirectionsRenderer;

    #[wasm_bindgen(constructor, js_namespace = ["google", "maps"], js_class = "DirectionsRenderer")]
    pub fn new() -> DirectionsRenderer;

    #[wasm_bindgen(method, js_name = setMap)]
    pub fn set_map(this: &DirectionsRenderer, map: Option<&GoogleMap>);

    #[wasm_bindgen(method, js_name = setDirections)]
    pub fn set_directions(this: &DirectionsRenderer, result: &JsValue);
}
