use std::cell::RefCell;
use std::rc::Rc;

use campus::{Campus, CampusConfig, PanelAction, SearchBox, SearchOutcome};
use console_error_panic_hook::set_once;
use foundation::math::{LatLng, LatLngAltitude};
use gloo_net::http::Request;
use js_sys::{Float64Array, Promise};
use overlay::{DrawOutcome, OverlayHost, OverlayRenderer, Transformer};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};

mod js;
mod maps;
mod providers;
mod surface;
mod three;

use maps::{CoordinateTransformer, GoogleMap, WebGLOverlayView};
use providers::WebProviders;
use surface::WebSurface;
use three::ThreeBackend;

const MAP_CONTAINER_ID: &str = "map";
const MAPS_SCRIPT_URL: &str = "https://maps.googleapis.com/maps/api/js";

/// Browser events, queued onto the event loop and handled one at a time.
#[derive(Debug, Clone)]
pub(crate) enum UiEvent {
    Input(String),
    SuggestionClicked(usize),
    Submit,
    MarkerClicked(u32),
    Action(PanelAction),
    MapClicked(LatLng),
}

type WebCampus = Campus<WebSurface, WebProviders>;

struct App {
    campus: WebCampus,
    map: GoogleMap,
    overlay: RefCell<OverlayRenderer<ThreeBackend>>,
    overlay_view: WebGLOverlayView,
}

thread_local! {
    static APP: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

fn running_app() -> Option<Rc<App>> {
    APP.with(|slot| slot.borrow().clone())
}

/// Hands an event to the app on a fresh task so no borrow taken by the
/// caller is still live when the handler runs.
pub(crate) fn dispatch(event: UiEvent) {
    spawn_local(async move {
        match running_app() {
            Some(app) => app.handle(event).await,
            None => debug!("event before startup finished: {event:?}"),
        }
    });
}

impl App {
    async fn handle(&self, event: UiEvent) {
        match event {
            UiEvent::Input(text) => {
                self.campus.on_input(&text).await;
            }
            UiEvent::SuggestionClicked(index) => {
                self.campus.on_suggestion_click(index);
            }
            UiEvent::Submit => {
                let term = self.campus.surface().input_value();
                if let SearchOutcome::Found(place) = self.campus.submit_search(&term).await {
                    if self
                        .overlay
                        .borrow_mut()
                        .add_search_highlight(place.location)
                        .is_some()
                    {
                        self.overlay_view.request_redraw();
                    }
                }
            }
            UiEvent::MarkerClicked(key) => match self.campus.find_building(|m| m.key() == key) {
                Some(index) => {
                    self.campus.on_building_click(index);
                }
                None => {
                    self.campus.on_marker_click().await;
                }
            },
            UiEvent::Action(action) => {
                self.campus.handle_action(&action).await;
            }
            UiEvent::MapClicked(at) => {
                self.campus.on_map_click(at).await;
            }
        }
    }
}

struct MapTransformer<'a>(&'a CoordinateTransformer);

impl Transformer for MapTransformer<'_> {
    fn from_lat_lng_altitude(&self, at: LatLngAltitude) -> Vec<f64> {
        let matrix = self.0.from_lat_lng_altitude(&js::lat_lng_altitude_literal(at));
        Float64Array::new(&matrix).to_vec()
    }
}

impl OverlayHost for WebGLOverlayView {
    fn request_redraw(&self) {
        WebGLOverlayView::request_redraw(self);
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapLiteral<'a> {
    center: LatLng,
    zoom: f64,
    tilt: f64,
    heading: f64,
    map_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyResponse {
    api_key: String,
}

async fn fetch_text(url: &str) -> Result<String, JsValue> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("{url} returned {}", resp.status())));
    }
    resp.text()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

async fn fetch_config(url: Option<String>) -> CampusConfig {
    let Some(url) = url else {
        return CampusConfig::default();
    };
    let raw = match fetch_text(&url).await {
        Ok(raw) => raw,
        Err(err) => {
            warn!("config {url} unavailable, using defaults: {}", js::describe(&err));
            return CampusConfig::default();
        }
    };
    CampusConfig::from_json(&raw).unwrap_or_else(|err| {
        warn!("config {url} rejected, using defaults: {err}");
        CampusConfig::default()
    })
}

async fn fetch_api_key(endpoint: &str) -> Result<String, JsValue> {
    let text = fetch_text(endpoint).await?;
    let key: KeyResponse =
        serde_json::from_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(key.api_key)
}

/// Injects the Maps script tag and resolves once it has loaded.
async fn load_maps_api(document: &web_sys::Document, api_key: &str) -> Result<(), JsValue> {
    let script: web_sys::HtmlScriptElement = document.create_element("script")?.dyn_into()?;
    script.set_src(&format!(
        "{MAPS_SCRIPT_URL}?key={}&v=weekly&libraries=places",
        campus::viewer::encode_component(api_key)
    ));
    script.set_async(true);

    let loaded = Promise::new(&mut |resolve, reject| {
        script.set_onload(Some(&resolve));
        script.set_onerror(Some(&reject));
    });
    document
        .head()
        .ok_or_else(|| JsValue::from_str("document has no head"))?
        .append_child(&script)?;
    JsFuture::from(loaded).await?;
    Ok(())
}

fn install_overlay(app: &App) {
    let on_add = Closure::<dyn FnMut()>::new(|| {
        if let Some(app) = running_app() {
            app.overlay.borrow_mut().on_add();
        }
    });
    let on_context_restored = Closure::<dyn FnMut(JsValue)>::new(|options: JsValue| {
        let Some(app) = running_app() else {
            return;
        };
        match js::get(&options, "gl") {
            Some(gl) => app
                .overlay
                .borrow_mut()
                .on_context_restored(ThreeBackend::from_gl(&gl)),
            None => warn!("overlay context restored without a GL context"),
        }
    });
    let on_draw = Closure::<dyn FnMut(JsValue)>::new(|options: JsValue| {
        let Some(app) = running_app() else {
            return;
        };
        let Some(transformer) = js::get(&options, "transformer") else {
            return;
        };
        let transformer = MapTransformer(transformer.unchecked_ref());
        let center = js::lat_lng(&app.map.get_center());
        let outcome = app
            .overlay
            .borrow_mut()
            .on_draw(center, &transformer, &app.overlay_view);
        if outcome == DrawOutcome::Skipped {
            debug!("overlay frame skipped");
        }
    });

    // The hooks live as long as the page.
    let view = &app.overlay_view;
    view.set_on_add(on_add.into_js_value().unchecked_ref());
    view.set_on_context_restored(on_context_restored.into_js_value().unchecked_ref());
    view.set_on_draw(on_draw.into_js_value().unchecked_ref());
    view.set_map(&app.map);
}

async fn boot(config_url: Option<String>) -> Result<(), JsValue> {
    let config = fetch_config(config_url).await;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let api_key = fetch_api_key(&config.key_endpoint).await?;
    load_maps_api(&document, &api_key).await?;

    let container: web_sys::HtmlElement = document
        .get_element_by_id(MAP_CONTAINER_ID)
        .ok_or_else(|| JsValue::from_str("map container missing"))?
        .dyn_into()?;
    let map_options = js::to_js(&MapLiteral {
        center: config.map.center,
        zoom: config.map.zoom,
        tilt: config.map.tilt,
        heading: config.map.heading,
        map_id: &config.map.map_id,
    })
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let map = GoogleMap::new(&container, &map_options);

    let surface = WebSurface::mount(map.clone(), document)?;
    let providers = WebProviders::new(&map);
    let overlay = OverlayRenderer::new(config.overlay.clone());

    let app = Rc::new(App {
        campus: Campus::new(config, surface, providers),
        map,
        overlay: RefCell::new(overlay),
        overlay_view: WebGLOverlayView::new(),
    });
    APP.with(|slot| *slot.borrow_mut() = Some(app.clone()));

    app.campus.install_buildings();
    install_overlay(&app);
    info!("campus map ready");
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    tracing_wasm::set_as_global_default();
    Ok(())
}

/// Boots the map. `config_url` optionally points at a JSON campus config.
#[wasm_bindgen]
pub fn init_campus(config_url: Option<String>) {
    spawn_local(async move {
        if let Err(err) = boot(config_url).await {
            error!("campus map failed to start: {}", js::describe(&err));
        }
    });
}
