use campus::{MapSurface, MarkerSpec, PanelAction, PanelContent, Prediction, SearchBox, ViewportState};
use foundation::math::{LatLng, Vec2};
use js_sys::{Object, Reflect};
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, HtmlInputElement};

use crate::js;
use crate::maps::{DirectionsRenderer, GoogleMap, InfoWindow, MapsEventListener, Marker};
use crate::{UiEvent, dispatch};

pub struct MapMarker {
    key: u32,
    marker: Marker,
    click: MapsEventListener,
    _handler: Closure<dyn FnMut()>,
}

impl MapMarker {
    pub fn key(&self) -> u32 {
        self.key
    }
}

pub struct MapPanel {
    window: InfoWindow,
    buttons: Vec<(PanelAction, HtmlElement)>,
}

pub struct ActionListener {
    button: Option<HtmlElement>,
    handler: Closure<dyn FnMut()>,
}

/// The Google map plus the search form laid over it.
pub struct WebSurface {
    map: GoogleMap,
    document: Document,
    input: HtmlInputElement,
    dropdown: HtmlElement,
    directions: DirectionsRenderer,
    next_marker: u32,
    suggestion_handlers: Vec<Closure<dyn FnMut()>>,
    _form_handlers: Vec<Closure<dyn FnMut(web_sys::Event)>>,
    _map_click: Closure<dyn FnMut(JsValue)>,
}

fn element(document: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    document.create_element(tag)?.dyn_into::<HtmlElement>().map_err(JsValue::from)
}

fn set_styles(target: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = target.style();
    for (name, value) in styles {
        style.set_property(name, value)?;
    }
    Ok(())
}

impl WebSurface {
    /// Builds the search form over the map and wires its events. The submit
    /// handler is attached here and nowhere else.
    pub fn mount(map: GoogleMap, document: Document) -> Result<Self, JsValue> {
        let form = element(&document, "form")?;
        set_styles(&form, &[("position", "absolute"), ("top", "10px"), ("left", "10px")])?;

        let input: HtmlInputElement = document.create_element("input")?.dyn_into()?;
        input.set_type("text");
        input.set_id("search-input");

        let button = element(&document, "button")?;
        button.set_attribute("type", "submit")?;
        button.set_text_content(Some("Search"));

        let dropdown = element(&document, "div")?;
        dropdown.set_class_name("suggestions-container");
        set_styles(
            &dropdown,
            &[
                ("position", "absolute"),
                ("background-color", "#FFFFFF"),
                ("border", "1px solid #CCCCCC"),
                ("border-radius", "4px"),
                ("padding", "8px"),
            ],
        )?;

        form.append_child(&input)?;
        form.append_child(&button)?;
        form.append_child(&dropdown)?;
        map.get_div().append_child(&form)?;

        let on_submit = Closure::<dyn FnMut(web_sys::Event)>::new(|event: web_sys::Event| {
            event.prevent_default();
            dispatch(UiEvent::Submit);
        });
        form.add_event_listener_with_callback("submit", on_submit.as_ref().unchecked_ref())?;

        let typed = input.clone();
        let on_input = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            dispatch(UiEvent::Input(typed.value()));
        });
        input.add_event_listener_with_callback("input", on_input.as_ref().unchecked_ref())?;

        let map_click = Closure::<dyn FnMut(JsValue)>::new(|event: JsValue| {
            if let Some(at) = js::get(&event, "latLng") {
                dispatch(UiEvent::MapClicked(js::lat_lng(&at)));
            }
        });
        map.add_listener("click", map_click.as_ref().unchecked_ref());

        let directions = DirectionsRenderer::new();

        Ok(Self {
            map,
            document,
            input,
            dropdown,
            directions,
            next_marker: 0,
            suggestion_handlers: Vec::new(),
            _form_handlers: vec![on_submit, on_input],
            _map_click: map_click,
        })
    }

    fn append_suggestion(
        &self,
        description: &str,
        last: bool,
        handler: &Closure<dyn FnMut()>,
    ) -> Result<(), JsValue> {
        let item = element(&self.document, "div")?;
        item.set_text_content(Some(description));
        item.set_class_name("suggestion-item");
        if !last {
            set_styles(&item, &[("border-bottom", "1px solid #000000")])?;
        }
        set_styles(&item, &[("cursor", "pointer")])?;
        item.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())?;
        self.dropdown.append_child(&item)?;
        Ok(())
    }

    fn build_panel(
        &self,
        content: &PanelContent,
    ) -> Result<(HtmlElement, Vec<(PanelAction, HtmlElement)>), JsValue> {
        let root = element(&self.document, "div")?;

        let photo = element(&self.document, "img")?;
        photo.set_attribute("src", &content.photo_url)?;
        photo.set_attribute("alt", &content.title)?;
        set_styles(&photo, &[("max-width", "200px")])?;
        root.append_child(&photo)?;

        let title = element(&self.document, "h3")?;
        title.set_text_content(Some(&content.title));
        root.append_child(&title)?;

        if let Some(subtitle) = &content.subtitle {
            let node = element(&self.document, "h4")?;
            node.set_text_content(Some(subtitle));
            root.append_child(&node)?;
        }
        for line in &content.lines {
            let node = element(&self.document, "p")?;
            node.set_text_content(Some(line));
            root.append_child(&node)?;
        }

        let mut buttons = Vec::with_capacity(content.actions.len());
        for action in &content.actions {
            let button = element(&self.document, "button")?;
            button.set_text_content(Some(&action.label()));
            root.append_child(&button)?;
            buttons.push((action.clone(), button));
        }
        Ok((root, buttons))
    }
}

impl MapSurface for WebSurface {
    type Marker = MapMarker;
    type Panel = MapPanel;
    type Listener = ActionListener;
    type Route = JsValue;

    fn viewport(&self) -> ViewportState {
        ViewportState {
            center: js::lat_lng(&self.map.get_center()),
            zoom: self.map.get_zoom().unwrap_or(f64::NAN),
            tilt: self.map.get_tilt().unwrap_or(0.0),
            heading: self.map.get_heading().unwrap_or(0.0),
        }
    }

    fn set_center(&mut self, center: LatLng) {
        self.map.set_center(&js::lat_lng_literal(center));
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.map.set_zoom(zoom);
    }

    fn add_marker(&mut self, spec: &MarkerSpec) -> MapMarker {
        self.next_marker += 1;
        let key = self.next_marker;

        let options = Object::new();
        let _ = Reflect::set(&options, &"position".into(), &js::lat_lng_literal(spec.position));
        let _ = Reflect::set(&options, &"map".into(), &self.map);
        let _ = Reflect::set(&options, &"title".into(), &JsValue::from_str(&spec.title));
        if let Some(icon) = &spec.icon_url {
            let _ = Reflect::set(&options, &"icon".into(), &JsValue::from_str(icon));
        }
        let marker = Marker::new(&options);

        let handler = Closure::<dyn FnMut()>::new(move || dispatch(UiEvent::MarkerClicked(key)));
        let click = marker.add_listener("click", handler.as_ref().unchecked_ref());
        MapMarker {
            key,
            marker,
            click,
            _handler: handler,
        }
    }

    fn remove_marker(&mut self, marker: MapMarker) {
        marker.click.remove();
        marker.marker.set_map(None);
    }

    fn open_panel(&mut self, content: &PanelContent, anchor: &MapMarker) -> MapPanel {
        let window = InfoWindow::new(&Object::new());
        let buttons = match self.build_panel(content) {
            Ok((root, buttons)) => {
                window.set_content(&root);
                buttons
            }
            Err(err) => {
                warn!("building info panel failed: {}", js::describe(&err));
                Vec::new()
            }
        };

        let options = Object::new();
        let _ = Reflect::set(&options, &"anchor".into(), &anchor.marker);
        let _ = Reflect::set(&options, &"map".into(), &self.map);
        window.open(&options);
        MapPanel { window, buttons }
    }

    fn close_panel(&mut self, panel: MapPanel) {
        panel.window.close();
    }

    fn bind_action(&mut self, panel: &MapPanel, action: &PanelAction) -> ActionListener {
        let dispatched = action.clone();
        let handler =
            Closure::<dyn FnMut()>::new(move || dispatch(UiEvent::Action(dispatched.clone())));
        let button = panel
            .buttons
            .iter()
            .find(|(candidate, _)| candidate == action)
            .map(|(_, button)| button.clone());
        if let Some(button) = &button {
            if let Err(err) =
                button.add_event_listener_with_callback("click", handler.as_ref().unchecked_ref())
            {
                warn!("binding '{}' failed: {}", action.label(), js::describe(&err));
            }
        }
        ActionListener { button, handler }
    }

    fn unbind_action(&mut self, listener: ActionListener) {
        if let Some(button) = &listener.button {
            if let Err(err) = button
                .remove_event_listener_with_callback("click", listener.handler.as_ref().unchecked_ref())
            {
                warn!("unbinding panel button failed: {}", js::describe(&err));
            }
        }
    }

    fn show_route(&mut self, route: &JsValue) {
        self.directions.set_map(Some(&self.map));
        self.directions.set_directions(route);
    }

    fn clear_route(&mut self) {
        self.directions.set_map(None);
    }

    fn open_url(&mut self, url: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.open_with_url_and_target(url, "_blank") {
            warn!("opening {url} failed: {}", js::describe(&err));
        }
    }
}

impl SearchBox for WebSurface {
    fn input_value(&self) -> String {
        self.input.value()
    }

    fn set_input_value(&mut self, value: &str) {
        self.input.set_value(value);
    }

    fn dropdown_anchor(&self) -> Vec2 {
        let rect = self.input.get_bounding_client_rect();
        let (scroll_x, scroll_y) = web_sys::window()
            .map(|w| (w.scroll_x().unwrap_or(0.0), w.scroll_y().unwrap_or(0.0)))
            .unwrap_or((0.0, 0.0));
        Vec2::new(rect.left() + scroll_x, rect.bottom() + scroll_y)
    }

    fn render_suggestions(&mut self, anchor: Vec2, suggestions: &[Prediction]) {
        // Old items leave the DOM with their handlers.
        self.dropdown.set_inner_html("");
        self.suggestion_handlers.clear();

        let top = format!("{}px", anchor.y);
        let left = format!("{}px", anchor.x);
        if let Err(err) = set_styles(&self.dropdown, &[("top", top.as_str()), ("left", left.as_str())]) {
            warn!("positioning suggestions failed: {}", js::describe(&err));
        }

        let count = suggestions.len();
        for (index, prediction) in suggestions.iter().enumerate() {
            let handler =
                Closure::<dyn FnMut()>::new(move || dispatch(UiEvent::SuggestionClicked(index)));
            let last = index + 1 == count;
            if let Err(err) = self.append_suggestion(&prediction.description, last, &handler) {
                warn!("adding suggestion failed: {}", js::describe(&err));
                return;
            }
            self.suggestion_handlers.push(handler);
        }
    }
}
