use campus::ProviderError;
use foundation::math::{LatLng, LatLngAltitude};
use js_sys::{Array, Function, JSON, Object, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

pub fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| get_string(err, "message"))
        .unwrap_or_else(|| format!("{err:?}"))
}

/// Object literal for a Maps API call, built from a serde value.
pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue, ProviderError> {
    let text =
        serde_json::to_string(value).map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    JSON::parse(&text).map_err(|e| ProviderError::InvalidResponse(describe(&e)))
}

pub fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

pub fn get_string(target: &JsValue, key: &str) -> Option<String> {
    get(target, key)?.as_string()
}

pub fn get_f64(target: &JsValue, key: &str) -> Option<f64> {
    get(target, key)?.as_f64()
}

fn call_f64(target: &JsValue, method: &str) -> Option<f64> {
    let function: Function = get(target, method)?.dyn_into().ok()?;
    function.call0(target).ok()?.as_f64()
}

/// Reads a `google.maps.LatLng` (or a plain literal). Missing parts come back
/// as NaN so callers can reject the point.
pub fn lat_lng(value: &JsValue) -> LatLng {
    let lat = call_f64(value, "lat").or_else(|| get_f64(value, "lat"));
    let lng = call_f64(value, "lng").or_else(|| get_f64(value, "lng"));
    LatLng::new(lat.unwrap_or(f64::NAN), lng.unwrap_or(f64::NAN))
}

fn literal(entries: &[(&str, f64)]) -> JsValue {
    let object = Object::new();
    for (key, value) in entries {
        let _ = Reflect::set(&object, &JsValue::from_str(key), &JsValue::from_f64(*value));
    }
    object.into()
}

pub fn lat_lng_literal(at: LatLng) -> JsValue {
    literal(&[("lat", at.lat), ("lng", at.lng)])
}

pub fn lat_lng_altitude_literal(at: LatLngAltitude) -> JsValue {
    literal(&[("lat", at.lat), ("lng", at.lng), ("altitude", at.altitude)])
}

pub fn array(value: Option<JsValue>) -> Vec<JsValue> {
    match value {
        Some(value) if Array::is_array(&value) => Array::from(&value).iter().collect(),
        _ => Vec::new(),
    }
}

/// Runs a callback-style Maps service call as a future.
///
/// `invoke` receives the `(result, status)` callback to hand to the service
/// and is called exactly once, synchronously.
pub async fn service_call(
    invoke: impl FnOnce(&Function),
) -> Result<(JsValue, JsValue), ProviderError> {
    let mut invoke = Some(invoke);
    let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
        let callback = Closure::once_into_js(move |result: JsValue, status: JsValue| {
            let _ = resolve.call1(&JsValue::NULL, &Array::of2(&result, &status));
        });
        if let Some(invoke) = invoke.take() {
            invoke(callback.unchecked_ref());
        }
    });
    let pair = JsFuture::from(promise)
        .await
        .map_err(|e| ProviderError::Network(describe(&e)))?;
    let pair = Array::from(&pair);
    Ok((pair.get(0), pair.get(1)))
}
