#![cfg(target_arch = "wasm32")]
//! Browser tests for the JavaScript listener bindings
//!
//! Window events are synthesized with `dispatchEvent`; the JS callback
//! collects the action objects it receives.

use core_runtime::wasm::{
    on_focus_js, on_focus_lost_js, on_offline_js, on_online_js, JsListenerBridge,
};
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn fire(event: &str) {
    let window = web_sys::window().unwrap();
    let event = web_sys::Event::new(event).unwrap();
    window.dispatch_event(&event).unwrap();
}

fn action_type(value: &JsValue) -> String {
    Reflect::get(value, &JsValue::from_str("type"))
        .unwrap()
        .as_string()
        .unwrap()
}

/// JS function that appends every argument it receives to `seen`.
fn collector(seen: &Array) -> (Closure<dyn Fn(JsValue)>, Function) {
    let sink = seen.clone();
    let closure = Closure::<dyn Fn(JsValue)>::new(move |action: JsValue| {
        sink.push(&action);
    });
    let function = closure.as_ref().unchecked_ref::<Function>().clone();
    (closure, function)
}

fn received(seen: &Array) -> Vec<String> {
    seen.iter().map(|value| action_type(&value)).collect()
}

#[wasm_bindgen_test]
fn test_action_creators_return_plain_objects() {
    assert_eq!(action_type(&on_focus_js().unwrap()), "__rtkq/focused");
    assert_eq!(action_type(&on_focus_lost_js().unwrap()), "__rtkq/unfocused");
    assert_eq!(action_type(&on_online_js().unwrap()), "__rtkq/online");
    assert_eq!(action_type(&on_offline_js().unwrap()), "__rtkq/offline");
}

#[wasm_bindgen_test]
fn test_setup_forwards_window_events() {
    let seen = Array::new();
    let (_closure, dispatch) = collector(&seen);
    let bridge = JsListenerBridge::new();

    let handle = bridge.setup(dispatch);
    assert!(handle.did_attach());
    assert!(bridge.is_active());

    fire("online");
    fire("offline");
    fire("focus");
    assert_eq!(
        received(&seen),
        vec!["__rtkq/online", "__rtkq/offline", "__rtkq/focused"]
    );

    handle.unsubscribe();
    handle.unsubscribe();
    assert!(!bridge.is_active());

    fire("online");
    assert_eq!(seen.length(), 3);
}

#[wasm_bindgen_test]
fn test_second_setup_does_not_double_dispatch() {
    let seen = Array::new();
    let (_closure, dispatch) = collector(&seen);
    let bridge = JsListenerBridge::new();

    let first = bridge.setup(dispatch.clone());
    let second = bridge.setup(dispatch);
    assert!(first.did_attach());
    assert!(!second.did_attach());

    fire("offline");
    assert_eq!(received(&seen), vec!["__rtkq/offline"]);

    second.unsubscribe();
    assert!(!bridge.is_active());
}

#[wasm_bindgen_test]
fn test_with_events_limits_registration() {
    let seen = Array::new();
    let (_closure, dispatch) = collector(&seen);
    let bridge = JsListenerBridge::with_events(false, true);

    let handle = bridge.setup(dispatch);
    fire("focus");
    fire("visibilitychange");
    fire("offline");
    assert_eq!(received(&seen), vec!["__rtkq/offline"]);

    handle.unsubscribe();
}

#[wasm_bindgen_test]
fn test_throwing_dispatch_is_contained() {
    let bridge = JsListenerBridge::new();
    let dispatch = Function::new_with_args("action", "throw new Error('store rejected ' + action.type)");

    let handle = bridge.setup(dispatch);
    fire("online");

    assert!(bridge.is_active());
    handle.unsubscribe();
    assert!(!bridge.is_active());
}
