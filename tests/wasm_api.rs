#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use breakout_chart_wasm::domain::animation::{FrameRequest, FrameScheduler};
use breakout_chart_wasm::infrastructure::BrowserFrameScheduler;
use breakout_chart_wasm::presentation::RevealChartApi;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const BEFORE: &str = r#"[
    {"open": 10, "high": 11, "low": 9, "close": 10.5, "volume": 3},
    {"Open": "10.5", "High": 12, "Low": 10, "Close": 11, "vol": 4}
]"#;

fn frame_sink() -> (js_sys::Function, Rc<RefCell<Vec<String>>>) {
    let frames = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&frames);
    let closure = Closure::<dyn FnMut(JsValue)>::new(move |frame: JsValue| {
        sink.borrow_mut().push(frame.as_string().unwrap_or_default());
    });
    let function = closure.as_ref().unchecked_ref::<js_sys::Function>().clone();
    closure.forget();
    (function, frames)
}

#[wasm_bindgen_test]
fn api_emits_json_frames() {
    let (on_frame, frames) = frame_sink();
    let api = RevealChartApi::new("{}", 800.0, 400.0, on_frame).unwrap();

    api.load_round(BEFORE).unwrap();
    api.set_after("[]").unwrap();

    let frames = frames.borrow();
    assert_eq!(frames.len(), 2);
    assert!(frames[0].contains("\"status\":\"frame\""));
    assert_eq!(api.phase(), "complete");
}

#[wasm_bindgen_test]
fn api_rejects_bad_config() {
    let (on_frame, _) = frame_sink();
    assert!(RevealChartApi::new(r#"{"holdDurationMs": -1}"#, 800.0, 400.0, on_frame).is_err());
}

#[wasm_bindgen_test]
fn browser_scheduler_keeps_one_pending_callback() {
    let mut scheduler = BrowserFrameScheduler::new();
    let first = scheduler.subscribe(FrameRequest::EveryFrame);
    scheduler.cancel(first);
    assert!(!scheduler.has_pending());

    scheduler.subscribe(FrameRequest::After { delay_ms: 50.0 });
    assert!(scheduler.has_pending());
}
