use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::application::{EngineConfig, RenderOutput, RevealChartEngine};
use crate::domain::chart::Dimensions;
use crate::domain::errors::ChartError;
use crate::domain::logging::{LogComponent, get_logger};
use crate::infrastructure::BrowserFrameScheduler;
use crate::infrastructure::clock::now_ms;

type BrowserEngine = RevealChartEngine<BrowserFrameScheduler>;

/// JS facade over the reveal engine.
///
/// Every new frame is handed to `onFrame` as a JSON string. The browser clock drives the
/// animation on its own once an after series is set.
#[wasm_bindgen]
pub struct RevealChartApi {
    engine: Rc<RefCell<BrowserEngine>>,
    scheduler: BrowserFrameScheduler,
    on_frame: Rc<js_sys::Function>,
}

#[wasm_bindgen]
impl RevealChartApi {
    #[wasm_bindgen(constructor)]
    pub fn new(
        config_json: &str,
        width: f64,
        height: f64,
        on_frame: js_sys::Function,
    ) -> Result<RevealChartApi, JsValue> {
        let config = EngineConfig::from_json(config_json).map_err(to_js_error)?;
        let scheduler = BrowserFrameScheduler::new();
        let engine = RevealChartEngine::new(config, Dimensions::new(width, height), scheduler.clone())
            .map_err(to_js_error)?;
        let engine = Rc::new(RefCell::new(engine));
        let on_frame = Rc::new(on_frame);

        let weak_engine = Rc::downgrade(&engine);
        let callback = Rc::clone(&on_frame);
        scheduler.set_tick_handler(move |now| {
            let Some(engine) = weak_engine.upgrade() else {
                return;
            };
            let output = engine.borrow_mut().tick(now);
            if let Some(output) = output {
                emit(&callback, &output);
            }
        });

        get_logger().info(
            LogComponent::Presentation("RevealChartApi"),
            &format!("chart created at {}x{}", width, height),
        );
        Ok(Self { engine, scheduler, on_frame })
    }

    /// Start a new round from a JSON array of before records
    #[wasm_bindgen(js_name = loadRound)]
    pub fn load_round(&self, before_json: &str) -> Result<(), JsValue> {
        let before = parse_records(before_json)?;
        let output = self.engine.borrow_mut().load_round(&before);
        emit(&self.on_frame, &output);
        Ok(())
    }

    #[wasm_bindgen(js_name = setAfter)]
    pub fn set_after(&self, after_json: &str) -> Result<(), JsValue> {
        let after = parse_records(after_json)?;
        let output = self.engine.borrow_mut().set_after(&after);
        emit(&self.on_frame, &output);
        Ok(())
    }

    #[wasm_bindgen(js_name = clearAfter)]
    pub fn clear_after(&self) {
        let output = self.engine.borrow_mut().clear_after();
        emit(&self.on_frame, &output);
    }

    pub fn resize(&self, width: f64, height: f64) {
        let output = self.engine.borrow_mut().resize(Dimensions::new(width, height));
        emit(&self.on_frame, &output);
    }

    /// Drive the animation by hand; `now` defaults to `performance.now()`
    pub fn tick(&self, now: Option<f64>) {
        let output = self.engine.borrow_mut().tick(now.unwrap_or_else(now_ms));
        if let Some(output) = output {
            emit(&self.on_frame, &output);
        }
    }

    pub fn phase(&self) -> String {
        self.engine.borrow().phase().to_string()
    }

    #[wasm_bindgen(js_name = currentFrame)]
    pub fn current_frame(&self) -> Result<String, JsValue> {
        let output = self.engine.borrow().render();
        serde_json::to_string(&output).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Stop the clock; the instance stays usable for a new round
    pub fn teardown(&self) {
        self.engine.borrow_mut().teardown();
        get_logger().debug(LogComponent::Presentation("RevealChartApi"), "clock released");
    }
}

impl Drop for RevealChartApi {
    fn drop(&mut self) {
        self.scheduler.clear_tick_handler();
    }
}

fn parse_records(json: &str) -> Result<Value, JsValue> {
    serde_json::from_str(json).map_err(|e| JsValue::from_str(&format!("invalid records JSON: {e}")))
}

fn to_js_error(error: ChartError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn emit(on_frame: &js_sys::Function, output: &RenderOutput) {
    let json = match serde_json::to_string(output) {
        Ok(json) => json,
        Err(e) => {
            get_logger().error(
                LogComponent::Presentation("RevealChartApi"),
                &format!("failed to serialize frame: {e}"),
            );
            return;
        }
    };
    if let Err(e) = on_frame.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
        get_logger().error(
            LogComponent::Presentation("RevealChartApi"),
            &format!("onFrame threw: {:?}", e),
        );
    }
}
