//! Browser entry points
//!
//! ```js
//! import init, { start, pause, resume, reset_camera, toggle_rotation, teardown } from "./showroom.js";
//! await init();
//! start();
//! ```

use std::cell::RefCell;

use wasm_bindgen::prelude::*;
use winit::event_loop::EventLoopProxy;

use crate::{
    app::{self, ViewerCommand},
    config::ViewerConfig,
    ui::{dom, ERROR_MESSAGE},
};

thread_local! {
    static VIEWER: RefCell<Option<EventLoopProxy<ViewerCommand>>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
}

/// Starts the viewer on `#viewer-canvas`; a second call while running is
/// ignored with a warning
#[wasm_bindgen]
pub fn start() {
    if VIEWER.with(|viewer| viewer.borrow().is_some()) {
        log::warn!("Viewer already started");
        return;
    }

    match app::spawn(ViewerConfig::default()) {
        Ok(proxy) => VIEWER.with(|viewer| *viewer.borrow_mut() = Some(proxy)),
        Err(err) => {
            log::error!("{} {}", ERROR_MESSAGE, err);
            dom::show_error_overlay();
        }
    }
}

fn send(command: ViewerCommand) {
    VIEWER.with(|viewer| match viewer.borrow().as_ref() {
        Some(proxy) => {
            if proxy.send_event(command).is_err() {
                log::warn!("Viewer event loop has stopped");
            }
        }
        None => log::warn!("Viewer is not running"),
    });
}

#[wasm_bindgen]
pub fn pause() {
    send(ViewerCommand::Pause);
}

#[wasm_bindgen]
pub fn resume() {
    send(ViewerCommand::Resume);
}

#[wasm_bindgen]
pub fn reset_camera() {
    send(ViewerCommand::ResetCamera);
}

#[wasm_bindgen]
pub fn toggle_rotation() {
    send(ViewerCommand::ToggleRotation);
}

/// Stops the viewer and removes its page listeners
#[wasm_bindgen]
pub fn teardown() {
    send(ViewerCommand::Teardown);
    VIEWER.with(|viewer| viewer.borrow_mut().take());
}
