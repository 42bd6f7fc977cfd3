//! DOM front end for web builds
//!
//! Looks up the page's controls by id, forwards button clicks as
//! [`UiAction`]s and mirrors [`ViewerStatus`] into the info panel and
//! rotation button. Every element except the canvas is optional.

use std::rc::Rc;

use wasm_bindgen::{prelude::*, JsCast};
use web_sys::{Document, Element, EventTarget, HtmlCanvasElement, HtmlElement};

use crate::{error::ViewerError, viewer::ViewerStatus};

use super::{rotation_button_label, UiAction, ERROR_MESSAGE};

pub const INFO_PANEL_ID: &str = "info-panel";
pub const PART_NAME_ID: &str = "part-name";
pub const PART_TYPE_ID: &str = "part-type";
pub const INFO_CLOSE_ID: &str = "info-close";
pub const TOGGLE_ROTATION_ID: &str = "toggle-rotation";
pub const RESET_CAMERA_ID: &str = "reset-camera";
pub const LOADING_ID: &str = "loading";

const ERROR_OVERLAY_ID: &str = "viewer-error";

type ClickHandler = Closure<dyn FnMut(web_sys::Event)>;

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: ClickHandler,
}

pub fn document() -> Result<Document, ViewerError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or(ViewerError::NoDocument)
}

/// The canvas the viewer renders into; its absence is fatal
pub fn canvas(document: &Document, id: &str) -> Result<HtmlCanvasElement, ViewerError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| ViewerError::MissingElement(id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| ViewerError::MissingElement(id.to_string()))
}

fn html_element(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

fn set_visible(element: &HtmlElement, visible: bool) {
    let display = if visible { "block" } else { "none" };
    if let Err(err) = element.style().set_property("display", display) {
        log::warn!("Failed to set display on #{}: {:?}", element.id(), err);
    }
}

/// Handles to the page's viewer controls
pub struct DomUi {
    info_panel: Option<HtmlElement>,
    part_name: Option<Element>,
    part_type: Option<Element>,
    toggle_button: Option<Element>,
    loading: Option<HtmlElement>,
    listeners: Vec<Listener>,
    last_status: Option<ViewerStatus>,
}

impl DomUi {
    /// Finds the controls and attaches click listeners to the buttons
    ///
    /// `on_action` runs inside the DOM event callback.
    pub fn bind(document: &Document, on_action: impl Fn(UiAction) + 'static) -> Self {
        let on_action: Rc<dyn Fn(UiAction)> = Rc::new(on_action);
        let mut ui = Self {
            info_panel: html_element(document, INFO_PANEL_ID),
            part_name: document.get_element_by_id(PART_NAME_ID),
            part_type: document.get_element_by_id(PART_TYPE_ID),
            toggle_button: document.get_element_by_id(TOGGLE_ROTATION_ID),
            loading: html_element(document, LOADING_ID),
            listeners: Vec::new(),
            last_status: None,
        };

        for (id, action) in [
            (TOGGLE_ROTATION_ID, UiAction::ToggleRotation),
            (RESET_CAMERA_ID, UiAction::ResetCamera),
            (INFO_CLOSE_ID, UiAction::CloseInfoPanel),
        ] {
            match document.get_element_by_id(id) {
                Some(element) => ui.listen_click(element.into(), action, on_action.clone()),
                None => log::debug!("No #{} element, skipping listener", id),
            }
        }

        ui
    }

    fn listen_click(&mut self, target: EventTarget, action: UiAction, on_action: Rc<dyn Fn(UiAction)>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            on_action(action);
        });
        match target.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref()) {
            Ok(()) => self.listeners.push(Listener {
                target,
                event: "click",
                closure,
            }),
            Err(err) => log::warn!("Failed to attach {:?} listener: {:?}", action, err),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn hide_loading(&self) {
        if let Some(loading) = &self.loading {
            set_visible(loading, false);
        }
    }

    /// Mirrors the viewer status into the page; unchanged status is a no-op
    pub fn sync(&mut self, status: &ViewerStatus) {
        if self.last_status.as_ref() == Some(status) {
            return;
        }

        if let Some(button) = &self.toggle_button {
            button.set_text_content(Some(rotation_button_label(status.auto_rotate_enabled)));
        }

        let panel = &status.info_panel;
        if let Some(element) = &self.info_panel {
            set_visible(element, panel.visible);
        }
        if panel.visible {
            if let Some(element) = &self.part_name {
                element.set_text_content(Some(&panel.name));
            }
            if let Some(element) = &self.part_type {
                element.set_text_content(Some(panel.description()));
            }
        }

        self.last_status = Some(status.clone());
    }

    /// Removes every listener registered by [`DomUi::bind`]
    pub fn detach(&mut self) {
        for listener in self.listeners.drain(..) {
            if let Err(err) = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.closure.as_ref().unchecked_ref(),
            ) {
                log::warn!("Failed to remove {} listener: {:?}", listener.event, err);
            }
        }
    }
}

impl Drop for DomUi {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Covers the page with a fixed error message
pub fn show_error_overlay() {
    let Ok(document) = document() else {
        return;
    };
    if let Some(loading) = html_element(&document, LOADING_ID) {
        set_visible(&loading, false);
    }
    if document.get_element_by_id(ERROR_OVERLAY_ID).is_some() {
        return;
    }

    let overlay = match document.create_element("div") {
        Ok(element) => element,
        Err(err) => {
            log::error!("Failed to create error overlay: {:?}", err);
            return;
        }
    };
    overlay.set_id(ERROR_OVERLAY_ID);
    overlay.set_text_content(Some(ERROR_MESSAGE));
    if let Err(err) = overlay.set_attribute(
        "style",
        "position:fixed;inset:0;display:flex;align-items:center;justify-content:center;\
         background:rgba(0,0,0,0.8);color:#fff;font-family:sans-serif;z-index:1000",
    ) {
        log::warn!("Failed to style error overlay: {:?}", err);
    }

    match document.body() {
        Some(body) => {
            if let Err(err) = body.append_child(&overlay) {
                log::error!("Failed to attach error overlay: {:?}", err);
            }
        }
        None => log::error!("No document body for the error overlay"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn add_button(document: &Document, id: &str) -> HtmlElement {
        let button = document
            .create_element("button")
            .unwrap()
            .dyn_into::<HtmlElement>()
            .unwrap();
        button.set_id(id);
        document.body().unwrap().append_child(&button).unwrap();
        button
    }

    #[wasm_bindgen_test]
    fn test_detach_removes_button_listeners() {
        let document = document().unwrap();
        let toggle = add_button(&document, TOGGLE_ROTATION_ID);
        let reset = add_button(&document, RESET_CAMERA_ID);

        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = received.clone();
        let mut ui = DomUi::bind(&document, move |action| sink.borrow_mut().push(action));
        // No close button on this page
        assert_eq!(ui.listener_count(), 2);

        toggle.click();
        reset.click();
        assert_eq!(
            *received.borrow(),
            vec![UiAction::ToggleRotation, UiAction::ResetCamera]
        );

        ui.detach();
        assert_eq!(ui.listener_count(), 0);
        toggle.click();
        assert_eq!(received.borrow().len(), 2);

        toggle.remove();
        reset.remove();
    }

    #[wasm_bindgen_test]
    fn test_error_overlay_shows_message() {
        let document = document().unwrap();
        show_error_overlay();
        show_error_overlay();

        let overlay = document.get_element_by_id(ERROR_OVERLAY_ID).unwrap();
        assert_eq!(overlay.text_content().as_deref(), Some(ERROR_MESSAGE));
        overlay.remove();
    }
}
