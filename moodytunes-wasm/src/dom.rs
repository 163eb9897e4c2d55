use log::error;
use moodytunes::curator::{ErrorModal, SongCard, EMBED_ALLOW};
use moodytunes::ApiError;
use std::future::Future;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlButtonElement, HtmlElement, HtmlIFrameElement,
    HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement,
};

pub fn current_document() -> Document {
    let window = web_sys::window().expect("no global `window` exists");
    window.document().expect("should have a document on window")
}

pub fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from(format!("{} element missing", id)))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from(format!("{} element has the wrong type", id)))
}

/// Value of a form control, whichever kind of control it is.
pub fn value_of(document: &Document, id: &str) -> Result<String, JsValue> {
    let element: Element = by_id(document, id)?;
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        Ok(input.value())
    } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
        Ok(select.value())
    } else if let Some(text) = element.dyn_ref::<HtmlTextAreaElement>() {
        Ok(text.value())
    } else {
        Err(JsValue::from(format!("{} is not a form control", id)))
    }
}

pub fn clear_children(container: &Element) {
    while let Some(child) = container.first_child() {
        let _ = container.remove_child(&child);
    }
}

pub fn show(element: &HtmlElement) -> Result<(), JsValue> {
    element.style().set_property("display", "block")
}

pub fn hide(element: &HtmlElement) -> Result<(), JsValue> {
    element.style().set_property("display", "none")
}

pub fn on_click(element: &HtmlElement, handler: impl FnMut() + 'static) {
    let a = Closure::wrap(Box::new(handler) as Box<dyn FnMut()>);
    element.set_onclick(Some(a.as_ref().unchecked_ref()));
    a.forget();
}

pub fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<(), JsValue> {
    let a = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, a.as_ref().unchecked_ref())?;
    a.forget();
    Ok(())
}

/// Runs a handler's async work, logging whatever it fails with.
pub fn spawn(task: impl Future<Output = Result<(), JsValue>> + 'static) {
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(e) = task.await {
            error!("handler failed: {:?}", e);
        }
    })
}

/// Hides the modal when a click lands on its backdrop rather than its content.
pub fn close_on_backdrop(modal: &HtmlElement) -> Result<(), JsValue> {
    let target = modal.clone();
    listen(modal, "click", move |evt| {
        let on_backdrop = evt
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .map_or(false, |t| t.id() == target.id());
        if on_backdrop {
            let _ = hide(&target);
        }
    })
}

/// Closes the modal from each of the given buttons.
pub fn close_from(modal: &HtmlElement, buttons: &[HtmlElement]) {
    for button in buttons {
        let modal = modal.clone();
        on_click(button, move || {
            let _ = hide(&modal);
        });
    }
}

pub fn clear_error_modal(document: &Document) {
    if let Some(old) = document.get_element_by_id("error-modal") {
        old.remove();
    }
}

pub fn display_api_error(document: &Document, error: &ApiError) -> Result<(), JsValue> {
    error!("{}", error);
    let modal = ErrorModal::from(error);
    clear_error_modal(document);
    let container: Element = by_id(document, "container")?;
    let error_modal = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    error_modal.set_id("error-modal");
    error_modal.set_class_name("modal");
    show(&error_modal)?;
    close_on_backdrop(&error_modal)?;
    let close = document.create_element("span")?.dyn_into::<HtmlElement>()?;
    close.set_class_name("close");
    close.set_text_content(Some("\u{d7}"));
    close_from(&error_modal, &[close.clone()]);
    let content = document.create_element("div")?;
    content.set_class_name("modal-content");
    content.append_child(&close)?;
    let message = document.create_element("p")?;
    message.set_text_content(Some(&modal.message));
    content.append_child(&message)?;
    if !modal.errors.is_empty() {
        let list = document.create_element("ul")?;
        list.set_class_name("errorlist");
        for e in &modal.errors {
            let item = document.create_element("li")?;
            item.set_text_content(Some(e));
            list.append_child(&item)?;
        }
        content.append_child(&list)?;
    }
    error_modal.append_child(&content)?;
    container.append_child(&error_modal)?;
    Ok(())
}

/// A rendered song card and the buttons on it, in the order the card lists
/// them.
pub struct CardElement {
    pub container: Element,
    pub buttons: Vec<HtmlButtonElement>,
}

pub fn create_song_card(document: &Document, card: &SongCard) -> Result<CardElement, JsValue> {
    let container = document.create_element("div")?;
    container.set_id(&card.element_id);
    container.set_class_name("song-container");
    let play_button = document
        .create_element("iframe")?
        .dyn_into::<HtmlIFrameElement>()?;
    play_button.set_attribute("allow", EMBED_ALLOW)?;
    play_button.set_class_name("play-button");
    play_button.set_src(&card.play_src);
    container.append_child(&play_button)?;
    if let Some(description) = &card.description {
        let p = document.create_element("p")?;
        p.set_class_name("song-description-container");
        p.set_text_content(Some(description));
        container.append_child(&p)?;
    }
    let button_container = document.create_element("div")?;
    button_container.set_class_name("vote-button-container");
    let mut buttons = Vec::with_capacity(card.buttons.len());
    for view in &card.buttons {
        let button = document
            .create_element("button")?
            .dyn_into::<HtmlButtonElement>()?;
        button.set_type("button");
        button.set_class_name(&view.class_name);
        button.set_text_content(Some(view.label));
        button_container.append_child(&button)?;
        buttons.push(button);
    }
    container.append_child(&button_container)?;
    Ok(CardElement { container, buttons })
}
