use moodytunes::pages::export::cover_image_too_large;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, HtmlFormElement, HtmlInputElement};

use crate::dom::{by_id, listen, on_click};

pub fn setup_export_form(document: &Document) -> Result<(), JsValue> {
    let form: HtmlFormElement = by_id(document, "export-playlist-form")?;
    let input: HtmlInputElement = by_id(document, "id_cover_image")?;
    let message: HtmlElement = by_id(document, "error-message")?;
    listen(&form, "submit", move |evt| {
        message.set_hidden(true);
        let too_large = input
            .files()
            .and_then(|files| files.item(0))
            .map_or(false, |file| cover_image_too_large(file.size()));
        if too_large {
            evt.prevent_default();
            message.set_hidden(false);
        }
    })
}

pub fn setup_help(document: &Document) -> Result<(), JsValue> {
    let show_help: HtmlElement = by_id(document, "show-help")?;
    let help: HtmlElement = by_id(document, "help-container")?;
    let button = show_help.clone();
    on_click(&show_help, move || {
        help.set_hidden(false);
        button.set_hidden(true);
    });
    Ok(())
}
