use moodytunes::pages::accounts::{
    onboarding_url, passwords_mismatch, should_prompt_spotify_auth, spotify_authorize_url,
    toggled_password_type,
};
use moodytunes::PageConfig;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, HtmlFormElement, HtmlInputElement};

use crate::dom::{by_id, close_from, current_document, listen, on_click, show, value_of};

fn redirect(url: &str) {
    let window = web_sys::window().expect("no global `window` exists");
    if let Err(e) = window.location().set_href(url) {
        log::error!("could not leave page for {}: {:?}", url, e);
    }
}

pub fn setup_onboarding(config: &PageConfig, document: &Document) -> Result<(), JsValue> {
    let modal: HtmlElement = by_id(document, "onboarding-start-modal")?;
    close_from(
        &modal,
        &[
            by_id(document, "close-onboarding-modal")?,
            by_id(document, "reject-onboarding-button")?,
        ],
    );
    let accept: HtmlElement = by_id(document, "accept-onboarding-button")?;
    let target = onboarding_url(&config.origin).map_err(|e| JsValue::from(e.to_string()))?;
    on_click(&accept, move || redirect(target.as_str()));
    Ok(())
}

pub fn setup_spotify_auth_prompt(config: &PageConfig, document: &Document) -> Result<(), JsValue> {
    let modal: HtmlElement = by_id(document, "spotify-auth-modal")?;
    close_from(
        &modal,
        &[
            by_id(document, "close-spotify-auth-modal")?,
            by_id(document, "decline-spotify-auth")?,
        ],
    );
    let accept: HtmlElement = by_id(document, "accept-spotify-auth")?;
    let target = spotify_authorize_url(&config.origin).map_err(|e| JsValue::from(e.to_string()))?;
    on_click(&accept, move || redirect(target.as_str()));

    let window = web_sys::window().expect("no global `window` exists");
    if should_prompt_spotify_auth(&window.location().search()?) {
        show(&modal)?;
    }
    Ok(())
}

pub fn setup_password_confirmation(document: &Document) -> Result<(), JsValue> {
    let form: HtmlFormElement = by_id(document, "password-form")?;
    listen(&form, "submit", move |evt| {
        let document = current_document();
        // a fresh submission hides the server's previous errors
        if let Ok(errors) = by_id::<HtmlElement>(&document, "errorlist-container") {
            errors.set_hidden(true);
        }
        let (Ok(password), Ok(confirmation)) = (
            value_of(&document, "id_password"),
            value_of(&document, "id_confirm_password"),
        ) else {
            return;
        };
        if passwords_mismatch(&password, &confirmation) {
            evt.prevent_default();
            if let Ok(message) = by_id::<HtmlElement>(&document, "password-error") {
                message.set_hidden(false);
            }
        }
    })
}

pub fn setup_show_password(document: &Document) -> Result<(), JsValue> {
    let checkbox: HtmlElement = by_id(document, "show-password")?;
    let password: HtmlInputElement = by_id(document, "id_password")?;
    let confirmation: HtmlInputElement = by_id(document, "id_confirm_password")?;
    on_click(&checkbox, move || {
        let kind = toggled_password_type(&password.type_());
        password.set_type(kind);
        confirmation.set_type(kind);
    });
    Ok(())
}
