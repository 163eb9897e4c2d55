use log::info;
use moodytunes::config::CONFIG_ELEMENT_ID;
use moodytunes::{MoodyTunesClient, PageConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlDocument, HtmlElement};

mod dom;
mod fetch;
mod logger;
mod pages;
mod storage;

use fetch::FetchTransport;

// Called by our JS entry point once the page has loaded
#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    let window = web_sys::window().expect("no global `window` exists");
    let document = window.document().expect("should have a document on window");
    let config = load_config(&document, &window.location().origin()?)?;
    logger::init(config.log_level);

    let present = |id: &str| document.get_element_by_id(id).is_some();
    if present("use-cached-playlist") {
        info!("setting up browse page");
        pages::browse::setup(client(&config), &document)?;
    } else if present("delete-confirm-modal") {
        info!("setting up playlist page");
        pages::playlists::setup(client(&config), &document)?;
    }
    if present("onboarding-start-modal") {
        pages::accounts::setup_onboarding(&config, &document)?;
    }
    if present("spotify-auth-modal") {
        pages::accounts::setup_spotify_auth_prompt(&config, &document)?;
    }
    if present("password-form") {
        pages::accounts::setup_password_confirmation(&document)?;
    }
    if present("show-password") {
        pages::accounts::setup_show_password(&document)?;
    }
    if present("export-playlist-form") {
        pages::export::setup_export_form(&document)?;
    }
    if present("show-help") {
        pages::export::setup_help(&document)?;
    }
    Ok(())
}

fn load_config(document: &Document, origin: &str) -> Result<PageConfig, JsValue> {
    let dataset = document
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
        .map(|element| element.dataset());
    PageConfig::load(origin, |key| {
        dataset.as_ref().and_then(|dataset| dataset.get(key))
    })
    .map_err(|e| JsValue::from(e.to_string()))
}

fn cookies() -> String {
    web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.dyn_into::<HtmlDocument>().ok())
        .and_then(|document| document.cookie().ok())
        .unwrap_or_default()
}

fn client(config: &PageConfig) -> MoodyTunesClient<FetchTransport> {
    MoodyTunesClient::from_config(FetchTransport, config).with_cookies(cookies)
}
