use log::info;
use moodytunes::curator::{chosen_vote_class, jitter_display, ButtonAction, PlaylistView};
use moodytunes::pages::{BrowseController, BrowseForm};
use moodytunes::params::non_empty;
use moodytunes::session::PageSession;
use moodytunes::{ApiError, MoodyTunesClient};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, HtmlInputElement, KeyboardEvent};

use crate::dom::{
    by_id, clear_children, clear_error_modal, close_from, close_on_backdrop, create_song_card,
    current_document, display_api_error, hide, listen, on_click, show, spawn, value_of,
};
use crate::fetch::FetchTransport;
use crate::storage::SessionStorage;

type Browse = BrowseController<FetchTransport, SessionStorage>;

pub fn setup(client: MoodyTunesClient<FetchTransport>, document: &Document) -> Result<(), JsValue> {
    let browse = Rc::new(BrowseController::new(
        client,
        PageSession::new(SessionStorage::new()?),
    ));
    setup_context_modal(&browse, document)?;
    setup_jitter_input(document)?;

    let generate: HtmlElement = by_id(document, "generate-playlist")?;
    let browse_ref = Rc::clone(&browse);
    on_click(&generate, move || {
        let browse = Rc::clone(&browse_ref);
        spawn(async move {
            let document = current_document();
            let form = read_form(&document)?;
            clear_error_modal(&document);
            let result = browse.generate(form).await;
            display_playlist(&browse, &document, result)
        })
    });

    let cached: HtmlElement = by_id(document, "use-cached-playlist")?;
    let browse_ref = Rc::clone(&browse);
    on_click(&cached, move || {
        let browse = Rc::clone(&browse_ref);
        spawn(async move {
            let document = current_document();
            clear_error_modal(&document);
            let result = browse.load_last().await;
            display_playlist(&browse, &document, result)
        })
    });

    // Enter anywhere on the page generates a playlist
    listen(document, "keyup", move |evt| {
        if let Some(key) = evt.dyn_ref::<KeyboardEvent>() {
            if key.key() == "Enter" {
                evt.prevent_default();
                generate.click();
            }
        }
    })
}

fn read_form(document: &Document) -> Result<BrowseForm, JsValue> {
    let artist = match document.get_element_by_id("id_artist") {
        Some(_) => non_empty(value_of(document, "id_artist")?),
        None => None,
    };
    Ok(BrowseForm {
        emotion: value_of(document, "id_emotion")?,
        jitter: value_of(document, "id_jitter")?.parse().ok(),
        genre: non_empty(value_of(document, "id_genre")?),
        artist,
    })
}

fn setup_context_modal(browse: &Rc<Browse>, document: &Document) -> Result<(), JsValue> {
    let modal: HtmlElement = by_id(document, "context-modal")?;
    let show_modal: HtmlElement = by_id(document, "set-context-button")?;
    let target = modal.clone();
    on_click(&show_modal, move || {
        let _ = show(&target);
    });

    let submit: HtmlElement = by_id(document, "submit-context")?;
    let browse_ref = Rc::clone(browse);
    let target = modal.clone();
    on_click(&submit, move || {
        let document = current_document();
        if let (Ok(context), Ok(description)) = (
            value_of(&document, "id_context"),
            value_of(&document, "id_description"),
        ) {
            browse_ref.set_context(&context, &description);
        }
        let _ = hide(&target);
    });

    let clear: HtmlElement = by_id(document, "clear-context")?;
    let browse_ref = Rc::clone(browse);
    let target = modal.clone();
    on_click(&clear, move || {
        browse_ref.clear_context();
        let _ = hide(&target);
    });

    close_from(&modal, &[by_id(document, "close-modal")?]);
    close_on_backdrop(&modal)
}

fn setup_jitter_input(document: &Document) -> Result<(), JsValue> {
    let input: HtmlInputElement = by_id(document, "id_jitter")?;
    let display: Element = by_id(document, "jitter-value")?;
    let update = move |input: &HtmlInputElement| {
        let max: f64 = input.max().parse().unwrap_or(1.0);
        let value: f64 = input.value().parse().unwrap_or(0.0);
        display.set_text_content(Some(&jitter_display(value, max)));
    };
    update(&input);
    let target = input.clone();
    listen(&input, "input", move |_| update(&target))
}

fn display_playlist(
    browse: &Rc<Browse>,
    document: &Document,
    result: Result<PlaylistView, ApiError>,
) -> Result<(), JsValue> {
    let view = match result {
        Ok(view) => view,
        Err(e) => return display_api_error(document, &e),
    };
    let container: Element = by_id(document, "playlist-display-container")?;
    let no_results: HtmlElement = by_id(document, "alert-no-results")?;
    clear_children(&container);
    no_results.set_hidden(!view.no_results);
    for card in &view.cards {
        let element = create_song_card(document, card)?;
        let buttons: Rc<Vec<(ButtonAction, HtmlButtonElement)>> = Rc::new(
            card.buttons
                .iter()
                .map(|view| view.action)
                .zip(element.buttons.iter().cloned())
                .collect(),
        );
        for (action, button) in buttons.iter() {
            let ButtonAction::Vote(vote) = *action else {
                continue;
            };
            let browse = Rc::clone(browse);
            let buttons = Rc::clone(&buttons);
            let container = element.container.clone();
            let song_code = card.song_code.clone();
            on_click(button, move || {
                let browse = Rc::clone(&browse);
                let buttons = Rc::clone(&buttons);
                let container = container.clone();
                let song_code = song_code.clone();
                spawn(async move {
                    let document = current_document();
                    clear_error_modal(&document);
                    let outcome = match browse.vote(&song_code, vote).await {
                        Ok(Some(outcome)) => outcome,
                        Ok(None) => return Ok(()),
                        Err(e) => return display_api_error(&document, &e),
                    };
                    for (action, button) in buttons.iter() {
                        button.set_disabled(true);
                        if *action == ButtonAction::Vote(outcome.chosen) {
                            button.set_class_name(&format!(
                                "{} {}",
                                button.class_name(),
                                chosen_vote_class(outcome.chosen)
                            ));
                        }
                    }
                    container.set_attribute("data-voted-on", "true")?;
                    if outcome.all_voted {
                        info!("every song voted on, fetching more");
                        if let Some(result) = browse.refresh().await.transpose() {
                            display_playlist(&browse, &document, result)?;
                        }
                    }
                    Ok(())
                })
            });
        }
        container.append_child(&element.container)?;
    }
    Ok(())
}
