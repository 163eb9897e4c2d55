use moodytunes::curator::{AnalyticsView, ButtonAction, PlaylistView};
use moodytunes::model::{Context, UnknownContext};
use moodytunes::pages::{AddContextPrompt, PlaylistController, PlaylistForm, PlaylistResults};
use moodytunes::params::non_empty;
use moodytunes::session::PageSession;
use moodytunes::MoodyTunesClient;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlButtonElement, HtmlElement};

use crate::dom::{
    by_id, clear_children, clear_error_modal, close_from, close_on_backdrop, create_song_card,
    current_document, display_api_error, hide, on_click, show, spawn, value_of,
};
use crate::fetch::FetchTransport;
use crate::storage::SessionStorage;

type Playlists = PlaylistController<FetchTransport, SessionStorage>;

const SONG_CODE_ATTRIBUTE: &str = "data-song-code";

pub fn setup(client: MoodyTunesClient<FetchTransport>, document: &Document) -> Result<(), JsValue> {
    let playlists = Rc::new(PlaylistController::new(
        client,
        PageSession::new(SessionStorage::new()?),
    ));

    let delete_modal: HtmlElement = by_id(document, "delete-confirm-modal")?;
    let add_context_modal: HtmlElement = by_id(document, "add-context-confirm-modal")?;
    let success_modal: HtmlElement = by_id(document, "add-context-success-modal")?;
    close_on_backdrop(&delete_modal)?;
    close_on_backdrop(&add_context_modal)?;
    close_on_backdrop(&success_modal)?;
    close_from(
        &add_context_modal,
        &[
            by_id(document, "close-add-context-modal")?,
            by_id(document, "cancel-add-context-to-vote-button")?,
        ],
    );
    close_from(&success_modal, &[by_id(document, "close-add-context-success-modal")?]);

    for id in ["close-delete-modal", "cancel-delete-vote"] {
        let button: HtmlElement = by_id(document, id)?;
        let playlists = Rc::clone(&playlists);
        let modal = delete_modal.clone();
        on_click(&button, move || {
            playlists.cancel_delete();
            let _ = hide(&modal);
        });
    }

    let confirm_delete: HtmlElement = by_id(document, "delete-vote")?;
    let playlists_ref = Rc::clone(&playlists);
    let modal = delete_modal.clone();
    on_click(&confirm_delete, move || {
        let _ = hide(&modal);
        let playlists = Rc::clone(&playlists_ref);
        spawn(async move {
            let document = current_document();
            clear_error_modal(&document);
            match playlists.confirm_delete().await {
                Ok(Some(results)) => display_results(&playlists, &document, results),
                Ok(None) => Ok(()),
                Err(e) => display_api_error(&document, &e),
            }
        })
    });

    let confirm_add: HtmlElement = by_id(document, "add-context-to-vote-button")?;
    let playlists_ref = Rc::clone(&playlists);
    let modal = add_context_modal.clone();
    let button = confirm_add.clone();
    on_click(&confirm_add, move || {
        let _ = hide(&modal);
        let playlists = Rc::clone(&playlists_ref);
        let song_code = button.get_attribute(SONG_CODE_ATTRIBUTE);
        spawn(async move {
            let document = current_document();
            let Some(song_code) = song_code else {
                return Ok(());
            };
            let context: Context = value_of(&document, "add-context-input")?
                .parse()
                .map_err(|e: UnknownContext| JsValue::from(e.to_string()))?;
            clear_error_modal(&document);
            match playlists.add_context(&song_code, context).await {
                Ok(Some(message)) => {
                    let content: Element = by_id(&document, "add-context-success-content")?;
                    content.set_text_content(Some(&message));
                    show(&by_id(&document, "add-context-success-modal")?)
                }
                Ok(None) => Ok(()),
                Err(e) => display_api_error(&document, &e),
            }
        })
    });

    let generate: HtmlElement = by_id(document, "generate-playlist")?;
    on_click(&generate, move || {
        let playlists = Rc::clone(&playlists);
        spawn(async move {
            let document = current_document();
            let form = read_form(&document)?;
            clear_error_modal(&document);
            let results = playlists.generate(form).await;
            display_results(&playlists, &document, results)
        })
    });
    Ok(())
}

fn read_form(document: &Document) -> Result<PlaylistForm, JsValue> {
    Ok(PlaylistForm {
        emotion: value_of(document, "id_emotion")?,
        genre: non_empty(value_of(document, "id_genre")?),
        context: non_empty(value_of(document, "id_context")?),
        artist: non_empty(value_of(document, "id_artist")?),
    })
}

fn display_results(
    playlists: &Rc<Playlists>,
    document: &Document,
    results: PlaylistResults,
) -> Result<(), JsValue> {
    if let Some(e) = results.error() {
        display_api_error(document, e)?;
    }
    if let Ok(view) = &results.analytics {
        display_analytics(document, view)?;
    }
    match results.playlist {
        Ok(view) => display_playlist(playlists, document, view),
        Err(_) => Ok(()),
    }
}

fn display_analytics(document: &Document, view: &AnalyticsView) -> Result<(), JsValue> {
    for (id, text) in [
        ("analytics-emotion", &view.emotion_name),
        ("analytics-energy", &view.energy),
        ("analytics-valence", &view.valence),
        ("analytics-danceability", &view.danceability),
        ("analytics-total-songs", &view.total_songs),
    ] {
        by_id::<Element>(document, id)?.set_text_content(Some(text.as_str()));
    }
    Ok(())
}

fn display_playlist(
    playlists: &Rc<Playlists>,
    document: &Document,
    view: PlaylistView,
) -> Result<(), JsValue> {
    let container: Element = by_id(document, "playlist-display-container")?;
    let pagination: Element = by_id(document, "playlist-pagination-button-container")?;
    let no_results: HtmlElement = by_id(document, "alert-no-results")?;
    clear_children(&container);
    clear_children(&pagination);
    no_results.set_hidden(!view.no_results);

    for card in &view.cards {
        let element = create_song_card(document, card)?;
        for (view, button) in card.buttons.iter().zip(&element.buttons) {
            let playlists = Rc::clone(playlists);
            let song_code = card.song_code.clone();
            match view.action {
                ButtonAction::Delete => on_click(button, move || {
                    let _ = confirm_delete_vote(&playlists, &song_code);
                }),
                ButtonAction::AddContext => on_click(button, move || {
                    let playlists = Rc::clone(&playlists);
                    let song_code = song_code.clone();
                    spawn(async move {
                        let document = current_document();
                        clear_error_modal(&document);
                        match playlists.contexts_for(&song_code).await {
                            Ok(Some(prompt)) => confirm_add_context(&document, &prompt),
                            Ok(None) => Ok(()),
                            Err(e) => display_api_error(&document, &e),
                        }
                    })
                }),
                ButtonAction::Vote(_) => {}
            }
        }
        container.append_child(&element.container)?;
    }

    for view in &view.pagination {
        let button = document
            .create_element("button")?
            .dyn_into::<HtmlButtonElement>()?;
        button.set_type("button");
        button.set_class_name(view.class_name);
        button.set_text_content(Some(view.label));
        button.set_disabled(view.disabled);
        if let Some(link) = view.link.clone() {
            let playlists = Rc::clone(playlists);
            on_click(&button, move || {
                let playlists = Rc::clone(&playlists);
                let link = link.clone();
                spawn(async move {
                    let document = current_document();
                    clear_error_modal(&document);
                    match playlists.page(&link).await {
                        Ok(view) => display_playlist(&playlists, &document, view),
                        Err(e) => display_api_error(&document, &e),
                    }
                })
            });
        }
        pagination.append_child(&button)?;
    }
    Ok(())
}

fn confirm_delete_vote(playlists: &Playlists, song_code: &str) -> Result<(), JsValue> {
    let document = current_document();
    playlists.request_delete(song_code);
    by_id::<HtmlButtonElement>(&document, "cancel-delete-vote")?.set_disabled(false);
    by_id::<HtmlButtonElement>(&document, "delete-vote")?.set_disabled(false);
    show(&by_id(&document, "delete-confirm-modal")?)
}

fn confirm_add_context(document: &Document, prompt: &AddContextPrompt) -> Result<(), JsValue> {
    let help: HtmlElement = by_id(document, "add-context-help-text")?;
    let unavailable: HtmlElement = by_id(document, "add-context-unavailable-text")?;
    let button: HtmlElement = by_id(document, "add-context-to-vote-button")?;
    let input: HtmlElement = by_id(document, "add-context-input")?;
    button.set_attribute(SONG_CODE_ATTRIBUTE, &prompt.song_code)?;
    clear_children(&input);

    let unavailable_now = prompt.is_unavailable();
    help.set_hidden(unavailable_now);
    unavailable.set_hidden(!unavailable_now);
    button.set_hidden(unavailable_now);
    input.set_hidden(unavailable_now);
    for context in &prompt.contexts {
        let option = document.create_element("option")?;
        option.set_attribute("value", context.as_str())?;
        option.set_text_content(Some(context.label()));
        input.append_child(&option)?;
    }
    show(&by_id(document, "add-context-confirm-modal")?)
}
