use futures::join;
use log::{debug, info};
use std::cell::RefCell;

use crate::client::{MoodyTunesClient, PlaylistQuery, Transport};
use crate::curator::{
    add_context_success, analytics_view, contexts_to_add, emotion_playlist_view, AnalyticsView,
    PlaylistView,
};
use crate::error::ApiError;
use crate::model::{Context, DeleteVote, Vote};
use crate::session::{PageSession, SessionStore};

/// Values read from the playlist form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaylistForm {
    pub emotion: String,
    pub genre: Option<String>,
    pub context: Option<String>,
    pub artist: Option<String>,
}

impl From<PlaylistForm> for PlaylistQuery {
    fn from(form: PlaylistForm) -> Self {
        PlaylistQuery {
            emotion: form.emotion,
            genre: form.genre,
            context: form.context,
            artist: form.artist,
        }
    }
}

/// The playlist and the analytics panel load independently; either can fail
/// without hiding the other.
#[derive(Debug)]
pub struct PlaylistResults {
    pub playlist: Result<PlaylistView, ApiError>,
    pub analytics: Result<AnalyticsView, ApiError>,
}

impl PlaylistResults {
    /// The failure to put in the error modal. The modal holds one error, and
    /// the playlist's wins since its validation errors name the form fields.
    pub fn error(&self) -> Option<&ApiError> {
        self.playlist
            .as_ref()
            .err()
            .or_else(|| self.analytics.as_ref().err())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AddContextPrompt {
    pub song_code: String,
    pub contexts: Vec<Context>,
}

impl AddContextPrompt {
    /// The song already has every context; the modal shows a notice instead.
    pub fn is_unavailable(&self) -> bool {
        self.contexts.is_empty()
    }
}

pub struct PlaylistController<T, S> {
    client: MoodyTunesClient<T>,
    session: PageSession<S>,
    pending_delete: RefCell<Option<String>>,
}

impl<T: Transport, S: SessionStore> PlaylistController<T, S> {
    pub fn new(client: MoodyTunesClient<T>, session: PageSession<S>) -> Self {
        Self {
            client,
            session,
            pending_delete: RefCell::new(None),
        }
    }

    pub fn session(&self) -> &PageSession<S> {
        &self.session
    }

    pub async fn generate(&self, form: PlaylistForm) -> PlaylistResults {
        let query = PlaylistQuery::from(form);
        self.session.set_last_playlist_query(&query);
        self.fetch(&query).await
    }

    /// Re-runs the last query with the parameters it was issued with.
    pub async fn refresh(&self) -> Option<PlaylistResults> {
        let query = self.session.last_playlist_query()?;
        Some(self.fetch(&query).await)
    }

    async fn fetch(&self, query: &PlaylistQuery) -> PlaylistResults {
        let (playlist, analytics) = join!(
            self.client.get_emotion_playlist(query),
            self.client.get_user_analytics(query)
        );
        PlaylistResults {
            playlist: playlist.map(|page| {
                info!("showing {} of {} votes for {}", page.results.len(), page.count, query.emotion);
                emotion_playlist_view(&page)
            }),
            analytics: analytics.map(|analytics| analytics_view(&analytics)),
        }
    }

    /// Follows a pagination button.
    pub async fn page(&self, link: &str) -> Result<PlaylistView, ApiError> {
        let page = self.client.get_playlist_page(link).await?;
        Ok(emotion_playlist_view(&page))
    }

    /// Remembers which song the delete confirmation modal is about.
    pub fn request_delete(&self, song_code: &str) {
        *self.pending_delete.borrow_mut() = Some(song_code.to_owned());
    }

    pub fn cancel_delete(&self) {
        self.pending_delete.borrow_mut().take();
    }

    pub fn pending_delete(&self) -> Option<String> {
        self.pending_delete.borrow().clone()
    }

    /// Deletes the vote the modal was opened for, then reloads the playlist
    /// with the cached parameters.
    pub async fn confirm_delete(&self) -> Result<Option<PlaylistResults>, ApiError> {
        let Some(song_code) = self.pending_delete.borrow_mut().take() else {
            return Ok(None);
        };
        let Some(query) = self.session.last_playlist_query() else {
            debug!("no playlist shown, nothing to delete {} from", song_code);
            return Ok(None);
        };
        self.client
            .delete_vote(&DeleteVote {
                song_code,
                emotion: query.emotion.clone(),
                context: query.context.clone(),
            })
            .await?;
        Ok(Some(self.fetch(&query).await))
    }

    /// Contexts the song can still be added to for the current emotion.
    pub async fn contexts_for(&self, song_code: &str) -> Result<Option<AddContextPrompt>, ApiError> {
        let Some(query) = self.session.last_playlist_query() else {
            return Ok(None);
        };
        let info = self.client.get_vote_info(song_code, &query.emotion).await?;
        Ok(Some(AddContextPrompt {
            song_code: song_code.to_owned(),
            contexts: contexts_to_add(&info.contexts),
        }))
    }

    /// Votes the song up under another context and returns the message for
    /// the success modal.
    pub async fn add_context(&self, song_code: &str, context: Context) -> Result<Option<String>, ApiError> {
        let Some(query) = self.session.last_playlist_query() else {
            return Ok(None);
        };
        self.client
            .post_vote(&Vote {
                song_code: song_code.to_owned(),
                emotion: query.emotion,
                context: Some(context.as_str().to_owned()),
                description: None,
                vote: true,
                trace_id: None,
            })
            .await?;
        Ok(Some(add_context_success(context)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;
    use crate::testing::{client, MockTransport};
    use futures::executor::block_on;

    const PAGE: &str = r#"{
        "count": 2,
        "next": "https://moodytunes.test/tunes/playlist/?emotion=HPY&page=2",
        "previous": null,
        "results": [{"song": {"code": "spotify:track:a"}, "description": "sunny", "emotion": "HPY"}]
    }"#;
    const ANALYTICS: &str = r#"{"emotion": "HPY", "emotion_name": "Happy", "energy": 0.5, "valence": 0.75, "danceability": 0.25, "total_songs": 2}"#;

    fn controller(transport: MockTransport) -> PlaylistController<MockTransport, MemoryStore> {
        PlaylistController::new(client(transport), PageSession::new(MemoryStore::new()))
    }

    fn form() -> PlaylistForm {
        PlaylistForm {
            emotion: "HPY".into(),
            genre: Some("funk".into()),
            context: Some("PARTY".into()),
            artist: None,
        }
    }

    #[test]
    fn generate_loads_playlist_and_analytics() {
        let playlists = controller(MockTransport::new().respond(200, PAGE).respond(200, ANALYTICS));
        let results = block_on(playlists.generate(form()));

        let view = results.playlist.unwrap();
        assert_eq!(view.cards.len(), 1);
        assert_eq!(view.pagination.len(), 2);
        assert_eq!(results.analytics.unwrap().energy, "0.50");
        assert_eq!(
            playlists.client.transport().urls(),
            [
                "https://moodytunes.test/tunes/playlist/?emotion=HPY&genre=funk&context=PARTY",
                "https://moodytunes.test/accounts/analytics/?emotion=HPY&genre=funk&context=PARTY",
            ]
        );
    }

    #[test]
    fn analytics_failure_does_not_hide_playlist() {
        let playlists = controller(
            MockTransport::new()
                .respond(200, PAGE)
                .respond(400, r#"{"errors": {"genre": ["Unknown genre"]}}"#),
        );
        let results = block_on(playlists.generate(form()));
        assert!(results.playlist.is_ok());
        let error = results.analytics.unwrap_err();
        assert_eq!(error.validation_errors(), ["genre: Unknown genre".to_owned()]);
    }

    #[test]
    fn playlist_error_is_reported_over_analytics_error() {
        let playlists = controller(
            MockTransport::new()
                .respond(400, r#"{"errors": {"emotion": ["Bad emotion"]}}"#)
                .respond(500, ""),
        );
        let results = block_on(playlists.generate(form()));
        let error = results.error().unwrap();
        assert_eq!(error.message(), "Invalid request parameters");
        assert_eq!(error.validation_errors(), ["emotion: Bad emotion".to_owned()]);
    }

    #[test]
    fn delete_refetches_with_same_params() {
        let playlists = controller(
            MockTransport::new()
                .respond(200, PAGE)
                .respond(200, ANALYTICS)
                .respond(204, "")
                .respond(200, PAGE)
                .respond(200, ANALYTICS),
        );
        block_on(playlists.generate(form()));
        playlists.request_delete("spotify:track:a");
        let results = block_on(playlists.confirm_delete()).unwrap().unwrap();
        assert!(results.playlist.is_ok());

        let requests = playlists.client.transport().requests();
        assert_eq!(requests.len(), 5);
        assert_eq!(requests[2].body.as_deref(), Some(r#"{"song_code":"spotify:track:a","emotion":"HPY","context":"PARTY"}"#));
        assert_eq!(requests[3].url, requests[0].url);
        assert_eq!(requests[4].url, requests[1].url);
        assert_eq!(playlists.pending_delete(), None);
    }

    #[test]
    fn cancelled_delete_sends_nothing() {
        let playlists = controller(MockTransport::new());
        playlists.request_delete("spotify:track:a");
        playlists.cancel_delete();
        assert!(block_on(playlists.confirm_delete()).unwrap().is_none());
        assert!(playlists.client.transport().requests().is_empty());
    }

    #[test]
    fn refresh_without_query_is_a_no_op() {
        let playlists = controller(MockTransport::new());
        assert!(block_on(playlists.refresh()).is_none());
    }

    #[test]
    fn offers_contexts_not_yet_voted() {
        let playlists = controller(
            MockTransport::new()
                .respond(200, PAGE)
                .respond(200, ANALYTICS)
                .respond(200, r#"{"contexts": ["PARTY", "RELAX", "WORK", "EXERCISE", "OTHER"]}"#)
                .respond(200, r#"{"contexts": ["PARTY"]}"#),
        );
        block_on(playlists.generate(form()));
        let prompt = block_on(playlists.contexts_for("spotify:track:a")).unwrap().unwrap();
        assert!(prompt.is_unavailable());
        let prompt = block_on(playlists.contexts_for("spotify:track:a")).unwrap().unwrap();
        assert_eq!(prompt.contexts.first(), Some(&Context::Relax));
        assert_eq!(prompt.contexts.len(), 4);
    }

    #[test]
    fn add_context_posts_positive_vote() {
        let playlists = controller(
            MockTransport::new()
                .respond(200, PAGE)
                .respond(200, ANALYTICS)
                .respond(201, "{}"),
        );
        block_on(playlists.generate(form()));
        let message = block_on(playlists.add_context("spotify:track:a", Context::Work))
            .unwrap()
            .unwrap();
        assert_eq!(message, "Successfully added song to your work playlist!");
        let request = &playlists.client.transport().requests()[2];
        assert_eq!(
            request.body.as_deref(),
            Some(r#"{"song_code":"spotify:track:a","emotion":"HPY","context":"WORK","vote":true}"#)
        );
    }

    #[test]
    fn pagination_follows_link() {
        let playlists = controller(MockTransport::new().respond(
            200,
            r#"{"count": 2, "next": null, "previous": "https://moodytunes.test/tunes/playlist/?emotion=HPY", "results": [{"song": {"code": "spotify:track:b"}}]}"#,
        ));
        let view = block_on(playlists.page("https://moodytunes.test/tunes/playlist/?emotion=HPY&page=2")).unwrap();
        assert_eq!(view.cards[0].song_code, "spotify:track:b");
        assert!(view.pagination[1].disabled);
    }
}
