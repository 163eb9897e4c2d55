use log::{debug, info};
use std::cell::RefCell;
use std::collections::HashSet;

use crate::client::{BrowseQuery, MoodyTunesClient, Transport};
use crate::curator::{browse_view, PlaylistView};
use crate::error::ApiError;
use crate::model::{Song, Vote};
use crate::session::{PageSession, SessionStore};

/// Values read from the browse form when the user asks for a new playlist.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BrowseForm {
    pub emotion: String,
    pub jitter: Option<f64>,
    pub genre: Option<String>,
    pub artist: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoteOutcome {
    pub song_code: String,
    pub chosen: bool,
    /// Every song on the page has now been voted on.
    pub all_voted: bool,
}

#[derive(Default)]
struct Shown {
    /// Bumped whenever the page shows a new playlist.
    generation: u64,
    emotion: Option<String>,
    songs: HashSet<String>,
    voted: HashSet<String>,
    in_flight: HashSet<String>,
}

impl Shown {
    fn replace(&mut self, emotion: &str, songs: &[Song]) {
        self.generation += 1;
        self.emotion = Some(emotion.to_owned());
        self.songs = songs.iter().map(|song| song.code.clone()).collect();
        self.voted.clear();
        self.in_flight.clear();
    }
}

pub struct BrowseController<T, S> {
    client: MoodyTunesClient<T>,
    session: PageSession<S>,
    shown: RefCell<Shown>,
}

impl<T: Transport, S: SessionStore> BrowseController<T, S> {
    /// Starts a fresh browse session, forgetting values from earlier visits.
    pub fn new(client: MoodyTunesClient<T>, session: PageSession<S>) -> Self {
        session.clear();
        Self {
            client,
            session,
            shown: RefCell::new(Shown::default()),
        }
    }

    pub fn session(&self) -> &PageSession<S> {
        &self.session
    }

    pub fn set_context(&self, context: &str, description: &str) {
        self.session.set_context(context, description);
    }

    pub fn clear_context(&self) {
        self.session.set_context("", "");
    }

    /// Requests a playlist for the values the user just submitted.
    pub async fn generate(&self, form: BrowseForm) -> Result<PlaylistView, ApiError> {
        let query = BrowseQuery {
            emotion: form.emotion,
            jitter: form.jitter,
            limit: None,
            genre: form.genre,
            context: self.session.context(),
            description: self.session.description(),
            artist: form.artist,
        };
        self.session.set_last_browse_query(&query);
        self.fetch(&query).await
    }

    /// Repeats the last request with the form values it was made with and the
    /// context currently in the session. `None` if nothing was requested yet.
    pub async fn refresh(&self) -> Result<Option<PlaylistView>, ApiError> {
        let Some(mut query) = self.session.last_browse_query() else {
            return Ok(None);
        };
        query.context = self.session.context();
        query.description = self.session.description();
        self.fetch(&query).await.map(Some)
    }

    /// Shows the last playlist the backend generated, restoring the emotion
    /// and context it was generated for.
    pub async fn load_last(&self) -> Result<PlaylistView, ApiError> {
        let last = self.client.get_cached_browse_playlist().await?;
        self.session.set_context(
            last.context.as_deref().unwrap_or_default(),
            last.description.as_deref().unwrap_or_default(),
        );
        // the stored trace belongs to a different playlist
        self.session.set_trace_id(None);
        let mut query = self.session.last_browse_query().unwrap_or_default();
        query.emotion = last.emotion.clone();
        self.session.set_last_browse_query(&query);
        self.shown.borrow_mut().replace(&last.emotion, &last.playlist);
        Ok(browse_view(&last.playlist))
    }

    async fn fetch(&self, query: &BrowseQuery) -> Result<PlaylistView, ApiError> {
        let playlist = self.client.get_browse_playlist(query).await?;
        self.session.set_trace_id(playlist.trace_id());
        self.shown
            .borrow_mut()
            .replace(&query.emotion, playlist.songs());
        info!(
            "showing {} songs for {}",
            playlist.songs().len(),
            query.emotion
        );
        Ok(browse_view(playlist.songs()))
    }

    /// Records the user's vote for a song on the page.
    ///
    /// Returns `None` without calling the API when the song is not shown or
    /// already has a vote (or one in flight), so the song's controls are only
    /// disabled once. Also `None` when another playlist replaced the page
    /// while the vote was in flight.
    pub async fn vote(&self, song_code: &str, vote: bool) -> Result<Option<VoteOutcome>, ApiError> {
        let (generation, emotion) = {
            let mut shown = self.shown.borrow_mut();
            let open = shown.songs.contains(song_code)
                && !shown.voted.contains(song_code)
                && !shown.in_flight.contains(song_code);
            match (open, shown.emotion.clone()) {
                (true, Some(emotion)) => {
                    shown.in_flight.insert(song_code.to_owned());
                    (shown.generation, emotion)
                }
                _ => {
                    debug!("ignoring repeated vote for {}", song_code);
                    return Ok(None);
                }
            }
        };
        let result = self
            .client
            .post_vote(&Vote {
                song_code: song_code.to_owned(),
                emotion,
                context: self.session.context(),
                description: self.session.description(),
                vote,
                trace_id: self.session.trace_id(),
            })
            .await;
        let mut shown = self.shown.borrow_mut();
        if shown.generation != generation {
            debug!("playlist replaced while voting on {}", song_code);
            return result.map(|()| None);
        }
        shown.in_flight.remove(song_code);
        result?;
        shown.voted.insert(song_code.to_owned());
        let all_voted = shown.songs.iter().all(|song| shown.voted.contains(song));
        Ok(Some(VoteOutcome {
            song_code: song_code.to_owned(),
            chosen: vote,
            all_voted,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;
    use crate::testing::{client, MockTransport};
    use futures::executor::block_on;

    const TWO_SONGS: &str =
        r#"{"trace_id": "t-1", "results": [{"code": "spotify:track:a"}, {"code": "spotify:track:b"}]}"#;

    fn controller(transport: MockTransport) -> BrowseController<MockTransport, MemoryStore> {
        BrowseController::new(client(transport), PageSession::new(MemoryStore::new()))
    }

    fn form() -> BrowseForm {
        BrowseForm {
            emotion: "HPY".into(),
            jitter: Some(0.15),
            genre: None,
            artist: Some("Prince".into()),
        }
    }

    #[test]
    fn generate_sends_form_and_session_context() {
        let browse = controller(MockTransport::new().respond(200, TWO_SONGS));
        browse.set_context("WORK", "deadline");
        let view = block_on(browse.generate(form())).unwrap();

        assert_eq!(view.cards.len(), 2);
        assert_eq!(browse.session().trace_id().as_deref(), Some("t-1"));
        assert_eq!(
            browse.client.transport().urls(),
            ["https://moodytunes.test/tunes/browse/?emotion=HPY&jitter=0.15&context=WORK&description=deadline&artist=Prince"]
        );
    }

    #[test]
    fn empty_playlist_has_no_cards() {
        let browse = controller(MockTransport::new().respond(200, "[]"));
        let view = block_on(browse.generate(form())).unwrap();
        assert!(view.no_results);
        assert!(view.cards.is_empty());
    }

    #[test]
    fn vote_disables_song_exactly_once() {
        let browse = controller(
            MockTransport::new()
                .respond(200, TWO_SONGS)
                .respond(201, "{}")
                .respond(201, "{}"),
        );
        block_on(browse.generate(form())).unwrap();

        let outcome = block_on(browse.vote("spotify:track:a", true)).unwrap();
        assert_eq!(
            outcome,
            Some(VoteOutcome {
                song_code: "spotify:track:a".into(),
                chosen: true,
                all_voted: false,
            })
        );
        assert_eq!(block_on(browse.vote("spotify:track:a", false)).unwrap(), None);
        assert_eq!(block_on(browse.vote("spotify:track:z", false)).unwrap(), None);

        let outcome = block_on(browse.vote("spotify:track:b", false)).unwrap().unwrap();
        assert!(outcome.all_voted);
        // one browse request and one vote per song
        assert_eq!(browse.client.transport().requests().len(), 3);
    }

    #[test]
    fn vote_body_carries_emotion_context_and_trace() {
        let browse = controller(MockTransport::new().respond(200, TWO_SONGS).respond(201, "{}"));
        browse.set_context("PARTY", "");
        block_on(browse.generate(form())).unwrap();
        block_on(browse.vote("spotify:track:b", true)).unwrap();

        let request = &browse.client.transport().requests()[1];
        let body: serde_json::Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "song_code": "spotify:track:b",
                "emotion": "HPY",
                "context": "PARTY",
                "vote": true,
                "trace_id": "t-1",
            })
        );
    }

    #[test]
    fn failed_vote_can_be_retried_by_the_user() {
        let browse = controller(
            MockTransport::new()
                .respond(200, TWO_SONGS)
                .respond(500, "")
                .respond(201, "{}"),
        );
        block_on(browse.generate(form())).unwrap();
        let error = block_on(browse.vote("spotify:track:a", true)).unwrap_err();
        assert_eq!(error.message(), "Server returned an error");
        assert!(block_on(browse.vote("spotify:track:a", true)).unwrap().is_some());
    }

    #[test]
    fn refresh_repeats_cached_query() {
        let browse = controller(MockTransport::new().respond(200, TWO_SONGS).respond(200, "[]"));
        assert_eq!(block_on(browse.refresh()).unwrap(), None);
        block_on(browse.generate(form())).unwrap();
        block_on(browse.refresh()).unwrap().unwrap();
        let urls = browse.client.transport().urls();
        assert_eq!(urls[0], urls[1]);
    }

    #[test]
    fn load_last_restores_emotion_and_context() {
        let browse = controller(
            MockTransport::new()
                .respond(
                    200,
                    r#"{"emotion": "MEL", "context": "RELAX", "description": null, "playlist": [{"code": "spotify:track:c"}]}"#,
                )
                .respond(201, "{}"),
        );
        let view = block_on(browse.load_last()).unwrap();
        assert_eq!(view.cards[0].song_code, "spotify:track:c");
        assert_eq!(browse.session().context().as_deref(), Some("RELAX"));
        assert_eq!(browse.session().last_browse_query().unwrap().emotion, "MEL");

        let outcome = block_on(browse.vote("spotify:track:c", true)).unwrap().unwrap();
        assert!(outcome.all_voted);
        let requests = browse.client.transport().requests();
        assert_eq!(requests[0].url.as_str(), "https://moodytunes.test/tunes/browse/last/");
        assert!(requests[1].body.as_deref().unwrap().contains(r#""emotion":"MEL""#));
    }

    #[test]
    fn last_playlist_votes_drop_previous_trace() {
        let browse = controller(
            MockTransport::new()
                .respond(200, TWO_SONGS)
                .respond(
                    200,
                    r#"{"emotion": "MEL", "context": null, "description": null, "playlist": [{"code": "spotify:track:c"}]}"#,
                )
                .respond(201, "{}"),
        );
        block_on(browse.generate(form())).unwrap();
        block_on(browse.load_last()).unwrap();
        assert_eq!(browse.session().trace_id(), None);

        block_on(browse.vote("spotify:track:c", true)).unwrap().unwrap();
        let request = &browse.client.transport().requests()[2];
        assert_eq!(
            request.body.as_deref(),
            Some(r#"{"song_code":"spotify:track:c","emotion":"MEL","vote":true}"#)
        );
    }

    #[test]
    fn vote_landing_after_new_playlist_is_dropped() {
        let browse = controller(
            MockTransport::new()
                .respond(200, TWO_SONGS)
                .respond(200, TWO_SONGS)
                .respond(201, "{}")
                .respond(201, "{}")
                .deferred(),
        );
        block_on(browse.generate(form())).unwrap();

        // the new playlist arrives while the vote is still waiting on the server
        let (view, outcome) = block_on(async {
            futures::join!(browse.generate(form()), browse.vote("spotify:track:a", true))
        });
        assert_eq!(view.unwrap().cards.len(), 2);
        assert_eq!(outcome.unwrap(), None);

        // the song is open again on the new playlist
        let outcome = block_on(browse.vote("spotify:track:a", false)).unwrap().unwrap();
        assert!(!outcome.all_voted);
        assert_eq!(browse.client.transport().requests().len(), 4);
    }

    #[test]
    fn clearing_context_keeps_cached_query() {
        let browse = controller(MockTransport::new().respond(200, "[]"));
        browse.set_context("WORK", "x");
        block_on(browse.generate(form())).unwrap();
        browse.clear_context();
        assert_eq!(browse.session().context(), None);
        assert!(browse.session().last_browse_query().is_some());
    }
}
