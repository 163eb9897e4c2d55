//! Builds the pieces of the browse and playlist pages out of API responses.
//!
//! Nothing here touches the document; each function returns a plain
//! description that the page glue turns into elements.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::ApiError;
use crate::model::{Analytics, Context, Paginated, Song, VoteRecord};

pub const EMBED_URL: &str = "https://open.spotify.com/embed/track/";
pub const EMBED_ALLOW: &str = "encrypted-media https://open.spotify.com;";

fn track_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:spotify:track:|https://open\.spotify\.com/track/)([[:alnum:]]+)")
            .expect("track id pattern")
    })
}

/// Source of the embedded player for a song.
pub fn play_button_src(song: &Song) -> String {
    let id = track_id_pattern()
        .captures(&song.code)
        .and_then(|captures| captures.get(1))
        .map_or(song.code.as_str(), |id| id.as_str());
    format!("{}{}", EMBED_URL, id)
}

pub fn song_element_id(song_code: &str) -> String {
    format!("song-{}", song_code)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ButtonAction {
    Vote(bool),
    Delete,
    AddContext,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ButtonView {
    pub action: ButtonAction,
    pub label: &'static str,
    pub class_name: String,
}

impl ButtonView {
    fn vote(vote: bool) -> Self {
        Self {
            action: ButtonAction::Vote(vote),
            label: if vote { "Yes" } else { "No" },
            class_name: format!("vote-button vote-button-{}", vote),
        }
    }

    fn delete() -> Self {
        Self {
            action: ButtonAction::Delete,
            label: "Delete",
            class_name: "vote-button vote-button-delete".to_owned(),
        }
    }

    fn add_context() -> Self {
        Self {
            action: ButtonAction::AddContext,
            label: "Add Context",
            class_name: "vote-button vote-button-context".to_owned(),
        }
    }
}

/// Class added to the button the user picked once a vote went through.
pub fn chosen_vote_class(vote: bool) -> String {
    format!("vote-button-{}-chosen", vote)
}

#[derive(Clone, Debug, PartialEq)]
pub struct SongCard {
    pub element_id: String,
    pub song_code: String,
    pub play_src: String,
    pub description: Option<String>,
    pub buttons: Vec<ButtonView>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PaginationButton {
    pub label: &'static str,
    pub class_name: &'static str,
    pub link: Option<String>,
    pub disabled: bool,
}

impl PaginationButton {
    fn new(label: &'static str, class_name: &'static str, link: Option<String>) -> Self {
        Self {
            label,
            class_name,
            disabled: link.is_none(),
            link,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaylistView {
    pub no_results: bool,
    pub cards: Vec<SongCard>,
    pub pagination: Vec<PaginationButton>,
}

pub fn browse_view(songs: &[Song]) -> PlaylistView {
    if songs.is_empty() {
        return PlaylistView {
            no_results: true,
            ..PlaylistView::default()
        };
    }
    let cards = songs
        .iter()
        .map(|song| SongCard {
            element_id: song_element_id(&song.code),
            song_code: song.code.clone(),
            play_src: play_button_src(song),
            description: None,
            buttons: vec![ButtonView::vote(true), ButtonView::vote(false)],
        })
        .collect();
    PlaylistView {
        no_results: false,
        cards,
        pagination: Vec::new(),
    }
}

pub fn emotion_playlist_view(page: &Paginated<VoteRecord>) -> PlaylistView {
    if page.count == 0 {
        return PlaylistView {
            no_results: true,
            ..PlaylistView::default()
        };
    }
    let cards = page
        .results
        .iter()
        .map(|vote| SongCard {
            element_id: song_element_id(&vote.song.code),
            song_code: vote.song.code.clone(),
            play_src: play_button_src(&vote.song),
            description: Some(vote.description.clone()),
            buttons: vec![ButtonView::delete(), ButtonView::add_context()],
        })
        .collect();
    let pagination = if page.next.is_some() || page.previous.is_some() {
        vec![
            PaginationButton::new("Previous", "previous-button", page.previous.clone()),
            PaginationButton::new("Next", "next-button", page.next.clone()),
        ]
    } else {
        Vec::new()
    };
    PlaylistView {
        no_results: false,
        cards,
        pagination,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AnalyticsView {
    pub emotion_name: String,
    pub energy: String,
    pub valence: String,
    pub danceability: String,
    pub total_songs: String,
}

pub fn analytics_view(analytics: &Analytics) -> AnalyticsView {
    let attribute = |value: Option<f64>| value.map(|v| to_precision(v, 2)).unwrap_or_default();
    AnalyticsView {
        emotion_name: analytics.emotion_name.clone(),
        energy: attribute(analytics.energy),
        valence: attribute(analytics.valence),
        danceability: attribute(analytics.danceability),
        total_songs: analytics.total_songs.to_string(),
    }
}

/// Formats `value` with `digits` significant digits.
pub fn to_precision(value: f64, digits: usize) -> String {
    let digits = digits.max(1);
    if value == 0.0 || !value.is_finite() {
        return format!("{:.*}", digits - 1, value);
    }
    // exponent after rounding, so 0.999 counts as 1.0
    let scientific = format!("{:.*e}", digits - 1, value);
    let exponent: i64 = scientific
        .rsplit_once('e')
        .and_then(|(_, exponent)| exponent.parse().ok())
        .unwrap_or(0);
    let decimals = (digits as i64 - 1 - exponent).max(0) as usize;
    format!("{:.*}", decimals, value)
}

#[derive(Clone, Debug, PartialEq)]
pub struct ErrorModal {
    pub message: String,
    pub errors: Vec<String>,
}

impl From<&ApiError> for ErrorModal {
    fn from(error: &ApiError) -> Self {
        Self {
            message: error.message().to_owned(),
            errors: error.validation_errors().to_vec(),
        }
    }
}

/// Jitter slider value shown as a share of its maximum, e.g. `0.1` of `0.5`
/// reads `20%`.
pub fn jitter_display(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return "0%".to_owned();
    }
    format!("{}%", (value / max * 100.0).round())
}

/// Contexts a song has not been voted under yet.
pub fn contexts_to_add(existing: &[String]) -> Vec<Context> {
    Context::ALL
        .into_iter()
        .filter(|context| !existing.iter().any(|e| e == context.as_str()))
        .collect()
}

pub fn add_context_success(context: Context) -> String {
    format!(
        "Successfully added song to your {} playlist!",
        context.as_str().to_lowercase()
    )
}
