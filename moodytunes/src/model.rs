use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Song {
    pub code: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

impl Song {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EmotionOption {
    pub name: String,
    pub full_name: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Options {
    #[serde(default)]
    pub emotions: Vec<EmotionOption>,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Situation a vote was cast in.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Context {
    Party,
    Relax,
    Work,
    Exercise,
    Other,
}

impl Context {
    pub const ALL: [Context; 5] = [
        Context::Party,
        Context::Relax,
        Context::Work,
        Context::Exercise,
        Context::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Context::Party => "PARTY",
            Context::Relax => "RELAX",
            Context::Work => "WORK",
            Context::Exercise => "EXERCISE",
            Context::Other => "OTHER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Context::Party => "Listening to music at a party",
            Context::Relax => "Listening to music to relax",
            Context::Work => "Listening to music while working on a task",
            Context::Exercise => "Listening to music while exercising",
            Context::Other => "Doing something else",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown context {0:?}")]
pub struct UnknownContext(pub String);

impl FromStr for Context {
    type Err = UnknownContext;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Context::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownContext(s.to_owned()))
    }
}

/// Body of `POST /tunes/vote/`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Vote {
    pub song_code: String,
    pub emotion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub vote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Body of `DELETE /tunes/vote/`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DeleteVote {
    pub song_code: String,
    pub emotion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct VoteRecord {
    pub song: Song,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

// Older revisions of the browse endpoint return the bare list.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BrowsePlaylist {
    Songs(Vec<Song>),
    Traced {
        results: Vec<Song>,
        #[serde(default)]
        trace_id: Option<String>,
    },
}

impl BrowsePlaylist {
    pub fn songs(&self) -> &[Song] {
        match self {
            BrowsePlaylist::Traced { results, .. } => results,
            BrowsePlaylist::Songs(songs) => songs,
        }
    }

    pub fn trace_id(&self) -> Option<&str> {
        match self {
            BrowsePlaylist::Traced { trace_id, .. } => trace_id.as_deref(),
            BrowsePlaylist::Songs(_) => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LastPlaylist {
    pub emotion: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub playlist: Vec<Song>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Analytics {
    pub emotion: String,
    pub emotion_name: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub danceability: Option<f64>,
    pub total_songs: u64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct VoteInfo {
    #[serde(default)]
    pub contexts: Vec<String>,
}
