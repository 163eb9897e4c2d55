//! Page controllers. Each owns the page's session context and returns
//! structured results for the DOM glue to apply.

pub mod accounts;
pub mod browse;
pub mod export;
pub mod playlists;

pub use browse::{BrowseController, BrowseForm, VoteOutcome};
pub use playlists::{AddContextPrompt, PlaylistController, PlaylistForm, PlaylistResults};
