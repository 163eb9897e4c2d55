pub mod accounts;
pub mod browse;
pub mod export;
pub mod playlists;
