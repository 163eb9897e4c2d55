use url::Url;

use crate::error::ApiError;

pub const ONBOARDING_PATH: &str = "/moodytunes/browse/?onboarding=true";
pub const SPOTIFY_AUTHORIZE_PATH: &str = "/moodytunes/spotify/authorize/";

/// Where accepting the onboarding prompt sends the user.
pub fn onboarding_url(origin: &Url) -> Result<Url, ApiError> {
    Ok(origin.join(ONBOARDING_PATH)?)
}

pub fn spotify_authorize_url(origin: &Url) -> Result<Url, ApiError> {
    Ok(origin.join(SPOTIFY_AUTHORIZE_PATH)?)
}

/// The Spotify prompt opens when the server redirected with
/// `has_spotify_auth=False`.
pub fn should_prompt_spotify_auth(search: &str) -> bool {
    url::form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
        .any(|(key, value)| key == "has_spotify_auth" && value == "False")
}

pub fn passwords_mismatch(password: &str, confirmation: &str) -> bool {
    !password.is_empty() && password != confirmation
}

/// Input type after the "show password" checkbox is clicked.
pub fn toggled_password_type(current: &str) -> &'static str {
    if current == "password" {
        "text"
    } else {
        "password"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirects_stay_on_origin() {
        let origin = Url::parse("https://moodytunes.test").unwrap();
        assert_eq!(
            onboarding_url(&origin).unwrap().as_str(),
            "https://moodytunes.test/moodytunes/browse/?onboarding=true"
        );
        assert_eq!(
            spotify_authorize_url(&origin).unwrap().as_str(),
            "https://moodytunes.test/moodytunes/spotify/authorize/"
        );
    }

    #[test]
    fn spotify_prompt_only_for_missing_auth() {
        assert!(should_prompt_spotify_auth("?has_spotify_auth=False"));
        assert!(should_prompt_spotify_auth("page=2&has_spotify_auth=False"));
        assert!(!should_prompt_spotify_auth("?has_spotify_auth=True"));
        assert!(!should_prompt_spotify_auth(""));
    }

    #[test]
    fn password_confirmation() {
        assert!(passwords_mismatch("hunter2", "hunter3"));
        assert!(!passwords_mismatch("hunter2", "hunter2"));
        assert!(!passwords_mismatch("", "anything"));
    }

    #[test]
    fn show_password_toggles() {
        assert_eq!(toggled_password_type("password"), "text");
        assert_eq!(toggled_password_type("text"), "password");
    }
}
