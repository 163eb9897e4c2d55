use percent_encoding::percent_decode_str;

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Looks a cookie up by name in a `document.cookie` style string.
pub fn get_cookie(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix(name)?.strip_prefix('='))
        .map(|value| percent_decode_str(value).decode_utf8_lossy().into_owned())
}

/// The page config element wins; the session cookie is the fallback.
pub fn resolve_csrf_token(config_token: Option<&str>, cookies: &str) -> Option<String> {
    match config_token {
        Some(token) if !token.is_empty() => Some(token.to_owned()),
        _ => get_cookie(cookies, CSRF_COOKIE),
    }
}
