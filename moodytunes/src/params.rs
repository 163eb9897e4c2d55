use indexmap::IndexMap;
use url::Url;

use crate::error::ApiError;

/// Query parameters for an API request.
///
/// Optional values that were never set are kept as `None` until
/// [`strip_null_params`] drops them, so a request can be built from the same
/// set of names regardless of which ones the page filled in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params(IndexMap<String, Option<String>>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert<V: ToString>(&mut self, key: &str, value: Option<V>) {
        self.0
            .insert(key.to_owned(), value.map(|value| value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|value| value.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_deref()))
    }
}

/// Drops every parameter whose value is absent, keeping the rest untouched.
pub fn strip_null_params(mut params: Params) -> Params {
    params.0.retain(|_, value| value.is_some());
    params
}

/// Joins `endpoint` onto `origin` and appends each present parameter as a
/// query pair, in insertion order.
pub fn build_request_url(origin: &Url, endpoint: &str, params: &Params) -> Result<Url, ApiError> {
    let mut url = origin.join(endpoint)?;
    let mut present = params
        .iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .peekable();
    if present.peek().is_some() {
        url.query_pairs_mut().extend_pairs(present);
    }
    Ok(url)
}

/// Treats an empty form value as unset.
pub fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Url {
        Url::parse("https://moodytunes.test").unwrap()
    }

    #[test]
    fn strip_removes_only_absent_values() {
        let params = Params::new()
            .with("emotion", Some("HPY"))
            .with("genre", None::<String>)
            .with("jitter", Some(0.25))
            .with("artist", None::<String>)
            .with("context", Some(""));
        let stripped = strip_null_params(params.clone());

        assert_eq!(stripped.len(), 3);
        for (key, value) in params.iter() {
            match value {
                Some(value) => assert_eq!(stripped.get(key), Some(value)),
                None => assert!(!stripped.contains_key(key)),
            }
        }
    }

    #[test]
    fn strip_is_a_no_op_on_empty_params() {
        assert!(strip_null_params(Params::new()).is_empty());
    }

    #[test]
    fn url_without_params_has_no_query() {
        let url = build_request_url(&origin(), "/tunes/options/", &Params::new()).unwrap();
        assert_eq!(url.as_str(), "https://moodytunes.test/tunes/options/");
    }

    #[test]
    fn url_appends_present_params_in_order() {
        let params = Params::new()
            .with("emotion", Some("HPY"))
            .with("genre", None::<String>)
            .with("jitter", Some(0.1))
            .with("artist", Some("Sly & the Family Stone"));
        let url = build_request_url(&origin(), "/tunes/browse/", &params).unwrap();
        assert_eq!(
            url.as_str(),
            "https://moodytunes.test/tunes/browse/?emotion=HPY&jitter=0.1&artist=Sly+%26+the+Family+Stone"
        );
    }
}
