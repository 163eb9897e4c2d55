use log::{warn, LevelFilter};
use url::Url;

use crate::error::ApiError;

pub const CONFIG_ELEMENT_ID: &str = "config";

/// Settings read from the page: its origin and the `data-*` attributes of the
/// `#config` element. The CSRF cookie is read per request by the client.
#[derive(Clone, Debug, PartialEq)]
pub struct PageConfig {
    pub origin: Url,
    pub csrf_token: Option<String>,
    pub log_level: LevelFilter,
}

impl PageConfig {
    pub fn load(
        origin: &str,
        dataset: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ApiError> {
        let origin = Url::parse(origin)?;
        let csrf_token = dataset("csrfToken").filter(|token| !token.is_empty());
        Ok(Self {
            origin,
            csrf_token,
            log_level: parse_level(dataset("logLevel").as_deref()),
        })
    }
}

fn parse_level(level: Option<&str>) -> LevelFilter {
    match level {
        Some(level) => level.parse().unwrap_or_else(|_| {
            warn!("unknown log level {:?}, using info", level);
            LevelFilter::Info
        }),
        None => LevelFilter::Info,
    }
}
