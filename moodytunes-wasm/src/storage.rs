use log::warn;
use moodytunes::session::SessionStore;
use wasm_bindgen::prelude::*;
use web_sys::Storage;

/// `window.sessionStorage`. Storage exceptions (quota, privacy mode) are
/// logged and otherwise ignored, like a missing value.
pub struct SessionStorage(Storage);

impl SessionStorage {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().expect("no global `window` exists");
        window
            .session_storage()?
            .map(SessionStorage)
            .ok_or_else(|| JsValue::from("session storage unavailable"))
    }
}

impl SessionStore for SessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.0.set_item(key, value) {
            warn!("could not store {}: {:?}", key, e);
        }
    }

    fn remove(&self, key: &str) {
        let _ = self.0.remove_item(key);
    }

    fn clear(&self) {
        let _ = self.0.clear();
    }
}
