use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_THEME: &str = "apple";

/// Page-level settings for the book editor.
///
/// The wiki template renders them into `window.ENV` before the wasm bundle loads.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct EnvConfig {
    pub theme: String,
    pub move_url: Option<String>,
    pub json_data: Option<serde_json::Value>,
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut config = Self::fallback();

        let Some(env) = web_sys::window().and_then(|w| w.get("ENV")) else {
            return config;
        };
        if env.is_undefined() || !env.is_object() {
            return config;
        }

        // Upper-case keys are what the templates emit; lower-case ones are accepted too.
        if let Some(theme) = read_env_string(&env, &["BOOKMAKER_THEME", "bookmaker_theme"]) {
            config.theme = theme;
        }
        config.move_url = read_env_string(&env, &["BOOKMAKER_MOVE_URL", "bookmaker_move_url"]);

        for key in ["BOOKMAKER_JSON_DATA", "bookmaker_json_data"] {
            if let Ok(v) = js_sys::Reflect::get(&env, &key.into()) {
                if v.is_object() {
                    config.json_data = serde_wasm_bindgen::from_value(v).ok();
                    break;
                }
            }
        }

        config
    }

    /// Settings used when the page provides none.
    pub fn fallback() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            move_url: None,
            json_data: None,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env_string(env: &wasm_bindgen::JsValue, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        js_sys::Reflect::get(env, &(*k).into())
            .ok()
            .and_then(|v| v.as_string())
            .filter(|s| !s.trim().is_empty())
    })
}
