use crate::config::EnvConfig;
use serde::{Deserialize, Serialize};

/// jstree plugins the book tree runs with.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum Plugin {
    JsonData,
    Themes,
    Dnd,
    Crrm,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct DndOptions {
    pub drop_target: bool,
    pub drag_target: bool,
}

/// Options for the crrm plugin's `move` behaviour. Empty means widget defaults.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct MoveOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub always_copy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_onmove: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_position: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CrrmOptions {
    #[serde(rename = "move")]
    pub move_options: MoveOptions,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ThemeOptions {
    pub theme: String,
}

/// Configuration handed to the tree widget once, at startup.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct TreeOptions {
    pub plugins: Vec<Plugin>,
    pub dnd: DndOptions,
    pub crrm_options: CrrmOptions,
    pub themes: ThemeOptions,

    /// Endpoint for persisting drag-and-drop moves; read back through the widget settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_url: Option<String>,

    /// Data source for the json_data plugin, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_data: Option<serde_json::Value>,
}

impl TreeOptions {
    pub fn from_config(config: &EnvConfig) -> Self {
        Self {
            plugins: vec![Plugin::JsonData, Plugin::Themes, Plugin::Dnd, Plugin::Crrm],
            dnd: DndOptions {
                drop_target: false,
                drag_target: false,
            },
            crrm_options: CrrmOptions::default(),
            themes: ThemeOptions {
                theme: config.theme.clone(),
            },
            move_url: config.move_url.clone(),
            json_data: config.json_data.clone(),
        }
    }
}

/// Result of a drag-and-drop reorder, as reported by the tree widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MovePayload {
    /// Topic ids of the moved nodes, in widget order.
    pub moved: Vec<String>,
    pub new_parent: String,
    pub base_position: i64,
}

/// Body of one move-persistence POST.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct MoveRequest {
    pub what: String,
    pub new_parent: String,
    pub new_pos: i64,
}

impl MoveRequest {
    pub(crate) fn into_pairs(self) -> Vec<(String, String)> {
        vec![
            ("what".to_string(), self.what),
            ("new_parent".to_string(), self.new_parent),
            ("new_pos".to_string(), self.new_pos.to_string()),
        ]
    }
}
