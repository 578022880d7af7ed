use std::collections::HashMap;
use std::fs;

#[derive(Debug)]
pub struct Settings {
    pub api_root: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_root: "http://127.0.0.1:8000/".into(),
        }
    }
}

/// Layered settings: defaults, then `portview.toml`, then environment.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("portview.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_root") {
                settings.api_root = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("PORTVIEW_API_ROOT") {
        settings.api_root = v;
    }
    if let Ok(v) = std::env::var("APP__API_ROOT") {
        settings.api_root = v;
    }

    settings
}
