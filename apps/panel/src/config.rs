use std::fs;

use serde::Deserialize;

/// Doors the hosting intercom historically exposes; a `panel.toml` or the
/// environment can replace the list entirely.
pub const DEFAULT_DOORS: &[&str] = &["innerGlass", "innerMetal", "outer"];

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
    pub csrf_token: Option<String>,
    pub doors: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".into(),
            csrf_token: None,
            doors: DEFAULT_DOORS.iter().map(|door| door.to_string()).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    csrf_token: Option<String>,
    doors: Option<Vec<String>>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("panel.toml") {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file) => apply_file(&mut settings, file),
            Err(err) => tracing::warn!(error = %err, "ignoring malformed panel.toml"),
        }
    }

    apply_env(&mut settings);

    settings
}

fn apply_file(settings: &mut Settings, file: FileSettings) {
    if let Some(url) = file.server_url {
        settings.server_url = url;
    }
    if let Some(token) = file.csrf_token {
        settings.csrf_token = Some(token);
    }
    if let Some(doors) = file.doors {
        if !doors.is_empty() {
            settings.doors = doors;
        }
    }
}

fn apply_env(settings: &mut Settings) {
    if let Ok(v) = std::env::var("PANEL__SERVER_URL") {
        settings.server_url = v;
    }
    if let Ok(v) = std::env::var("PANEL__CSRF_TOKEN") {
        settings.csrf_token = Some(v);
    }
    if let Ok(v) = std::env::var("PANEL__DOORS") {
        let doors: Vec<String> = v
            .split(',')
            .map(|door| door.trim().to_string())
            .filter(|door| !door.is_empty())
            .collect();
        if !doors.is_empty() {
            settings.doors = doors;
        }
    }
}
