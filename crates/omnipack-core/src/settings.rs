use std::path::Path;

use serde::Deserialize;

pub const DEBUG_ENV_VAR: &str = "OMNIPACK_DEBUG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
}

impl Settings {
    // Settings feed diagnostics only, so resolution is deliberately
    // forgiving: a missing or unparseable file yields the defaults.
    pub fn load(path: &Path) -> Self {
        let Ok(raw) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        toml::from_str(&raw).unwrap_or_default()
    }

    pub fn resolve(path: Option<&Path>) -> Self {
        let mut settings = path.map(Self::load).unwrap_or_default();
        if let Ok(value) = std::env::var(DEBUG_ENV_VAR) {
            settings.debug = matches!(value.trim(), "1" | "true" | "yes");
        }
        settings
    }
}
