use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// Display preferences persisted alongside practice data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub font_size: FontSize,
}

impl UserSettings {
    #[must_use]
    pub fn new(theme: Theme, font_size: FontSize) -> Self {
        Self { theme, font_size }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_light_medium() {
        let settings = UserSettings::default();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.font_size, FontSize::Medium);
    }

    #[test]
    fn uses_stored_document_shape() {
        let parsed: UserSettings =
            serde_json::from_str(r#"{"theme":"dark","fontSize":"large"}"#).unwrap();
        assert_eq!(parsed, UserSettings::new(Theme::Dark, FontSize::Large));

        let partial: UserSettings = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(partial.font_size, FontSize::Medium);
    }
}
