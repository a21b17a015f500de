// Copyright (c) 2026 rezky_nightky

//! What falls: the caller's messages and image references, plus the project
//! file they are usually loaded from.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ContentError;

/// Content handed to [`crate::Engine::start`]. Empty lists fall back to the
/// built-in defaults when the engine builds its factory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentConfig {
    pub messages: Vec<String>,
    pub image_refs: Vec<String>,
    /// Not simulated; carried for the presentation layer.
    pub audio_ref: Option<String>,
}

impl ContentConfig {
    pub fn new(messages: Vec<String>, image_refs: Vec<String>) -> Self {
        Self {
            messages,
            image_refs,
            audio_ref: None,
        }
    }

    pub fn with_audio(mut self, audio_ref: impl Into<String>) -> Self {
        self.audio_ref = Some(audio_ref.into());
        self
    }
}

/// A greeting project as exported by the builder.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Project {
    pub id: Option<String>,
    pub title: Option<String>,
    pub theme: Option<String>,
    #[serde(alias = "messages")]
    pub texts: Vec<String>,
    #[serde(alias = "imageUrls", alias = "images")]
    pub image_urls: Vec<String>,
    #[serde(alias = "musicUrl")]
    pub music_url: Option<String>,
}

impl Project {
    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let text = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let project = Self::parse(&text).map_err(|e| ContentError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        tracing::debug!(
            path = %path.display(),
            texts = project.texts.len(),
            images = project.image_urls.len(),
            "loaded project"
        );
        Ok(project)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn content(&self) -> ContentConfig {
        ContentConfig {
            messages: self.texts.clone(),
            image_refs: self.image_urls.clone(),
            audio_ref: self.music_url.clone().filter(|s| !s.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_project() {
        let p = Project::parse(
            r#"
title = "For Linh"
theme = "pink"
texts = ["Happy birthday", "Love you"]
image_urls = ["https://img.example/1.jpg"]
music_url = "https://audio.example/eyes.mp3"
"#,
        )
        .unwrap();
        assert_eq!(p.title.as_deref(), Some("For Linh"));
        assert_eq!(p.texts.len(), 2);

        let c = p.content();
        assert_eq!(c.messages, vec!["Happy birthday", "Love you"]);
        assert_eq!(c.image_refs, vec!["https://img.example/1.jpg"]);
        assert_eq!(
            c.audio_ref.as_deref(),
            Some("https://audio.example/eyes.mp3")
        );
    }

    #[test]
    fn accepts_builder_field_names_and_missing_fields() {
        let p = Project::parse(
            r#"
imageUrls = ["a.png"]
musicUrl = ""
"#,
        )
        .unwrap();
        assert!(p.texts.is_empty());
        assert_eq!(p.image_urls, vec!["a.png"]);
        assert_eq!(p.content().audio_ref, None);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Project::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ContentError::Io { .. }));
    }

    #[test]
    fn load_reports_bad_toml() {
        let path = std::env::temp_dir().join(format!("heartfall-bad-{}.toml", std::process::id()));
        fs::write(&path, "texts = [1, ").unwrap();
        let err = Project::load(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, ContentError::Parse { .. }));
    }
}
