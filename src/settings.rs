//! Startup settings.
//!
//! Every field has a built-in default matching the fixed constants the
//! renderer was written against; an optional JSON file next to the binary
//! can override them.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::abs::InitError;

/// Window, projection and scene settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vert_shader: PathBuf,
    pub frag_shader: PathBuf,
    pub fov_y_radians: f32,
    pub z_near: f32,
    pub z_far: f32,
    pub instance_count: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Cube Field".to_string(),
            width: 1200,
            height: 800,
            vert_shader: PathBuf::from("vertShader.glsl"),
            frag_shader: PathBuf::from("fragShader.glsl"),
            // 60 degrees
            fov_y_radians: 1.0472,
            z_near: 0.1,
            z_far: 1000.0,
            instance_count: 10_000,
        }
    }
}

impl Settings {
    /// Loads settings from the given JSON file. A missing file yields the
    /// defaults; an unreadable or malformed file is a fatal setup error.
    pub fn load(path: &Path) -> Result<Self, InitError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(InitError::SettingsRead {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(|source| InitError::Settings {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.title, "Cube Field");
        assert_eq!((settings.width, settings.height), (1200, 800));
        assert_eq!(settings.vert_shader, PathBuf::from("vertShader.glsl"));
        assert_eq!(settings.frag_shader, PathBuf::from("fragShader.glsl"));
        assert_eq!(settings.fov_y_radians, 1.0472);
        assert_eq!(settings.z_near, 0.1);
        assert_eq!(settings.z_far, 1000.0);
        assert_eq!(settings.instance_count, 10_000);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "title": "Testing", "width": 800, "height": 800 }"#).unwrap();
        assert_eq!(settings.title, "Testing");
        assert_eq!((settings.width, settings.height), (800, 800));
        assert_eq!(settings.instance_count, 10_000);
        assert_eq!(settings.fov_y_radians, 1.0472);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let settings = Settings::load(Path::new("does-not-exist.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(serde_json::from_str::<Settings>("{ not json").is_err());
    }
}
