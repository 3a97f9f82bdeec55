//! Persisted preferences and the plain data structures that ride along with
//! them. UI-facing scalar types (color, font family, pixel grid length) are
//! stored in their conventional JSON encodings via `#[serde(with = ...)]`
//! modules; the rest is plain serde.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::popup::CloseBehavior;

/// ARGB color, JSON-encoded as `#AARRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// Parse `#AARRGGBB` or `#RRGGBB` (alpha defaults to opaque).
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#')?;
        match hex.len() {
            8 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                Some(Self {
                    a: (v >> 24) as u8,
                    r: (v >> 16) as u8,
                    g: (v >> 8) as u8,
                    b: v as u8,
                })
            }
            6 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                Some(Self { a: 0xFF, r: (v >> 16) as u8, g: (v >> 8) as u8, b: v as u8 })
            }
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
    }
}

/// Font family name, JSON-encoded as a plain string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFamily(pub String);

/// Panel length in pixels, JSON-encoded as a bare number.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLength(pub f64);

mod color_string {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    use super::Color;

    pub fn serialize<S: Serializer>(color: &Color, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&color.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Color, D::Error> {
        let text = String::deserialize(d)?;
        Color::parse(&text).ok_or_else(|| D::Error::custom(format!("bad color '{}'", text)))
    }
}

mod font_string {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::FontFamily;

    pub fn serialize<S: Serializer>(font: &FontFamily, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&font.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<FontFamily, D::Error> {
        Ok(FontFamily(String::deserialize(d)?))
    }
}

mod pixel_length {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::GridLength;

    pub fn serialize<S: Serializer>(len: &GridLength, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(len.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<GridLength, D::Error> {
        Ok(GridLength(f64::deserialize(d)?))
    }
}

/// One step of a queued interactive rebase. The popup layer only supplies
/// the data shape; serialization is plain serde.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct InteractiveRebaseJob {
    pub commit: String,
    pub action: RebaseAction,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RebaseAction {
    Pick,
    Reword,
    Squash,
    Fixup,
    Edit,
    Drop,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Preferences {
    #[serde(with = "color_string")]
    pub accent_color: Color,
    #[serde(with = "font_string")]
    pub ui_font: FontFamily,
    #[serde(with = "pixel_length")]
    pub sidebar_width: GridLength,
    /// Whether a failed mutation still closes its dialog.
    #[serde(default = "default_true")]
    pub close_popup_on_failure: bool,
    #[serde(default)]
    pub recent_repos: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Maximum number of recent repos to remember
const MAX_RECENT_REPOS: usize = 10;

impl Default for Preferences {
    fn default() -> Self {
        Self {
            accent_color: Color { a: 0xFF, r: 0x41, g: 0x69, b: 0xE1 },
            ui_font: FontFamily("monospace".to_string()),
            sidebar_width: GridLength(220.0),
            close_popup_on_failure: true,
            recent_repos: Vec::new(),
        }
    }
}

impl Preferences {
    fn config_dir() -> Option<PathBuf> {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join(".config").join("popgit"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("preferences.json"))
    }

    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        let Ok(data) = fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&data).unwrap_or_default()
    }

    pub fn save(&self) {
        let Some(dir) = Self::config_dir() else {
            return;
        };
        if let Err(e) = fs::create_dir_all(&dir) {
            eprintln!("Failed to create config dir: {e}");
            return;
        }
        let Some(path) = Self::config_path() else {
            return;
        };
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(&path, json) {
                    eprintln!("Failed to save preferences: {e}");
                }
            }
            Err(e) => eprintln!("Failed to serialize preferences: {e}"),
        }
    }

    /// Add a repo path to the recent repos list (most recent first, deduped).
    pub fn add_recent_repo(&mut self, path: &str) {
        self.recent_repos.retain(|p| p != path);
        self.recent_repos.insert(0, path.to_string());
        self.recent_repos.truncate(MAX_RECENT_REPOS);
    }

    /// The popup close policy these preferences select.
    pub fn close_behavior(&self) -> CloseBehavior {
        if self.close_popup_on_failure {
            CloseBehavior::Always
        } else {
            CloseBehavior::KeepOpenOnFailure
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse_and_display() {
        let color = Color::parse("#80FF8040").expect("argb");
        assert_eq!(color, Color { a: 0x80, r: 0xFF, g: 0x80, b: 0x40 });
        assert_eq!(color.to_string(), "#80FF8040");

        let opaque = Color::parse("#FF8040").expect("rgb");
        assert_eq!(opaque.a, 0xFF);

        assert!(Color::parse("FF8040").is_none());
        assert!(Color::parse("#XYZ").is_none());
    }

    #[test]
    fn test_preferences_json_encodings() {
        let prefs = Preferences {
            accent_color: Color { a: 0xFF, r: 0x10, g: 0x20, b: 0x30 },
            ui_font: FontFamily("JetBrains Mono".to_string()),
            sidebar_width: GridLength(180.0),
            close_popup_on_failure: false,
            recent_repos: vec!["/tmp/repo".to_string()],
        };

        let json = serde_json::to_string(&prefs).expect("serialize");
        assert!(json.contains("\"#FF102030\""), "color is string-encoded: {json}");
        assert!(json.contains("\"JetBrains Mono\""));
        assert!(json.contains("180.0"), "grid length is numeric: {json}");

        let back: Preferences = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.accent_color, prefs.accent_color);
        assert_eq!(back.ui_font, prefs.ui_font);
        assert_eq!(back.sidebar_width, prefs.sidebar_width);
        assert_eq!(back.close_behavior(), CloseBehavior::KeepOpenOnFailure);
    }

    #[test]
    fn test_rebase_job_collection() {
        let jobs = vec![
            InteractiveRebaseJob {
                commit: "abc1234".to_string(),
                action: RebaseAction::Pick,
                message: String::new(),
            },
            InteractiveRebaseJob {
                commit: "def5678".to_string(),
                action: RebaseAction::Reword,
                message: "Better subject".to_string(),
            },
        ];

        let json = serde_json::to_string(&jobs).expect("serialize");
        assert!(json.contains("\"pick\""));
        let back: Vec<InteractiveRebaseJob> = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, jobs);
    }

    #[test]
    fn test_add_recent_repo_dedupes_and_caps() {
        let mut prefs = Preferences::default();
        for i in 0..12 {
            prefs.add_recent_repo(&format!("/repo/{i}"));
        }
        prefs.add_recent_repo("/repo/3");

        assert_eq!(prefs.recent_repos.len(), MAX_RECENT_REPOS);
        assert_eq!(prefs.recent_repos[0], "/repo/3");
        assert_eq!(prefs.recent_repos.iter().filter(|p| *p == "/repo/3").count(), 1);
    }
}
