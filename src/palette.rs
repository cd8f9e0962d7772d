use std::collections::HashMap;

use serde::{Deserialize, Serialize};

const CLASSIC_BACKGROUND: &str = "#ffffff";
const CLASSIC_LABEL_INK: &str = "#171717";
const CLASSIC_MUTED_INK: &str = "#737373";
const CLASSIC_FAINT_INK: &str = "#a3a3a3";
const CLASSIC_AXIS: &str = "#d4d4d4";
const CLASSIC_GRID: &str = "#e5e5e5";
const CLASSIC_FACE_LIGHT: &str = "#fafafa";
const CLASSIC_FACE_MID: &str = "#e5e5e5";
const CLASSIC_FACE_DARK: &str = "#d4d4d4";
const CLASSIC_PLACEHOLDER: &str = "#64748b";
const CLASSIC_FUNCTION: &str = "#3b82f6";
const CLASSIC_CRITICAL_POINT: &str = "#ef4444";
const CLASSIC_INFLECTION_POINT: &str = "#10b981";
const CLASSIC_LIMIT_POINT: &str = "#ef4444";
const CLASSIC_ASYMPTOTE: &str = "#9ca3af";
const CLASSIC_PRIMARY: &str = "#3b82f6";
const CLASSIC_SECONDARY: &str = "#ef4444";
const CLASSIC_ACCENT: &str = "#10b981";
const CLASSIC_NEUTRAL: &str = "#64748b";

const BUILTIN_PALETTES: &[(&str, &str)] = &[
    ("chalkboard", include_str!("../palettes/chalkboard.toml")),
    ("classic", include_str!("../palettes/classic.toml")),
    ("print", include_str!("../palettes/print.toml")),
];

/// Every color the renderers draw with. Each field has a hard-coded default
/// so a partial palette file (or no file at all) still renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_label_ink")]
    pub label_ink: String,
    #[serde(default = "default_muted_ink")]
    pub muted_ink: String,
    #[serde(default = "default_faint_ink")]
    pub faint_ink: String,
    #[serde(default = "default_axis")]
    pub axis: String,
    #[serde(default = "default_grid")]
    pub grid: String,
    #[serde(default = "default_face_light")]
    pub face_light: String,
    #[serde(default = "default_face_mid")]
    pub face_mid: String,
    #[serde(default = "default_face_dark")]
    pub face_dark: String,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    #[serde(default = "default_function")]
    pub function: String,
    #[serde(default = "default_critical_point")]
    pub critical_point: String,
    #[serde(default = "default_inflection_point")]
    pub inflection_point: String,
    #[serde(default = "default_limit_point")]
    pub limit_point: String,
    #[serde(default = "default_asymptote")]
    pub asymptote: String,

    #[serde(default = "default_primary")]
    pub primary: String,
    #[serde(default = "default_secondary")]
    pub secondary: String,
    #[serde(default = "default_accent")]
    pub accent: String,
    #[serde(default = "default_neutral")]
    pub neutral: String,
}

fn default_background() -> String {
    CLASSIC_BACKGROUND.to_string()
}
fn default_label_ink() -> String {
    CLASSIC_LABEL_INK.to_string()
}
fn default_muted_ink() -> String {
    CLASSIC_MUTED_INK.to_string()
}
fn default_faint_ink() -> String {
    CLASSIC_FAINT_INK.to_string()
}
fn default_axis() -> String {
    CLASSIC_AXIS.to_string()
}
fn default_grid() -> String {
    CLASSIC_GRID.to_string()
}
fn default_face_light() -> String {
    CLASSIC_FACE_LIGHT.to_string()
}
fn default_face_mid() -> String {
    CLASSIC_FACE_MID.to_string()
}
fn default_face_dark() -> String {
    CLASSIC_FACE_DARK.to_string()
}
fn default_placeholder() -> String {
    CLASSIC_PLACEHOLDER.to_string()
}
fn default_function() -> String {
    CLASSIC_FUNCTION.to_string()
}
fn default_critical_point() -> String {
    CLASSIC_CRITICAL_POINT.to_string()
}
fn default_inflection_point() -> String {
    CLASSIC_INFLECTION_POINT.to_string()
}
fn default_limit_point() -> String {
    CLASSIC_LIMIT_POINT.to_string()
}
fn default_asymptote() -> String {
    CLASSIC_ASYMPTOTE.to_string()
}
fn default_primary() -> String {
    CLASSIC_PRIMARY.to_string()
}
fn default_secondary() -> String {
    CLASSIC_SECONDARY.to_string()
}
fn default_accent() -> String {
    CLASSIC_ACCENT.to_string()
}
fn default_neutral() -> String {
    CLASSIC_NEUTRAL.to_string()
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_builtin("classic").expect("built-in classic palette must parse")
    }
}

impl Palette {
    pub fn from_builtin(name: &str) -> Result<Self, String> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let content = BUILTIN_PALETTES
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, c)| *c)
            .ok_or_else(|| {
                format!(
                    "Unknown built-in palette '{}'. Available: {}",
                    name,
                    Self::list_builtins().join(", ")
                )
            })?;
        Self::from_toml(content)
    }

    pub fn list_builtins() -> Vec<&'static str> {
        BUILTIN_PALETTES.iter().map(|(n, _)| *n).collect()
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse palette TOML: {}", e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml::from_str(content).map_err(|e| format!("Failed to parse palette YAML: {}", e))
    }

    /// Resolve a generic-diagram color role name. Unknown roles fall back to
    /// primary; rendering never fails on a color lookup.
    pub fn role_color(&self, role: &str) -> &str {
        match role {
            "primary" => &self.primary,
            "secondary" => &self.secondary,
            "accent" => &self.accent,
            "neutral" => &self.neutral,
            _ => &self.primary,
        }
    }
}

/// Per-render color overrides supplied by the caller, keyed by variable or
/// role name (`x`, `criticalPoint`, ...). Always consulted before palette
/// defaults; an empty map is valid and common.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    colors: HashMap<String, String>,
}

impl ColorMap {
    pub fn new(colors: HashMap<String, String>) -> Self {
        ColorMap { colors }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.colors.get(key).map(|s| s.as_str())
    }

    pub fn get_or<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.get(key).unwrap_or(fallback)
    }
}
