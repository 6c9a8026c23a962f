//! `RenderConfig` and its nested types (§3.1).
//!
//! Loading these from TOML/CLI args is an external-collaborator concern;
//! this crate only defines the typed shape the merger and orchestrator
//! thread through `PageRenderer::render`.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderConfig {
    /// External-link base; absent means external links are omitted (§6).
    pub base_url: Option<String>,
    #[serde(default)]
    pub display_header_footer: bool,
    #[serde(default)]
    pub header_template: String,
    #[serde(default)]
    pub footer_template: String,
    #[serde(default)]
    pub margin: Margins,
    #[serde(default)]
    pub landscape: bool,
    #[serde(default)]
    pub format: PaperFormat,
    #[serde(default)]
    pub print_background: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            display_header_footer: false,
            header_template: String::new(),
            footer_template: String::new(),
            margin: Margins::default(),
            landscape: false,
            format: PaperFormat::default(),
            print_background: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Margins {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PaperFormat {
    Letter,
    A4,
    Legal,
    Tabloid,
}

impl Default for PaperFormat {
    fn default() -> Self {
        PaperFormat::Letter
    }
}
