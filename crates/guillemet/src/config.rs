// File: src/config.rs
// Purpose: Configuration parsing from guillemet.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dirs: DirsConfig,

    /// Extended extension shared by every template file, leading dot
    /// included (default: ".html.tmpl").
    #[serde(default = "default_file_ext")]
    pub file_ext: String,

    /// Stem of the shared layout file inside the base directory
    /// (default: "layout", i.e. `layout.html.tmpl`).
    #[serde(default = "default_layout")]
    pub layout: String,
}

/// Template directory layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirsConfig {
    /// Directory holding the layout file and all template subtrees.
    #[serde(default = "default_base_dir")]
    pub base: String,

    /// Pages subtree, relative to `base` (default: "pages").
    #[serde(default = "default_pages_dir")]
    pub pages: String,

    /// Components subtree, relative to `base` (default: "components").
    #[serde(default = "default_components_dir")]
    pub components: String,

    /// Component head-fragment subtree, relative to `base`
    /// (default: "component_heads").
    #[serde(default = "default_heads_dir")]
    pub heads: String,

    /// Per-page head-fragment subtree, relative to `base`
    /// (default: "page_heads").
    #[serde(default = "default_page_heads_dir")]
    pub page_heads: String,
}

// Default values
fn default_file_ext() -> String {
    ".html.tmpl".to_string()
}

fn default_layout() -> String {
    "layout".to_string()
}

fn default_base_dir() -> String {
    "base".to_string()
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

fn default_components_dir() -> String {
    "components".to_string()
}

fn default_heads_dir() -> String {
    "component_heads".to_string()
}

fn default_page_heads_dir() -> String {
    "page_heads".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dirs: DirsConfig::default(),
            file_ext: default_file_ext(),
            layout: default_layout(),
        }
    }
}

impl Default for DirsConfig {
    fn default() -> Self {
        Self {
            base: default_base_dir(),
            pages: default_pages_dir(),
            components: default_components_dir(),
            heads: default_heads_dir(),
            page_heads: default_page_heads_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file. A missing or empty file
    /// yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from the default path (./guillemet.toml).
    pub fn load_default() -> Result<Self> {
        Self::load("guillemet.toml")
    }

    /// Filename of the shared layout template, extension included.
    pub fn layout_filename(&self) -> String {
        format!("{}{}", self.layout, self.file_ext)
    }

    /// Pages root relative to the source root.
    pub fn pages_root(&self) -> String {
        format!("{}/{}", self.dirs.base, self.dirs.pages)
    }

    /// Components root relative to the source root.
    pub fn components_root(&self) -> String {
        format!("{}/{}", self.dirs.base, self.dirs.components)
    }

    /// Component-heads root relative to the source root.
    pub fn heads_root(&self) -> String {
        format!("{}/{}", self.dirs.base, self.dirs.heads)
    }

    /// Page-heads root relative to the source root.
    pub fn page_heads_root(&self) -> String {
        format!("{}/{}", self.dirs.base, self.dirs.page_heads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.dirs.base, "base");
        assert_eq!(config.dirs.pages, "pages");
        assert_eq!(config.dirs.components, "components");
        assert_eq!(config.dirs.heads, "component_heads");
        assert_eq!(config.dirs.page_heads, "page_heads");
        assert_eq!(config.page_heads_root(), "base/page_heads");
        assert_eq!(config.file_ext, ".html.tmpl");
        assert_eq!(config.layout_filename(), "layout.html.tmpl");
        assert_eq!(config.pages_root(), "base/pages");
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<Config>("").unwrap_or_default();
        assert_eq!(config.dirs.pages, "pages");
        assert_eq!(config.file_ext, ".html.tmpl");
    }

    #[test]
    fn test_custom_directories() {
        let toml = r#"
            file_ext = ".tpl"

            [dirs]
            base = "templates"
            pages = "screens"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.dirs.base, "templates");
        assert_eq!(config.dirs.pages, "screens");
        // Unset fields keep their defaults.
        assert_eq!(config.dirs.components, "components");
        assert_eq!(config.layout_filename(), "layout.tpl");
        assert_eq!(config.pages_root(), "templates/screens");
    }
}
