//! Tile server URL templates.

use crate::coord::TileCoord;
use std::fmt;
use thiserror::Error;

/// Errors raised when parsing a URL template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("tile server template is empty")]
    Empty,

    #[error("tile server template '{template}' is missing the {placeholder} placeholder")]
    MissingPlaceholder {
        template: String,
        placeholder: &'static str,
    },
}

/// A tile URL pattern such as `https://tile.example.org/{z}/{x}/{y}.png`.
///
/// `{x}` and `{y}` are required. `{z}` is optional so that servers which fix
/// the zoom in the path still work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileUrlTemplate {
    template: String,
}

impl TileUrlTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, TemplateError> {
        let template = template.into();
        if template.trim().is_empty() {
            return Err(TemplateError::Empty);
        }

        for placeholder in ["{x}", "{y}"] {
            if !template.contains(placeholder) {
                return Err(TemplateError::MissingPlaceholder {
                    template,
                    placeholder,
                });
            }
        }

        Ok(Self { template })
    }

    /// Substitutes the tile's coordinates into the template.
    pub fn url_for(&self, tile: &TileCoord) -> String {
        self.template
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
            .replace("{z}", &tile.zoom.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl fmt::Display for TileUrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}
