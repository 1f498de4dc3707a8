//! Error types for service list parsing and region selection

use thiserror::Error;

/// Everything that can abort a catalogue build or a region selection.
///
/// Business-rule drops (unsupported DRM, unknown triplet, no usable
/// delivery) are not errors; they only shrink the instance list.
#[derive(Error, Debug)]
pub enum CatalogueError {
    /// The payload is not well-formed XML.
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload parsed but holds no root element.
    #[error("Document has no root element")]
    EmptyDocument,

    /// A field the document must carry is absent.
    #[error("Missing required {field} in <{element}>")]
    MissingField { element: String, field: String },

    /// A numeric field did not parse.
    #[error("Invalid number for {field}: '{value}'")]
    InvalidNumber { field: String, value: String },

    /// Regions nest deeper than country/region/sub-region/sub-sub-region.
    #[error("Region '{region_id}' nests deeper than 4 levels")]
    RegionDepthExceeded { region_id: String },

    /// No LCN table targets the requested region.
    #[error("No LCN table found for region '{0}'")]
    NoLcnTable(String),

    #[error("Download failed: {0}")]
    Download(String),
}

impl CatalogueError {
    pub(crate) fn missing(element: &str, field: &str) -> Self {
        CatalogueError::MissingField {
            element: element.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_number(field: &str, value: &str) -> Self {
        CatalogueError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogueError>;
