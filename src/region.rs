//! Region list parsing
//!
//! Regions nest country → region → sub-region → sub-sub-region. The tree is
//! flattened parents-first in document order; anything nested deeper than
//! four levels is rejected.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogueError, Result};
use crate::text::{localized_children, pick, LocalizedText};
use crate::xml::{child_texts, optional_attribute, optional_child_text, required_attribute, Document, NodeId};

/// Deepest supported nesting level (1 = top-level region)
pub const MAX_REGION_DEPTH: usize = 4;

/// Inclusive postcode range, compared as strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostcodeRange {
    pub from: String,
    pub to: String,
}

/// Circle on the map. Carried for callers; postcode lookup ignores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
}

/// A targeting region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub region_id: String,
    /// Nesting level, 1 through 4
    pub depth: usize,
    /// `regionID` of the enclosing region
    pub parent_id: Option<String>,
    pub country_codes: Vec<String>,
    /// Set when the region has exactly one name
    pub region_name: Option<String>,
    /// Set when the region has several localized names
    pub region_names: Vec<LocalizedText>,
    pub postcodes: Vec<String>,
    pub postcode_ranges: Vec<PostcodeRange>,
    pub wildcard_postcodes: Vec<String>,
    pub coordinates: Vec<Coordinates>,
}

impl Region {
    /// Display name for `lang`
    pub fn name(&self, lang: &str) -> Option<&str> {
        self.region_name
            .as_deref()
            .or_else(|| pick(&self.region_names, lang))
    }
}

/// Flatten a `RegionList` element into regions
pub fn parse_region_list(doc: &Document, list: NodeId) -> Result<Vec<Region>> {
    let mut regions = Vec::new();
    for node in doc.children(list, "Region") {
        collect_region(doc, node, 1, None, &mut regions)?;
    }
    Ok(regions)
}

fn collect_region(
    doc: &Document,
    node: NodeId,
    depth: usize,
    parent_id: Option<&str>,
    out: &mut Vec<Region>,
) -> Result<()> {
    if depth > MAX_REGION_DEPTH {
        let region_id = doc.attribute(node, "regionID").unwrap_or("?").to_string();
        return Err(CatalogueError::RegionDepthExceeded { region_id });
    }

    let region = parse_region(doc, node, depth, parent_id)?;
    let region_id = region.region_id.clone();
    out.push(region);

    for child in doc.children(node, "Region") {
        collect_region(doc, child, depth + 1, Some(&region_id), out)?;
    }
    Ok(())
}

fn parse_region(doc: &Document, node: NodeId, depth: usize, parent_id: Option<&str>) -> Result<Region> {
    let mut region = Region {
        region_id: required_attribute(doc, node, "regionID")?.to_string(),
        depth,
        parent_id: parent_id.map(str::to_string),
        ..Default::default()
    };

    if let Some(codes) = doc.attribute(node, "countryCodes") {
        region.country_codes = codes
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
    }

    let mut names = localized_children(doc, node, "RegionName");
    if names.len() == 1 {
        region.region_name = names.pop().map(|n| n.text);
    } else {
        region.region_names = names;
    }

    region.wildcard_postcodes = child_texts(doc, node, "WildcardPostcode");
    region.postcodes = child_texts(doc, node, "Postcode");

    for range in doc.children(node, "PostcodeRange") {
        match (optional_attribute(doc, range, "from"), optional_attribute(doc, range, "to")) {
            (Some(from), Some(to)) => region.postcode_ranges.push(PostcodeRange {
                from: from.to_string(),
                to: to.to_string(),
            }),
            _ => warn!("Skipping PostcodeRange without from/to in region {}", region.region_id),
        }
    }

    for coords in doc.children(node, "Coordinates") {
        let field = |name: &str| -> Option<f64> {
            let value = optional_child_text(doc, coords, name)?;
            value.trim().parse().ok()
        };
        match (field("Latitude"), field("Longitude"), field("Radius")) {
            (Some(latitude), Some(longitude), Some(radius)) => region.coordinates.push(Coordinates {
                latitude,
                longitude,
                radius,
            }),
            _ => warn!("Skipping malformed Coordinates in region {}", region.region_id),
        }
    }

    Ok(region)
}
