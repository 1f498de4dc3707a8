//! Logical channel number tables

use serde::{Deserialize, Serialize};

use crate::error::{CatalogueError, Result};
use crate::xml::{child_texts, required_attribute, Document, NodeId};

/// One `serviceRef` → channel number binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcnEntry {
    pub service_ref: String,
    pub channel_number: u32,
}

/// A channel numbering scoped to zero or more regions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcnTable {
    /// Empty means the default, unscoped numbering
    pub target_regions: Vec<String>,
    pub entries: Vec<LcnEntry>,
}

impl LcnTable {
    pub fn is_unscoped(&self) -> bool {
        self.target_regions.is_empty()
    }

    pub fn targets(&self, region_id: &str) -> bool {
        self.target_regions.iter().any(|r| r == region_id)
    }

    /// Channel number declared for `service_id`, first entry wins
    pub fn channel_for(&self, service_id: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|e| e.service_ref == service_id)
            .map(|e| e.channel_number)
    }

    /// Highest number declared in this table
    pub fn max_channel(&self) -> Option<u32> {
        self.entries.iter().map(|e| e.channel_number).max()
    }
}

/// Parse every `LCNTable` below `root`, in document order
pub fn parse_lcn_tables(doc: &Document, root: NodeId) -> Result<Vec<LcnTable>> {
    doc.descendants(root, "LCNTable")
        .map(|table| parse_lcn_table(doc, table))
        .collect()
}

fn parse_lcn_table(doc: &Document, node: NodeId) -> Result<LcnTable> {
    let mut table = LcnTable {
        target_regions: child_texts(doc, node, "TargetRegion"),
        entries: Vec::new(),
    };

    for lcn in doc.children(node, "LCN") {
        let service_ref = required_attribute(doc, lcn, "serviceRef")?;
        let raw = required_attribute(doc, lcn, "channelNumber")?;
        let channel_number = raw
            .trim()
            .parse()
            .map_err(|_| CatalogueError::invalid_number("channelNumber", raw))?;

        table.entries.push(LcnEntry {
            service_ref: service_ref.to_string(),
            channel_number,
        });
    }

    Ok(table)
}

/// The table used for numbering before any region is selected:
/// the first unscoped table, else the first table.
pub fn default_table(tables: &[LcnTable]) -> Option<&LcnTable> {
    tables
        .iter()
        .find(|t| t.is_unscoped())
        .or_else(|| tables.first())
}

/// The first table that targets `region_id`
pub fn table_for_region<'a>(tables: &'a [LcnTable], region_id: &str) -> Option<&'a LcnTable> {
    tables.iter().find(|t| t.targets(region_id))
}
