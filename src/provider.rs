//! Service list provider directory
//!
//! The discovery endpoint answers with a list of providers, each offering one
//! or more service lists. Only what a client needs to pick and fetch a list
//! is kept.

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogueError, Result};
use crate::related::SERVICE_DISCOVERY_NS_2019;
use crate::xml::{Document, NodeId};

pub const SERVICE_LIST_DISCOVERY_NS: &str = "urn:dvb:metadata:servicelistdiscovery:2019";

/// A fetchable service list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceListOffering {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub target_countries: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderOffering {
    pub name: Option<String>,
    pub service_lists: Vec<ServiceListOffering>,
}

/// Parse a provider directory document
pub fn parse_provider_directory(xml: &str) -> Result<Vec<ProviderOffering>> {
    let doc = Document::parse(xml)?;
    let root = doc.root();

    let mut providers = Vec::new();
    for offering in doc.descendants_ns(root, SERVICE_LIST_DISCOVERY_NS, "ProviderOffering") {
        let name = doc
            .descendants_ns(offering, SERVICE_LIST_DISCOVERY_NS, "Provider")
            .next()
            .and_then(|provider| sld_text(&doc, provider, "Name"))
            .map(str::to_string);

        let service_lists = doc
            .descendants_ns(offering, SERVICE_LIST_DISCOVERY_NS, "ServiceListOffering")
            .map(|list| parse_offering(&doc, list))
            .collect::<Result<Vec<_>>>()?;

        providers.push(ProviderOffering { name, service_lists });
    }

    info!("Parsed provider directory: {} providers", providers.len());
    Ok(providers)
}

fn parse_offering(doc: &Document, list: NodeId) -> Result<ServiceListOffering> {
    let name = sld_text(doc, list, "ServiceListName")
        .ok_or_else(|| CatalogueError::missing("ServiceListOffering", "ServiceListName"))?;

    let url = doc
        .descendants_ns(list, SERVICE_LIST_DISCOVERY_NS, "ServiceListURI")
        .next()
        .and_then(|uri| doc.descendants_ns(uri, SERVICE_DISCOVERY_NS_2019, "URI").next())
        .and_then(|uri| doc.text(uri))
        .ok_or_else(|| CatalogueError::missing("ServiceListOffering", "ServiceListURI/URI"))?;

    Ok(ServiceListOffering {
        name: name.to_string(),
        url: url.to_string(),
        target_countries: doc
            .descendants_ns(list, SERVICE_LIST_DISCOVERY_NS, "TargetCountry")
            .filter_map(|country| doc.text(country))
            .map(str::to_string)
            .collect(),
    })
}

fn sld_text<'d>(doc: &'d Document, node: NodeId, local: &str) -> Option<&'d str> {
    doc.descendants_ns(node, SERVICE_LIST_DISCOVERY_NS, local)
        .next()
        .and_then(|n| doc.text(n))
}
