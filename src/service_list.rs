//! DVB-I service list → catalogue
//!
//! Builds regions, LCN tables and services from one document, numbers every
//! service, and narrows the result to a region on request.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogueError, Result};
use crate::instance::{resolve_instance, DeliveryInstance, ResolveOptions};
use crate::lcn::{self, LcnTable};
use crate::postcode;
use crate::region::{parse_region_list, Region};
use crate::related::{self, LinkedApps, Profile};
use crate::text::{localized_children, pick, LocalizedText};
use crate::xml::{child_texts, optional_child_text, Document, NodeId};

/// Content guide endpoints shared by all services of a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentGuide {
    pub schedule_info_uri: String,
    pub more_episodes_uri: Option<String>,
    pub program_info_uri: Option<String>,
}

/// A channel entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Zero-based position in the document
    pub code: usize,
    pub id: String,
    /// First `ServiceName`
    pub title: String,
    pub titles: Vec<LocalizedText>,
    /// First `ProviderName`
    pub provider: Option<String>,
    pub providers: Vec<LocalizedText>,
    /// `None` means valid in every region
    pub target_regions: Option<Vec<String>>,
    pub image: Option<String>,
    pub out_of_service_image: Option<String>,
    pub content_guide: Option<ContentGuide>,
    /// Per-service content guide override
    pub content_guide_service_ref: Option<String>,
    pub lcn: u32,
    /// True when no LCN table numbered this service
    pub lcn_auto_assigned: bool,
    pub instances: Vec<DeliveryInstance>,
    /// Distinct delivery kinds, e.g. `DVB-DASH/DVB-T`
    pub source_types: String,
    pub apps: LinkedApps,
}

impl Service {
    pub fn title_for(&self, lang: &str) -> &str {
        pick(&self.titles, lang).unwrap_or(&self.title)
    }

    /// Whether the service may be offered in `region_id`
    pub fn is_valid_in(&self, region_id: &str) -> bool {
        match self.target_regions {
            None => true,
            Some(ref regions) => regions.iter().any(|r| r == region_id),
        }
    }

    /// Instances usable at `now`, lowest priority value first.
    /// Instances without a numeric priority go last, in document order.
    pub fn available_instances(&self, now: DateTime<Utc>) -> Vec<&DeliveryInstance> {
        let mut instances: Vec<_> = self.instances.iter().filter(|i| i.is_available(now)).collect();
        instances.sort_by_key(|i| (i.priority_rank().is_none(), i.priority_rank()));
        instances
    }
}

/// Parsed service list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    pub profile: Profile,
    /// Names of the list itself
    pub names: Vec<LocalizedText>,
    pub image: Option<String>,
    pub services: Vec<Service>,
    pub regions: Vec<Region>,
    pub lcn_tables: Vec<LcnTable>,
}

impl Catalogue {
    /// Parse a service list document
    pub fn parse(xml: &str, options: &ResolveOptions<'_>) -> Result<Self> {
        parse_service_list(xml, options)
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn region(&self, region_id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.region_id == region_id)
    }

    /// First region whose postcode rules accept `postcode`
    pub fn find_region_by_postcode(&self, postcode: &str) -> Option<&Region> {
        postcode::find_region(&self.regions, postcode)
    }

    /// Keep only services valid in `region_id` and renumber them from the
    /// LCN table targeting that region. Kept services the table does not
    /// number and that were auto-numbered before are numbered again above
    /// the table's highest channel.
    ///
    /// Fails with [`CatalogueError::NoLcnTable`] when no table targets the
    /// region; the catalogue is left untouched on any error.
    pub fn select_region(&mut self, region_id: &str) -> Result<()> {
        let table = lcn::table_for_region(&self.lcn_tables, region_id)
            .ok_or_else(|| CatalogueError::NoLcnTable(region_id.to_string()))?;

        let mut services: Vec<Service> = self
            .services
            .iter()
            .filter(|s| s.is_valid_in(region_id))
            .cloned()
            .collect();
        for service in services.iter_mut() {
            if let Some(number) = table.channel_for(&service.id) {
                service.lcn = number;
                service.lcn_auto_assigned = false;
            }
        }
        number_unassigned(&mut services, table.max_channel().unwrap_or(0))?;

        info!(
            "Selected region {}: {} of {} services",
            region_id,
            services.len(),
            self.services.len()
        );
        self.services = services;
        Ok(())
    }
}

/// Build a catalogue from a service list payload
pub fn parse_service_list(xml: &str, options: &ResolveOptions<'_>) -> Result<Catalogue> {
    let doc = Document::parse(xml)?;
    let root = doc.root();
    let profile = Profile::detect(doc.namespace(root));
    debug!("Service list profile {:?}", profile);

    let content_guide = doc
        .first_child(root, "ContentGuideSource")
        .map(|source| parse_content_guide(&doc, source))
        .transpose()?;

    let materials = related::related_materials(&doc, root, profile);
    let image = related::image(&materials, profile, related::CATALOGUE_IMAGE);

    let regions = match doc.first_child(root, "RegionList") {
        Some(list) => parse_region_list(&doc, list)?,
        None => Vec::new(),
    };

    let lcn_tables = lcn::parse_lcn_tables(&doc, root)?;

    let mut services = Vec::new();
    for (code, node) in doc.children(root, "Service").enumerate() {
        let mut service = parse_service(&doc, node, profile, options)?;
        service.code = code;
        service.content_guide = content_guide.clone();
        services.push(service);
    }

    assign_channel_numbers(&mut services, lcn::default_table(&lcn_tables))?;

    info!(
        "Parsed service list: {} services, {} regions, {} LCN tables",
        services.len(),
        regions.len(),
        lcn_tables.len()
    );

    Ok(Catalogue {
        profile,
        names: localized_children(&doc, root, "Name"),
        image,
        services,
        regions,
        lcn_tables,
    })
}

fn parse_content_guide(doc: &Document, source: NodeId) -> Result<ContentGuide> {
    let endpoint_uri = |endpoint: &str| {
        doc.first_descendant(source, endpoint)
            .and_then(|e| optional_child_text(doc, e, "URI"))
            .map(str::to_string)
    };

    Ok(ContentGuide {
        schedule_info_uri: endpoint_uri("ScheduleInfoEndpoint")
            .ok_or_else(|| CatalogueError::missing("ContentGuideSource", "ScheduleInfoEndpoint/URI"))?,
        more_episodes_uri: endpoint_uri("MoreEpisodesEndpoint"),
        program_info_uri: endpoint_uri("ProgramInfoEndpoint"),
    })
}

fn parse_service(
    doc: &Document,
    node: NodeId,
    profile: Profile,
    options: &ResolveOptions<'_>,
) -> Result<Service> {
    let titles = localized_children(doc, node, "ServiceName");
    let title = titles
        .first()
        .map(|t| t.text.clone())
        .ok_or_else(|| CatalogueError::missing("Service", "ServiceName"))?;
    let id = crate::xml::required_child_text(doc, node, "UniqueIdentifier")?.to_string();

    let providers = localized_children(doc, node, "ProviderName");
    let target_regions = child_texts(doc, node, "TargetRegion");

    let materials = related::related_materials(doc, node, profile);

    let mut instances = Vec::new();
    for instance in doc.children(node, "ServiceInstance") {
        if let Some(resolved) = resolve_instance(doc, instance, profile, options)? {
            instances.push(resolved);
        }
    }
    if instances.is_empty() {
        debug!("Service {} has no usable instances", id);
    }

    let mut kinds: Vec<&str> = Vec::new();
    for kind in instances.iter().filter_map(|i| i.source.as_ref()).map(|s| s.kind_label()) {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    Ok(Service {
        code: 0,
        title,
        titles,
        provider: providers.first().map(|p| p.text.clone()),
        providers,
        target_regions: if target_regions.is_empty() {
            None
        } else {
            Some(target_regions)
        },
        image: related::image(&materials, profile, related::SERVICE_ICON),
        out_of_service_image: related::image(&materials, profile, related::OUT_OF_SERVICE_IMAGE),
        content_guide: None,
        content_guide_service_ref: optional_child_text(doc, node, "ContentGuideServiceRef").map(str::to_string),
        lcn: 0,
        lcn_auto_assigned: false,
        source_types: kinds.join("/"),
        instances,
        apps: related::linked_apps(&materials),
        id,
    })
}

/// Number services from the default table; the rest get running
/// `max + 1` in document order, above every declared number.
fn assign_channel_numbers(services: &mut [Service], table: Option<&LcnTable>) -> Result<()> {
    let mut seen = std::collections::HashSet::new();

    for service in services.iter_mut() {
        match table.and_then(|t| t.channel_for(&service.id)) {
            Some(number) => {
                if !seen.insert(number) {
                    warn!("Channel number {} declared for more than one service", number);
                }
                service.lcn = number;
                service.lcn_auto_assigned = false;
            }
            None => service.lcn_auto_assigned = true,
        }
    }

    number_unassigned(services, table.and_then(LcnTable::max_channel).unwrap_or(0))
}

/// Give every auto-assigned service the next number above `max_lcn`.
/// Running past `u32::MAX` is an `InvalidNumber` error.
fn number_unassigned(services: &mut [Service], mut max_lcn: u32) -> Result<()> {
    for service in services.iter_mut().filter(|s| s.lcn_auto_assigned) {
        max_lcn = max_lcn
            .checked_add(1)
            .ok_or_else(|| CatalogueError::invalid_number("channelNumber", &max_lcn.to_string()))?;
        service.lcn = max_lcn;
    }
    Ok(())
}

#[cfg(test)]
#[path = "service_list_tests.rs"]
mod tests;
