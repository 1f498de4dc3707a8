//! Service instance resolution
//!
//! Each `ServiceInstance` becomes a [`DeliveryInstance`] only if it offers
//! something the client can use: a DASH URL, a broadcast triplet the
//! channel map knows, or an on-demand overlay application. Instances whose
//! content protection the client cannot handle are dropped before that.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::availability::{self, Period};
use crate::channel_map::{ChannelMap, DvbChannel, Triplet};
use crate::error::{CatalogueError, Result};
use crate::related::{self, LinkedApps, Profile};
use crate::text::{localized_children, pick, LocalizedText};
use crate::xml::{optional_attribute, Document, NodeId};

/// Broadcast delivery system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BroadcastSystem {
    Terrestrial,
    Satellite,
    Cable,
}

impl BroadcastSystem {
    pub fn label(&self) -> &'static str {
        match self {
            BroadcastSystem::Terrestrial => "DVB-T",
            BroadcastSystem::Satellite => "DVB-S",
            BroadcastSystem::Cable => "DVB-C",
        }
    }

    /// Element that declares this system on a service instance
    fn delivery_element(&self) -> &'static str {
        match self {
            BroadcastSystem::Terrestrial => "DVBTDeliveryParameters",
            BroadcastSystem::Satellite => "DVBSDeliveryParameters",
            BroadcastSystem::Cable => "DVBCDeliveryParameters",
        }
    }
}

/// Where the instance is played from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliverySource {
    /// DVB-DASH manifest
    Dash { url: String },
    /// Tuned broadcast, resolved through the channel map
    Broadcast {
        system: BroadcastSystem,
        channel: DvbChannel,
    },
}

impl DeliverySource {
    /// `DVB-DASH`, `DVB-T`, `DVB-S` or `DVB-C`
    pub fn kind_label(&self) -> &'static str {
        match self {
            DeliverySource::Dash { .. } => "DVB-DASH",
            DeliverySource::Broadcast { system, .. } => system.label(),
        }
    }
}

/// One DRM system declared by an instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentProtection {
    pub encryption_scheme: Option<String>,
    pub drm_system_id: String,
    pub cps_index: Option<String>,
}

/// A usable way to obtain a service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInstance {
    pub titles: Vec<LocalizedText>,
    /// Client-side ordering hint, kept as written
    pub priority: Option<String>,
    /// `None` for instances kept only as an application launch point
    pub source: Option<DeliverySource>,
    pub content_protection: Vec<ContentProtection>,
    /// `None` means always available
    pub availability: Option<Vec<Period>>,
    pub apps: LinkedApps,
}

impl DeliveryInstance {
    pub fn title_for(&self, lang: &str) -> Option<&str> {
        pick(&self.titles, lang)
    }

    /// Priority as a number, if it is one
    pub fn priority_rank(&self) -> Option<i64> {
        self.priority.as_deref().and_then(|p| p.trim().parse().ok())
    }

    pub fn is_available(&self, now: DateTime<Utc>) -> bool {
        availability::is_available(self.availability.as_deref(), now)
    }

    pub fn dash_url(&self) -> Option<&str> {
        match self.source {
            Some(DeliverySource::Dash { ref url }) => Some(url.as_str()),
            _ => None,
        }
    }
}

/// Caller-supplied inputs that decide which instances survive
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions<'a> {
    /// Reachable broadcast channels; `None` disables broadcast matching
    pub channel_map: Option<&'a ChannelMap>,
    /// DRM system ids the client supports; `None` disables the DRM filter
    pub supported_drm: Option<&'a [String]>,
}

/// Whether any declared system is supported (case-insensitive).
/// Instances without protection always pass.
pub fn drm_supported(protection: &[ContentProtection], supported: Option<&[String]>) -> bool {
    match supported {
        Some(supported) if !protection.is_empty() => protection.iter().any(|cp| {
            supported
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&cp.drm_system_id))
        }),
        _ => true,
    }
}

/// Resolve one `ServiceInstance`. `Ok(None)` means it offers nothing usable.
pub fn resolve_instance(
    doc: &Document,
    node: NodeId,
    profile: Profile,
    options: &ResolveOptions<'_>,
) -> Result<Option<DeliveryInstance>> {
    let mut instance = DeliveryInstance {
        titles: localized_children(doc, node, "DisplayName"),
        priority: optional_attribute(doc, node, "priority").map(str::to_string),
        content_protection: parse_content_protection(doc, node)?,
        ..Default::default()
    };

    if !drm_supported(&instance.content_protection, options.supported_drm) {
        debug!(
            "Dropping instance: no supported DRM among {:?}",
            instance
                .content_protection
                .iter()
                .map(|cp| cp.drm_system_id.as_str())
                .collect::<Vec<_>>()
        );
        return Ok(None);
    }

    // Only one Availability element is allowed
    instance.availability = doc
        .first_child(node, "Availability")
        .map(|a| availability::parse_availability(doc, a));

    let materials = related::related_materials(doc, node, profile);
    instance.apps = related::linked_apps(&materials);

    instance.source = if let Some(dash) = doc.first_child(node, "DASHDeliveryParameters") {
        let url = doc.first_descendant(dash, "URI").and_then(|uri| doc.text(uri));
        if url.is_none() {
            debug!("DASH delivery without a URI");
        }
        url.map(|url| DeliverySource::Dash { url: url.to_string() })
    } else if let Some(channel_map) = options.channel_map {
        resolve_broadcast(doc, node, channel_map)
    } else {
        None
    };

    if instance.source.is_none() && instance.apps.media_presentation.is_empty() {
        debug!("Dropping instance: no usable delivery");
        return Ok(None);
    }

    Ok(Some(instance))
}

fn resolve_broadcast(doc: &Document, node: NodeId, channel_map: &ChannelMap) -> Option<DeliverySource> {
    let triplet_node = doc.first_descendant(node, "DVBTriplet")?;
    let triplet = parse_triplet(doc, triplet_node)?;

    let Some(channel) = channel_map.get(&triplet) else {
        debug!("Triplet {} not in channel map", triplet);
        return None;
    };

    [
        BroadcastSystem::Terrestrial,
        BroadcastSystem::Satellite,
        BroadcastSystem::Cable,
    ]
    .into_iter()
    .find(|system| doc.first_child(node, system.delivery_element()).is_some())
    .map(|system| DeliverySource::Broadcast {
        system,
        channel: channel.clone(),
    })
}

fn parse_triplet(doc: &Document, node: NodeId) -> Option<Triplet> {
    let field = |name: &str| -> Option<u16> {
        let value = doc.attribute(node, name)?;
        match value.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                debug!("Unusable DVBTriplet {}='{}'", name, value);
                None
            }
        }
    };
    Some(Triplet::new(field("origNetId")?, field("tsId")?, field("serviceId")?))
}

/// `ContentProtection/DRMSystemId` declarations of an instance.
///
/// The outer `DRMSystemId` carries the attributes, the nested one the id.
fn parse_content_protection(doc: &Document, node: NodeId) -> Result<Vec<ContentProtection>> {
    let mut out = Vec::new();
    for cp in doc.children(node, "ContentProtection") {
        for drm in doc.children(cp, "DRMSystemId") {
            let id = doc
                .first_child(drm, "DRMSystemId")
                .and_then(|inner| doc.text(inner))
                .or_else(|| doc.text(drm))
                .ok_or_else(|| CatalogueError::missing("ContentProtection", "DRMSystemId"))?;

            out.push(ContentProtection {
                encryption_scheme: optional_attribute(doc, drm, "encryptionScheme").map(str::to_string),
                drm_system_id: id.to_string(),
                cps_index: optional_attribute(doc, drm, "cpsIndex").map(str::to_string),
            });
        }
    }
    Ok(out)
}
