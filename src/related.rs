//! RelatedMaterial links: imagery and linked applications
//!
//! Links are classified by a `HowRelated@href` code. The image codes live
//! under a scheme whose base (and the namespace of `HowRelated` itself)
//! depends on the document profile; the linked-application codes do not.

use serde::{Deserialize, Serialize};

use crate::xml::{optional_attribute, Document, NodeId};

pub const SERVICE_DISCOVERY_NS_2019: &str = "urn:dvb:metadata:servicediscovery:2019";
pub const SERVICE_DISCOVERY_NS_2020: &str = "urn:dvb:metadata:servicediscovery:2020";
pub const TVA_NS: &str = "urn:tva:metadata:2019";

/// Service list logo
pub const CATALOGUE_IMAGE: &str = "1001.1";
/// Service logo
pub const SERVICE_ICON: &str = "1001.2";
/// Shown while the service is off air
pub const OUT_OF_SERVICE_IMAGE: &str = "1000.1";

/// Application launched alongside playback
pub const LINKED_APP_PARALLEL: &str = "urn:dvb:metadata:cs:LinkedApplicationCS:2019:1.1";
/// Application presented over on-demand media
pub const LINKED_APP_MEDIA_PRESENTATION: &str = "urn:dvb:metadata:cs:LinkedApplicationCS:2019:1.2";

/// Namespace profile of a service list document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Profile {
    #[default]
    V2019,
    V2020,
}

impl Profile {
    /// Pick the profile from the root element's namespace.
    /// Anything unrecognised is treated as the 2019 profile.
    pub fn detect(root_namespace: Option<&str>) -> Self {
        match root_namespace {
            Some(SERVICE_DISCOVERY_NS_2020) => Profile::V2020,
            _ => Profile::V2019,
        }
    }

    /// Namespace of `HowRelated` and `MediaLocator`
    pub fn how_related_namespace(&self) -> &'static str {
        match self {
            Profile::V2019 => TVA_NS,
            Profile::V2020 => SERVICE_DISCOVERY_NS_2020,
        }
    }

    pub fn how_related_base(&self) -> &'static str {
        match self {
            Profile::V2019 => "urn:dvb:metadata:cs:HowRelatedCS:2019:",
            Profile::V2020 => "urn:dvb:metadata:cs:HowRelatedCS:2020:",
        }
    }

    /// Full `href` for a classification suffix such as [`SERVICE_ICON`]
    pub fn code(&self, suffix: &str) -> String {
        format!("{}{}", self.how_related_base(), suffix)
    }
}

/// One `RelatedMaterial` link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedMaterial {
    pub how_related: String,
    pub media_uri: Option<String>,
    pub content_type: Option<String>,
}

/// Application reference attached to a service or instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedApp {
    pub url: String,
    pub content_type: Option<String>,
}

/// Linked applications split by role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedApps {
    pub parallel: Vec<LinkedApp>,
    pub media_presentation: Vec<LinkedApp>,
}

/// Read the `RelatedMaterial` children of `node`.
///
/// Links without a `HowRelated@href` are skipped.
pub fn related_materials(doc: &Document, node: NodeId, profile: Profile) -> Vec<RelatedMaterial> {
    let ns = profile.how_related_namespace();

    doc.children(node, "RelatedMaterial")
        .filter_map(|material| {
            let how_related = doc
                .descendants_ns(material, ns, "HowRelated")
                .next()
                .and_then(|hr| optional_attribute(doc, hr, "href"))?;

            let media_uri = doc
                .descendants_ns(material, ns, "MediaLocator")
                .next()
                .and_then(|locator| doc.descendants_ns(locator, TVA_NS, "MediaUri").next());

            Some(RelatedMaterial {
                how_related: how_related.to_string(),
                media_uri: media_uri.and_then(|uri| doc.text(uri)).map(str::to_string),
                content_type: media_uri
                    .and_then(|uri| optional_attribute(doc, uri, "contentType"))
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Media URI of the last link carrying `profile.code(suffix)`
pub fn image(materials: &[RelatedMaterial], profile: Profile, suffix: &str) -> Option<String> {
    let code = profile.code(suffix);
    materials
        .iter()
        .rev()
        .find(|m| m.how_related == code && m.media_uri.is_some())
        .and_then(|m| m.media_uri.clone())
}

/// Linked applications; links without a media URI are ignored
pub fn linked_apps(materials: &[RelatedMaterial]) -> LinkedApps {
    let mut apps = LinkedApps::default();
    for material in materials {
        let Some(ref url) = material.media_uri else {
            continue;
        };
        let app = LinkedApp {
            url: url.clone(),
            content_type: material.content_type.clone(),
        };
        match material.how_related.as_str() {
            LINKED_APP_PARALLEL => apps.parallel.push(app),
            LINKED_APP_MEDIA_PRESENTATION => apps.media_presentation.push(app),
            _ => {}
        }
    }
    apps
}
