//! Service list and provider directory output
//!
//! Publishes the channels of a [`ChannelMap`] as a DVB-I service list, and
//! a set of offerings as a provider directory pointing at such lists. Both
//! documents read back through [`parse_service_list`](crate::parse_service_list)
//! and [`parse_provider_directory`](crate::provider::parse_provider_directory).

use log::info;
use quick_xml::escape::escape;

use crate::channel_map::{ChannelMap, DvbChannel};
use crate::provider::{ProviderOffering, SERVICE_LIST_DISCOVERY_NS};
use crate::related::{SERVICE_DISCOVERY_NS_2019, TVA_NS};

const DASH_SOURCE_TYPE: &str = "urn:dvb:metadata:source:dvb-dash";
const DASH_CONTENT_TYPE: &str = "application/dash+xml";

/// Header fields of a generated service list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceListInfo {
    pub name: String,
    pub provider: String,
    /// Prefix for relative channel sources
    pub base_url: String,
}

/// Unique identifier for a published channel: `tag:<provider>,2022:<name>`
/// with the name lowercased and spaces replaced by `_`. Unnamed channels
/// use their triplet.
pub fn service_ref(provider: &str, channel: &DvbChannel) -> String {
    let name = match channel.name {
        Some(ref name) => name.to_lowercase().replace(' ', "_"),
        None => channel.triplet().to_string(),
    };
    format!("tag:{},2022:{}", provider, name)
}

fn source_url(base_url: &str, source: &str) -> String {
    if source.starts_with("http://") || source.starts_with("https://") {
        return source.to_string();
    }
    format!("{}/{}", base_url.trim_end_matches('/'), source.trim_start_matches('/'))
}

/// Render `channels` as a 2019 service list.
///
/// Channels with a number get an entry in a single unscoped LCN table.
/// Channels with a source get one DASH instance at `base_url/source`.
pub fn write_service_list(info: &ServiceListInfo, channels: &ChannelMap) -> String {
    let provider = escape(info.provider.as_str());
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<ServiceList xmlns=\"{}\" xmlns:tva=\"{}\" version=\"1\">\n",
        SERVICE_DISCOVERY_NS_2019, TVA_NS
    ));
    xml.push_str(&format!("  <Name>{}</Name>\n", escape(info.name.as_str())));
    xml.push_str(&format!("  <ProviderName>{}</ProviderName>\n", provider));

    xml.push_str("  <LCNTableList>\n    <LCNTable>\n");
    for channel in channels.channels() {
        if let Some(number) = channel.lcn {
            xml.push_str(&format!(
                "      <LCN channelNumber=\"{}\" serviceRef=\"{}\"/>\n",
                number,
                escape(service_ref(&info.provider, channel).as_str())
            ));
        }
    }
    xml.push_str("    </LCNTable>\n  </LCNTableList>\n");

    for channel in channels.channels() {
        let name = channel.name.clone().unwrap_or_else(|| channel.triplet().to_string());
        xml.push_str("  <Service version=\"1\">\n");
        xml.push_str(&format!(
            "    <UniqueIdentifier>{}</UniqueIdentifier>\n",
            escape(service_ref(&info.provider, channel).as_str())
        ));
        if let Some(ref source) = channel.source {
            xml.push_str("    <ServiceInstance priority=\"1\">\n");
            xml.push_str(&format!("      <SourceType>{}</SourceType>\n", DASH_SOURCE_TYPE));
            xml.push_str("      <DASHDeliveryParameters>\n");
            xml.push_str(&format!(
                "        <UriBasedLocation contentType=\"{}\"><URI>{}</URI></UriBasedLocation>\n",
                DASH_CONTENT_TYPE,
                escape(source_url(&info.base_url, source).as_str())
            ));
            xml.push_str("      </DASHDeliveryParameters>\n");
            xml.push_str("    </ServiceInstance>\n");
        }
        xml.push_str(&format!("    <ServiceName>{}</ServiceName>\n", escape(name.as_str())));
        xml.push_str(&format!("    <ProviderName>{}</ProviderName>\n", provider));
        xml.push_str("  </Service>\n");
    }

    xml.push_str("</ServiceList>\n");
    info!("Wrote service list '{}' with {} services", info.name, channels.len());
    xml
}

/// Render a provider directory listing every offered service list
pub fn write_provider_directory(providers: &[ProviderOffering]) -> String {
    let mut xml = String::new();

    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<sld:ServiceListEntryPoints xmlns:sld=\"{}\" xmlns:dvbisd=\"{}\">\n",
        SERVICE_LIST_DISCOVERY_NS, SERVICE_DISCOVERY_NS_2019
    ));
    xml.push_str("  <sld:ServiceListRegistryEntity regulatorFlag=\"false\"/>\n");

    for provider in providers {
        xml.push_str("  <sld:ProviderOffering>\n");
        if let Some(ref name) = provider.name {
            xml.push_str(&format!(
                "    <sld:Provider><sld:Name>{}</sld:Name></sld:Provider>\n",
                escape(name.as_str())
            ));
        }
        for list in &provider.service_lists {
            xml.push_str("    <sld:ServiceListOffering>\n");
            xml.push_str(&format!(
                "      <sld:ServiceListName>{}</sld:ServiceListName>\n",
                escape(list.name.as_str())
            ));
            xml.push_str(&format!(
                "      <sld:ServiceListURI contentType=\"application/xml\"><dvbisd:URI>{}</dvbisd:URI></sld:ServiceListURI>\n",
                escape(list.url.as_str())
            ));
            for country in &list.target_countries {
                xml.push_str(&format!(
                    "      <sld:TargetCountry>{}</sld:TargetCountry>\n",
                    escape(country.as_str())
                ));
            }
            xml.push_str("    </sld:ServiceListOffering>\n");
        }
        xml.push_str("  </sld:ProviderOffering>\n");
    }

    xml.push_str("</sld:ServiceListEntryPoints>\n");
    xml
}
