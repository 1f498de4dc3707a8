//! Tests for service list parsing and region selection

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{TimeZone, Utc};

    use crate::channel_map::ChannelMap;
    use crate::error::CatalogueError;
    use crate::instance::{DeliverySource, ResolveOptions};
    use crate::related::Profile;
    use crate::service_list::*;

    const TV1: &str = "tag:example.com,2024:tv1";
    const TV5: &str = "tag:example.com,2024:tv5";
    const LOCAL: &str = "tag:example.com,2024:local";
    const RADIO: &str = "tag:example.com,2024:radio";
    const EXTRA: &str = "tag:example.com,2024:extra";

    const SERVICE_LIST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ServiceList xmlns="urn:dvb:metadata:servicediscovery:2019" xmlns:tva="urn:tva:metadata:2019" version="1">
  <Name xml:lang="en">Example list</Name>
  <ProviderName>Example</ProviderName>
  <RelatedMaterial>
    <tva:HowRelated href="urn:dvb:metadata:cs:HowRelatedCS:2019:1001.1"/>
    <tva:MediaLocator><tva:MediaUri contentType="image/png">http://img/list.png</tva:MediaUri></tva:MediaLocator>
  </RelatedMaterial>
  <RegionList version="1">
    <Region regionID="FI" countryCodes="FIN">
      <RegionName xml:lang="en">Finland</RegionName>
      <Region regionID="FI-HKI">
        <RegionName>Helsinki</RegionName>
        <PostcodeRange from="00100" to="00990"/>
      </Region>
      <Region regionID="FI-TRE">
        <RegionName>Tampere</RegionName>
        <WildcardPostcode>33*</WildcardPostcode>
      </Region>
    </Region>
  </RegionList>
  <LCNTableList>
    <LCNTable>
      <LCN channelNumber="1" serviceRef="tag:example.com,2024:tv1"/>
      <LCN channelNumber="5" serviceRef="tag:example.com,2024:tv5"/>
    </LCNTable>
    <LCNTable>
      <TargetRegion>FI-HKI</TargetRegion>
      <LCN channelNumber="11" serviceRef="tag:example.com,2024:tv1"/>
      <LCN channelNumber="15" serviceRef="tag:example.com,2024:local"/>
    </LCNTable>
  </LCNTableList>
  <ContentGuideSource CGSID="cgs-1">
    <ProviderName>EPG</ProviderName>
    <ScheduleInfoEndpoint contentType="application/xml"><URI>http://epg/schedule</URI></ScheduleInfoEndpoint>
    <ProgramInfoEndpoint contentType="application/xml"><URI>http://epg/program</URI></ProgramInfoEndpoint>
  </ContentGuideSource>
  <Service version="1">
    <UniqueIdentifier>tag:example.com,2024:tv1</UniqueIdentifier>
    <ServiceInstance priority="2">
      <DisplayName>TV1 protected</DisplayName>
      <ContentProtection>
        <DRMSystemId encryptionScheme="cenc" cpsIndex="1"><DRMSystemId>urn:uuid:widevine</DRMSystemId></DRMSystemId>
      </ContentProtection>
      <DASHDeliveryParameters>
        <UriBasedLocation contentType="application/dash+xml"><URI>http://cdn/tv1-drm.mpd</URI></UriBasedLocation>
      </DASHDeliveryParameters>
    </ServiceInstance>
    <ServiceInstance>
      <DVBTDeliveryParameters>
        <DVBTriplet origNetId="8438" tsId="4097" serviceId="17"/>
        <TargetCountry>FIN</TargetCountry>
      </DVBTDeliveryParameters>
    </ServiceInstance>
    <ServiceInstance priority="1">
      <DASHDeliveryParameters>
        <UriBasedLocation contentType="application/dash+xml"><URI>http://cdn/tv1.mpd</URI></UriBasedLocation>
      </DASHDeliveryParameters>
    </ServiceInstance>
    <ServiceName xml:lang="en">TV One</ServiceName>
    <ServiceName xml:lang="fi">Tee Vee Yksi</ServiceName>
    <ProviderName>Example Broadcasting</ProviderName>
    <RelatedMaterial>
      <tva:HowRelated href="urn:dvb:metadata:cs:HowRelatedCS:2019:1001.2"/>
      <tva:MediaLocator><tva:MediaUri contentType="image/png">http://img/tv1.png</tva:MediaUri></tva:MediaLocator>
    </RelatedMaterial>
    <RelatedMaterial>
      <tva:HowRelated href="urn:dvb:metadata:cs:HowRelatedCS:2019:1000.1"/>
      <tva:MediaLocator><tva:MediaUri contentType="image/png">http://img/tv1-off.png</tva:MediaUri></tva:MediaLocator>
    </RelatedMaterial>
  </Service>
  <Service version="1">
    <UniqueIdentifier>tag:example.com,2024:tv5</UniqueIdentifier>
    <ServiceInstance>
      <Availability>
        <Period validFrom="2024-01-01T00:00:00Z" validTo="2024-12-31T23:59:59Z"/>
      </Availability>
      <DASHDeliveryParameters>
        <UriBasedLocation contentType="application/dash+xml"><URI>http://cdn/tv5.mpd</URI></UriBasedLocation>
      </DASHDeliveryParameters>
    </ServiceInstance>
    <ServiceName>TV Five &amp; Friends</ServiceName>
    <ContentGuideServiceRef>tv5-epg</ContentGuideServiceRef>
  </Service>
  <Service version="1">
    <UniqueIdentifier>tag:example.com,2024:local</UniqueIdentifier>
    <TargetRegion>FI-HKI</TargetRegion>
    <ServiceName>Local News</ServiceName>
  </Service>
  <Service version="1">
    <UniqueIdentifier>tag:example.com,2024:radio</UniqueIdentifier>
    <TargetRegion>FI-TRE</TargetRegion>
    <ServiceName>Radio Tampere</ServiceName>
  </Service>
  <Service version="1">
    <UniqueIdentifier>tag:example.com,2024:extra</UniqueIdentifier>
    <ServiceName>Extra</ServiceName>
  </Service>
</ServiceList>"#;

    fn parse_default() -> Catalogue {
        parse_service_list(SERVICE_LIST, &ResolveOptions::default()).unwrap()
    }

    fn lcn_of(catalogue: &Catalogue, id: &str) -> u32 {
        catalogue.service(id).unwrap().lcn
    }

    #[test]
    fn test_basic_catalogue() {
        let catalogue = parse_default();

        assert_eq!(catalogue.profile, Profile::V2019);
        assert_eq!(catalogue.names[0].text, "Example list");
        assert_eq!(catalogue.image.as_deref(), Some("http://img/list.png"));
        assert_eq!(catalogue.services.len(), 5);
        assert_eq!(catalogue.regions.len(), 3);
        assert_eq!(catalogue.lcn_tables.len(), 2);

        let codes: Vec<usize> = catalogue.services.iter().map(|s| s.code).collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_service_fields() {
        let catalogue = parse_default();
        let tv1 = catalogue.service(TV1).unwrap();

        assert_eq!(tv1.title, "TV One");
        assert_eq!(tv1.title_for("fi"), "Tee Vee Yksi");
        assert_eq!(tv1.title_for("de"), "TV One");
        assert_eq!(tv1.provider.as_deref(), Some("Example Broadcasting"));
        assert_eq!(tv1.target_regions, None);
        assert_eq!(tv1.image.as_deref(), Some("http://img/tv1.png"));
        assert_eq!(tv1.out_of_service_image.as_deref(), Some("http://img/tv1-off.png"));

        let tv5 = catalogue.service(TV5).unwrap();
        assert_eq!(tv5.title, "TV Five & Friends");
        assert_eq!(tv5.provider, None);
        assert_eq!(tv5.content_guide_service_ref.as_deref(), Some("tv5-epg"));

        let local = catalogue.service(LOCAL).unwrap();
        assert_eq!(local.target_regions, Some(vec!["FI-HKI".to_string()]));
        assert!(local.instances.is_empty());
        assert_eq!(local.source_types, "");
    }

    #[test]
    fn test_content_guide_inherited() {
        let catalogue = parse_default();
        for service in &catalogue.services {
            let guide = service.content_guide.as_ref().unwrap();
            assert_eq!(guide.schedule_info_uri, "http://epg/schedule");
            assert_eq!(guide.program_info_uri.as_deref(), Some("http://epg/program"));
            assert_eq!(guide.more_episodes_uri, None);
        }
    }

    #[test]
    fn test_declared_and_auto_channel_numbers() {
        let catalogue = parse_default();

        assert_eq!(lcn_of(&catalogue, TV1), 1);
        assert_eq!(lcn_of(&catalogue, TV5), 5);
        // Auto-assigned after the highest declared number, in document order
        assert_eq!(lcn_of(&catalogue, LOCAL), 6);
        assert_eq!(lcn_of(&catalogue, RADIO), 7);
        assert_eq!(lcn_of(&catalogue, EXTRA), 8);
        assert!(catalogue.service(LOCAL).unwrap().lcn_auto_assigned);
        assert!(!catalogue.service(TV1).unwrap().lcn_auto_assigned);
    }

    #[test]
    fn test_channel_numbers_unique() {
        let catalogue = parse_default();
        let numbers: HashSet<u32> = catalogue.services.iter().map(|s| s.lcn).collect();
        assert_eq!(numbers.len(), catalogue.services.len());
        assert!(catalogue.services.iter().all(|s| s.lcn > 0));
    }

    #[test]
    fn test_no_lcn_tables_numbers_from_one() {
        let xml = r#"<ServiceList xmlns="urn:dvb:metadata:servicediscovery:2019">
  <Service><UniqueIdentifier>a</UniqueIdentifier><ServiceName>A</ServiceName></Service>
  <Service><UniqueIdentifier>b</UniqueIdentifier><ServiceName>B</ServiceName></Service>
</ServiceList>"#;
        let catalogue = parse_service_list(xml, &ResolveOptions::default()).unwrap();
        let numbers: Vec<u32> = catalogue.services.iter().map(|s| s.lcn).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert!(catalogue.services.iter().all(|s| s.lcn_auto_assigned));
    }

    #[test]
    fn test_instances_without_channel_map() {
        let catalogue = parse_default();
        let tv1 = catalogue.service(TV1).unwrap();

        // Terrestrial instance needs a channel map
        assert_eq!(tv1.instances.len(), 2);
        assert_eq!(tv1.source_types, "DVB-DASH");
        assert_eq!(tv1.instances[0].content_protection.len(), 1);
    }

    #[test]
    fn test_instances_with_channel_map() {
        let map = ChannelMap::from_json(r#"[{"onid": 8438, "tsid": 4097, "sid": 17, "name": "TV1"}]"#).unwrap();
        let options = ResolveOptions {
            channel_map: Some(&map),
            ..Default::default()
        };
        let catalogue = parse_service_list(SERVICE_LIST, &options).unwrap();
        let tv1 = catalogue.service(TV1).unwrap();

        assert_eq!(tv1.instances.len(), 3);
        assert_eq!(tv1.source_types, "DVB-DASH/DVB-T");
        assert!(matches!(
            tv1.instances[1].source,
            Some(DeliverySource::Broadcast { ref channel, .. }) if channel.name.as_deref() == Some("TV1")
        ));
    }

    #[test]
    fn test_drm_filter() {
        let supported = vec!["X".to_string()];
        let options = ResolveOptions {
            supported_drm: Some(supported.as_slice()),
            ..Default::default()
        };
        let catalogue = parse_service_list(SERVICE_LIST, &options).unwrap();
        let tv1 = catalogue.service(TV1).unwrap();

        assert_eq!(tv1.instances.len(), 1);
        assert_eq!(tv1.instances[0].dash_url(), Some("http://cdn/tv1.mpd"));

        let supported = vec!["URN:UUID:WIDEVINE".to_string()];
        let options = ResolveOptions {
            supported_drm: Some(supported.as_slice()),
            ..Default::default()
        };
        let catalogue = parse_service_list(SERVICE_LIST, &options).unwrap();
        assert_eq!(catalogue.service(TV1).unwrap().instances.len(), 2);
    }

    #[test]
    fn test_available_instances_ordering() {
        let catalogue = parse_default();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let urls: Vec<_> = catalogue
            .service(TV1)
            .unwrap()
            .available_instances(now)
            .iter()
            .filter_map(|i| i.dash_url())
            .collect();
        assert_eq!(urls, vec!["http://cdn/tv1.mpd", "http://cdn/tv1-drm.mpd"]);
    }

    #[test]
    fn test_available_instances_respects_period() {
        let catalogue = parse_default();
        let tv5 = catalogue.service(TV5).unwrap();

        let inside = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(tv5.available_instances(inside).len(), 1);
        assert!(tv5.available_instances(after).is_empty());
    }

    #[test]
    fn test_find_region_by_postcode() {
        let catalogue = parse_default();

        assert_eq!(catalogue.find_region_by_postcode("00500").unwrap().region_id, "FI-HKI");
        assert_eq!(catalogue.find_region_by_postcode("33100").unwrap().region_id, "FI-TRE");
        assert!(catalogue.find_region_by_postcode("99999").is_none());
        assert_eq!(catalogue.region("FI-TRE").unwrap().parent_id.as_deref(), Some("FI"));
    }

    #[test]
    fn test_select_region() {
        let mut catalogue = parse_default();
        let unrestricted = catalogue.services.iter().filter(|s| s.target_regions.is_none()).count();

        catalogue.select_region("FI-HKI").unwrap();

        let ids: Vec<&str> = catalogue.services.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![TV1, TV5, LOCAL, EXTRA]);
        assert!(catalogue.services.len() >= unrestricted);

        assert_eq!(lcn_of(&catalogue, TV1), 11);
        assert_eq!(lcn_of(&catalogue, LOCAL), 15);
        assert!(!catalogue.service(LOCAL).unwrap().lcn_auto_assigned);
        // Declared by the default table only, keeps its number
        assert_eq!(lcn_of(&catalogue, TV5), 5);
        // Auto-numbered again above the regional table
        assert_eq!(lcn_of(&catalogue, EXTRA), 16);
        assert!(catalogue.service(EXTRA).unwrap().lcn_auto_assigned);
    }

    #[test]
    fn test_select_region_renumbers_auto_assigned() {
        let xml = r#"<ServiceList xmlns="urn:dvb:metadata:servicediscovery:2019">
  <LCNTableList>
    <LCNTable><LCN channelNumber="1" serviceRef="a"/></LCNTable>
    <LCNTable><TargetRegion>R</TargetRegion><LCN channelNumber="2" serviceRef="a"/></LCNTable>
  </LCNTableList>
  <Service><UniqueIdentifier>a</UniqueIdentifier><ServiceName>A</ServiceName></Service>
  <Service><UniqueIdentifier>b</UniqueIdentifier><ServiceName>B</ServiceName></Service>
  <Service><UniqueIdentifier>c</UniqueIdentifier><ServiceName>C</ServiceName></Service>
</ServiceList>"#;
        let mut catalogue = parse_service_list(xml, &ResolveOptions::default()).unwrap();
        assert_eq!(lcn_of(&catalogue, "b"), 2);

        catalogue.select_region("R").unwrap();

        assert_eq!(lcn_of(&catalogue, "a"), 2);
        assert_eq!(lcn_of(&catalogue, "b"), 3);
        assert_eq!(lcn_of(&catalogue, "c"), 4);
        let numbers: HashSet<u32> = catalogue.services.iter().map(|s| s.lcn).collect();
        assert_eq!(numbers.len(), catalogue.services.len());
    }

    const NUMBERING_AT_LIMIT: &str = r#"<ServiceList xmlns="urn:dvb:metadata:servicediscovery:2019">
  <LCNTableList>
    <LCNTable><LCN channelNumber="4294967295" serviceRef="a"/></LCNTable>
  </LCNTableList>
  <Service><UniqueIdentifier>a</UniqueIdentifier><ServiceName>A</ServiceName></Service>
  <Service><UniqueIdentifier>b</UniqueIdentifier><ServiceName>B</ServiceName></Service>
</ServiceList>"#;

    #[test]
    fn test_auto_number_past_limit_is_error() {
        let err = parse_service_list(NUMBERING_AT_LIMIT, &ResolveOptions::default()).unwrap_err();
        assert!(matches!(err, CatalogueError::InvalidNumber { ref value, .. } if value == "4294967295"));

        // The highest number alone is fine
        let single = NUMBERING_AT_LIMIT.replace(
            "<Service><UniqueIdentifier>b</UniqueIdentifier><ServiceName>B</ServiceName></Service>",
            "",
        );
        let catalogue = parse_service_list(&single, &ResolveOptions::default()).unwrap();
        assert_eq!(lcn_of(&catalogue, "a"), u32::MAX);
    }

    #[test]
    fn test_select_region_overflow_leaves_catalogue() {
        let xml = r#"<ServiceList xmlns="urn:dvb:metadata:servicediscovery:2019">
  <LCNTableList>
    <LCNTable><LCN channelNumber="1" serviceRef="a"/></LCNTable>
    <LCNTable><TargetRegion>R</TargetRegion><LCN channelNumber="4294967295" serviceRef="a"/></LCNTable>
  </LCNTableList>
  <Service><UniqueIdentifier>a</UniqueIdentifier><ServiceName>A</ServiceName></Service>
  <Service><UniqueIdentifier>b</UniqueIdentifier><ServiceName>B</ServiceName></Service>
</ServiceList>"#;
        let mut catalogue = parse_service_list(xml, &ResolveOptions::default()).unwrap();
        let before = catalogue.clone();

        assert!(matches!(catalogue.select_region("R"), Err(CatalogueError::InvalidNumber { .. })));
        assert_eq!(catalogue, before);
    }

    #[test]
    fn test_select_unknown_region_is_error() {
        let mut catalogue = parse_default();

        let err = catalogue.select_region("FI-TRE").unwrap_err();
        assert!(matches!(err, CatalogueError::NoLcnTable(ref id) if id == "FI-TRE"));
        assert!(matches!(catalogue.select_region("XX"), Err(CatalogueError::NoLcnTable(_))));
        assert_eq!(catalogue.services.len(), 5);
    }

    #[test]
    fn test_profile_2020() {
        let xml = r#"<ServiceList xmlns="urn:dvb:metadata:servicediscovery:2020" xmlns:tva="urn:tva:metadata:2019">
  <RelatedMaterial>
    <HowRelated href="urn:dvb:metadata:cs:HowRelatedCS:2020:1001.1"/>
    <MediaLocator><tva:MediaUri>http://img/list-2020.png</tva:MediaUri></MediaLocator>
  </RelatedMaterial>
  <Service>
    <UniqueIdentifier>svc</UniqueIdentifier>
    <ServiceName>Service</ServiceName>
    <RelatedMaterial>
      <HowRelated href="urn:dvb:metadata:cs:HowRelatedCS:2020:1001.2"/>
      <MediaLocator><tva:MediaUri>http://img/icon-2020.png</tva:MediaUri></MediaLocator>
    </RelatedMaterial>
    <RelatedMaterial>
      <HowRelated href="urn:dvb:metadata:cs:HowRelatedCS:2019:1000.1"/>
      <MediaLocator><tva:MediaUri>http://img/wrong-scheme.png</tva:MediaUri></MediaLocator>
    </RelatedMaterial>
  </Service>
</ServiceList>"#;
        let catalogue = parse_service_list(xml, &ResolveOptions::default()).unwrap();

        assert_eq!(catalogue.profile, Profile::V2020);
        assert_eq!(catalogue.image.as_deref(), Some("http://img/list-2020.png"));
        let service = catalogue.service("svc").unwrap();
        assert_eq!(service.image.as_deref(), Some("http://img/icon-2020.png"));
        assert_eq!(service.out_of_service_image, None);
    }

    #[test]
    fn test_service_without_name_is_error() {
        let xml = r#"<ServiceList><Service><UniqueIdentifier>a</UniqueIdentifier></Service></ServiceList>"#;
        let err = parse_service_list(xml, &ResolveOptions::default()).unwrap_err();
        assert!(matches!(err, CatalogueError::MissingField { ref field, .. } if field == "ServiceName"));
    }

    #[test]
    fn test_service_without_identifier_is_error() {
        let xml = r#"<ServiceList><Service><ServiceName>A</ServiceName></Service></ServiceList>"#;
        let err = parse_service_list(xml, &ResolveOptions::default()).unwrap_err();
        assert!(matches!(err, CatalogueError::MissingField { ref field, .. } if field == "UniqueIdentifier"));
    }

    #[test]
    fn test_content_guide_without_schedule_is_error() {
        let xml = r#"<ServiceList>
  <ContentGuideSource><ProgramInfoEndpoint><URI>http://epg/p</URI></ProgramInfoEndpoint></ContentGuideSource>
</ServiceList>"#;
        assert!(matches!(
            parse_service_list(xml, &ResolveOptions::default()),
            Err(CatalogueError::MissingField { .. })
        ));
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(parse_service_list("", &ResolveOptions::default()).is_err());
        assert!(parse_service_list("<ServiceList><Service></ServiceList>", &ResolveOptions::default()).is_err());
    }
}
