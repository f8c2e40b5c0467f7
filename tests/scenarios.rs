//! Fixed scenarios: context-dependent resolution, concrete payload layouts
//! and the file façade.

use mpegts_descriptors::constants::*;
use mpegts_descriptors::descriptor::event_group::ActualEvent;
use mpegts_descriptors::descriptor::{
    self, ContentAvailabilityDescriptor, EventGroupDescriptor, LogicalChannelNumberDescriptor,
};
use mpegts_descriptors::tree::json;
use mpegts_descriptors::{Context, DescriptorFile, DescriptorList, Registry, Standards};

fn last_name(data: &[u8], table_id: Option<u8>, ctx: &Context) -> &'static str {
    DescriptorList::decode(data, table_id, ctx, Registry::global())
        .iter()
        .last()
        .map(|d| d.name())
        .unwrap_or("none")
}

mod resolution {
    use super::*;

    #[test]
    fn isdb_tag_needs_isdb_flag() {
        let data = [TAG_ISDB_CONTENT_AVAILABILITY, 0x01, 0xA9];
        assert_eq!(last_name(&data, None, &Context::new(Standards::DVB)), "generic_descriptor");
        assert_eq!(
            last_name(&data, None, &Context::new(Standards::ISDB)),
            "content_availability_descriptor"
        );
    }

    #[test]
    fn private_tag_needs_specifier() {
        let lcn = [0x83, 0x04, 0x00, 0x01, 0xFC, 0x05];
        let dvb = Context::new(Standards::DVB);
        assert_eq!(last_name(&lcn, None, &dvb), "generic_descriptor");

        // Specifier from a preceding descriptor.
        let mut with_pds = vec![0x5F, 0x04, 0x00, 0x00, 0x00, 0x28];
        with_pds.extend_from_slice(&lcn);
        assert_eq!(last_name(&with_pds, None, &dvb), "eacem_logical_channel_number_descriptor");

        // Specifier from the context default.
        let ctx = Context::new(Standards::DVB).with_private_specifier(PDS_EACEM);
        assert_eq!(last_name(&lcn, None, &ctx), "eacem_logical_channel_number_descriptor");
    }

    #[test]
    fn table_id_selects_variant() {
        let data = [0x09, 0x04, 0xFF, 0xFF, 0xFF, 0x00];
        let ctx = Context::default();
        assert_eq!(last_name(&data, None, &ctx), "CA_descriptor");
        assert_eq!(last_name(&data, Some(TID_INT), &ctx), "target_IP_address_descriptor");
    }

    #[test]
    fn specifier_does_not_leak_between_lists() {
        let ctx = Context::new(Standards::DVB);
        let pds = [0x5F, 0x04, 0x00, 0x00, 0x00, 0x28];
        let list = DescriptorList::decode(&pds, None, &ctx, Registry::global());
        assert_eq!(list.len(), 1);
        assert_eq!(ctx.private_specifier(), None);
        assert_eq!(ctx.specifier_depth(), 0);
    }
}

mod layouts {
    use super::*;

    #[test]
    fn content_availability_single_byte() {
        let ctx = Context::new(Standards::ISDB);
        let desc = ContentAvailabilityDescriptor {
            copy_restriction_mode: false,
            image_constraint_token: true,
            retention_mode: false,
            retention_state: 5,
            ..Default::default()
        };
        let payload = descriptor::payload_bytes(&desc, &ctx).unwrap();
        assert_eq!(payload.len(), 1);

        let mut back = ContentAvailabilityDescriptor::default();
        assert!(descriptor::decode_payload(&mut back, &payload, &ctx));
        assert!(!back.copy_restriction_mode);
        assert!(back.image_constraint_token);
        assert!(!back.retention_mode);
        assert_eq!(back.retention_state, 5);

        let e = descriptor::to_element(&desc, &ctx);
        assert_eq!(e.attr("copy_restriction_mode"), Some("false"));
        assert_eq!(e.attr("image_constraint_token"), Some("true"));
        assert_eq!(e.attr("retention_mode"), Some("false"));
        assert_eq!(e.attr("retention_state"), Some("5"));
        let v = json::to_value(&e);
        assert_eq!(v["retention_state"], 5);
        assert_eq!(v["image_constraint_token"], true);
    }

    #[test]
    fn event_group_corrupted_length() {
        let ctx = Context::new(Standards::ISDB);
        let mut list = DescriptorList::new();
        list.push(Box::new(EventGroupDescriptor {
            group_type: 1,
            actual_events: vec![
                ActualEvent { service_id: 0x0101, event_id: 0x2001 },
                ActualEvent { service_id: 0x0102, event_id: 0x2002 },
            ],
            ..Default::default()
        }));
        let mut data = list.to_bytes(&ctx);
        assert_eq!(data.len(), 2 + 9);
        assert_eq!(data[1], 9);

        data[1] = 8;
        let broken = DescriptorList::decode(&data, None, &ctx, Registry::global());
        assert!(!broken.is_valid());
        let pairs: usize = broken
            .iter()
            .filter_map(|d| d.downcast_ref::<EventGroupDescriptor>())
            .map(|eg| eg.actual_events.len())
            .sum();
        assert!(pairs <= 1);
    }

    #[test]
    fn oversized_field_rejected_on_import() {
        let mut file = DescriptorFile::new(Context::new(Standards::ISDB));
        let text = r#"<descriptor_list>
  <content_availability_descriptor copy_restriction_mode="false" image_constraint_token="true"
      retention_mode="false" retention_state="9" encryption_mode="false"/>
</descriptor_list>"#;
        let err = file.from_xml(text).unwrap_err();
        assert!(format!("{err:#}").contains("retention_state"));
        assert_eq!(file.count(), 0);
    }
}

mod files {
    use super::*;

    #[test]
    fn save_and_reload_every_form() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new(Standards::DVB).with_private_specifier(PDS_EACEM);

        let mut file = DescriptorFile::new(ctx.clone());
        file.from_binary(&[0x83, 0x08, 0x00, 0x01, 0xFC, 0x05, 0x00, 0x02, 0x7C, 0x06]).unwrap();
        let lcn = file.list().get(0).and_then(|d| d.downcast_ref::<LogicalChannelNumberDescriptor>());
        assert_eq!(lcn.map(|l| l.entries.len()), Some(2));
        assert_eq!(lcn.map(|l| l.entries[1].visible), Some(false));

        let bin = dir.path().join("lcn.bin");
        let xml = dir.path().join("lcn.xml");
        let json = dir.path().join("lcn.json");
        file.save_binary(&bin).unwrap();
        file.save_xml(&xml).unwrap();
        file.save_json(&json).unwrap();

        let mut from_bin = DescriptorFile::new(ctx.clone());
        from_bin.load_binary(&bin).unwrap();
        let mut from_xml = DescriptorFile::new(ctx.clone());
        from_xml.load_xml(&xml).unwrap();
        let mut from_json = DescriptorFile::new(ctx.clone());
        from_json.load_json(&json).unwrap();
        for again in [&from_bin, &from_xml, &from_json] {
            assert_eq!(again.count(), 1);
            assert_eq!(again.to_binary(), file.to_binary());
        }
    }

    #[test]
    fn missing_file_names_path() {
        let mut file = DescriptorFile::new(Context::default());
        let err = file.load_binary("/nonexistent/list.bin").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/list.bin"));
    }
}
