//! Codec-wide properties over generated descriptor lists: binary and tree
//! round trips, truncation safety, opaque pass-through, specifier scopes and
//! the agreement between `is_valid` and what can be encoded.

use proptest::collection::vec;
use proptest::prelude::*;

use mpegts_descriptors::constants::TID_INT;
use mpegts_descriptors::descriptor::data_broadcast_id::{
    IntPlatform, IntSelector, MpeSelector, SsuEntry, SsuSelector,
};
use mpegts_descriptors::descriptor::event_group::{ActualEvent, OtherEvent};
use mpegts_descriptors::descriptor::logical_channel::LogicalChannel;
use mpegts_descriptors::descriptor::{self, *};
use mpegts_descriptors::display::display_list;
use mpegts_descriptors::tree::{json, xml};
use mpegts_descriptors::{Context, Descriptor, DescriptorList, ReadCursor, Registry, Standards};

fn isdb_context() -> Context {
    Context::new(Standards::DVB | Standards::ISDB)
}

fn boxed<D: Descriptor + 'static>(d: D) -> Box<dyn Descriptor> {
    Box::new(d)
}

fn ca() -> impl Strategy<Value = Box<dyn Descriptor>> {
    (any::<u16>(), 0u16..0x2000, vec(any::<u8>(), 0..20)).prop_map(|(ca_system_id, ca_pid, private_data)| {
        boxed(CaDescriptor {
            ca_system_id,
            ca_pid,
            private_data,
        })
    })
}

fn content_availability() -> impl Strategy<Value = Box<dyn Descriptor>> {
    (any::<[bool; 4]>(), 0u8..8, vec(any::<u8>(), 0..4)).prop_map(|(f, retention_state, reserved_future_use)| {
        boxed(ContentAvailabilityDescriptor {
            copy_restriction_mode: f[0],
            image_constraint_token: f[1],
            retention_mode: f[2],
            retention_state,
            encryption_mode: f[3],
            reserved_future_use,
        })
    })
}

fn event_group() -> impl Strategy<Value = Box<dyn Descriptor>> {
    (
        0u8..16,
        vec(any::<(u16, u16)>(), 0..=15),
        vec(any::<(u16, u16, u16, u16)>(), 0..5),
        vec(any::<u8>(), 0..10),
    )
        .prop_map(|(group_type, actual, other, private_data)| {
            let with_other = matches!(group_type, 4 | 5);
            boxed(EventGroupDescriptor {
                group_type,
                actual_events: actual
                    .into_iter()
                    .map(|(service_id, event_id)| ActualEvent { service_id, event_id })
                    .collect(),
                other_events: if with_other {
                    other
                        .into_iter()
                        .map(|(onid, tsid, service_id, event_id)| OtherEvent {
                            original_network_id: onid,
                            transport_stream_id: tsid,
                            service_id,
                            event_id,
                        })
                        .collect()
                } else {
                    Vec::new()
                },
                private_data: if with_other { Vec::new() } else { private_data },
            })
        })
}

fn contract_info(fee_name: &'static str) -> impl Strategy<Value = CaContractInfoDescriptor> {
    (any::<u16>(), 0u8..16, vec(any::<u8>(), 0..=15), vec(any::<u8>(), 0..=255), fee_name).prop_map(
        |(ca_system_id, ca_unit_id, component_tags, cvi, fee_name)| CaContractInfoDescriptor {
            ca_system_id,
            ca_unit_id,
            component_tags,
            contract_verification_info: cvi,
            fee_name,
        },
    )
}

fn ca_contract_info() -> impl Strategy<Value = Box<dyn Descriptor>> {
    contract_info("[a-zA-Z0-9\u{e9}]{0,20}")
        .prop_filter("payload fits in a descriptor", |d| d.is_valid())
        .prop_map(boxed)
}

fn time_slice_fec() -> impl Strategy<Value = Box<dyn Descriptor>> {
    (any::<bool>(), 0u8..4, 0u8..8, any::<u8>(), 0u8..16, 0u8..16, vec(any::<u8>(), 0..10)).prop_map(
        |(time_slicing, mpe_fec, frame_size, burst, rate, id, bytes)| {
            boxed(TimeSliceFecIdentifierDescriptor {
                time_slicing,
                mpe_fec,
                frame_size,
                max_burst_duration: burst,
                max_average_rate: rate,
                time_slice_fec_id: id,
                id_selector_bytes: bytes,
            })
        },
    )
}

fn logical_channels() -> impl Strategy<Value = Box<dyn Descriptor>> {
    vec((any::<u16>(), any::<bool>(), 0u16..1024), 0..10).prop_map(|v| {
        boxed(LogicalChannelNumberDescriptor {
            entries: v
                .into_iter()
                .map(|(service_id, visible, lcn)| LogicalChannel { service_id, visible, lcn })
                .collect(),
        })
    })
}

fn ssu_selector() -> impl Strategy<Value = SsuSelector> {
    (
        vec((0u32..0x100_0000, 0u8..16, any::<bool>(), 0u8..32, vec(any::<u8>(), 0..6)), 0..4),
        vec(any::<u8>(), 0..6),
    )
        .prop_map(|(entries, private_data)| SsuSelector {
            entries: entries
                .into_iter()
                .map(|(oui, update_type, flag, version, selector)| SsuEntry {
                    oui,
                    update_type,
                    update_versioning_flag: flag,
                    update_version: version,
                    selector,
                })
                .collect(),
            private_data,
        })
}

fn mpe_selector() -> impl Strategy<Value = MpeSelector> {
    (0u8..8, any::<bool>(), any::<bool>(), any::<u8>()).prop_map(|(range, map, align, max)| MpeSelector {
        mac_address_range: range,
        mac_ip_mapping_flag: map,
        alignment_indicator: align,
        max_sections_per_datagram: max,
    })
}

fn int_selector() -> impl Strategy<Value = IntSelector> {
    (vec((0u32..0x100_0000, any::<u8>(), any::<bool>(), 0u8..32), 0..5), vec(any::<u8>(), 0..6)).prop_map(
        |(platforms, private_data)| IntSelector {
            platforms: platforms
                .into_iter()
                .map(|(platform_id, action_type, flag, version)| IntPlatform {
                    platform_id,
                    action_type,
                    int_versioning_flag: flag,
                    int_version: version,
                })
                .collect(),
            private_data,
        },
    )
}

/// A structured selector paired with the id of another grammar.
fn mismatched_data_broadcast_id() -> impl Strategy<Value = DataBroadcastIdDescriptor> {
    let ssu = (any::<u16>().prop_filter("not SSU", |id| *id != 0x000A), ssu_selector())
        .prop_map(|(id, s)| (id, Selector::Ssu(s)));
    let mpe = (any::<u16>().prop_filter("not MPE", |id| *id != 0x0005), mpe_selector())
        .prop_map(|(id, s)| (id, Selector::Mpe(s)));
    let int = (any::<u16>().prop_filter("not INT", |id| *id != 0x000B), int_selector())
        .prop_map(|(id, s)| (id, Selector::Int(s)));
    prop_oneof![ssu, mpe, int].prop_map(|(data_broadcast_id, selector)| DataBroadcastIdDescriptor {
        data_broadcast_id,
        selector,
    })
}

fn data_broadcast_id() -> impl Strategy<Value = Box<dyn Descriptor>> {
    // Any id with arbitrary bytes, as a decoder would see them: bytes that
    // follow the grammar of the id are structured, the rest stay raw.
    let raw = prop_oneof![any::<u16>(), Just(0x000Au16), Just(0x0005u16), Just(0x000Bu16)];
    let raw = (raw, vec(any::<u8>(), 0..20)).prop_map(|(id, bytes)| DataBroadcastIdDescriptor {
        data_broadcast_id: id,
        selector: Selector::parse(id, &bytes),
    });
    let ssu = ssu_selector().prop_map(|s| DataBroadcastIdDescriptor {
        data_broadcast_id: 0x000A,
        selector: Selector::Ssu(s),
    });
    let mpe = mpe_selector().prop_map(|s| DataBroadcastIdDescriptor {
        data_broadcast_id: 0x0005,
        selector: Selector::Mpe(s),
    });
    let int = int_selector().prop_map(|s| DataBroadcastIdDescriptor {
        data_broadcast_id: 0x000B,
        selector: Selector::Int(s),
    });
    prop_oneof![raw, ssu, mpe, int].prop_map(boxed)
}

fn ssu_data_broadcast_id() -> impl Strategy<Value = Box<dyn Descriptor>> {
    ssu_selector().prop_map(|selector| boxed(SsuDataBroadcastIdDescriptor { selector }))
}

/// Tags no built-in descriptor claims.
fn opaque() -> impl Strategy<Value = Box<dyn Descriptor>> {
    (0xA0u8..=0xBF, vec(any::<u8>(), 0..=255)).prop_map(|(tag, payload)| boxed(OpaqueDescriptor::with_payload(tag, &payload)))
}

fn any_descriptor() -> impl Strategy<Value = Box<dyn Descriptor>> {
    prop_oneof![
        ca(),
        content_availability(),
        event_group(),
        ca_contract_info(),
        time_slice_fec(),
        logical_channels(),
        data_broadcast_id(),
        ssu_data_broadcast_id(),
        any::<u32>().prop_map(|pds| boxed(PrivateDataSpecifierDescriptor::new(pds))),
        opaque(),
    ]
}

fn any_list() -> impl Strategy<Value = DescriptorList> {
    vec(any_descriptor(), 0..6).prop_map(|descs| {
        let mut list = DescriptorList::new();
        for d in descs {
            list.push_with_specifier(d, None);
        }
        list
    })
}

fn same_entries(a: &DescriptorList, b: &DescriptorList) -> Result<(), TestCaseError> {
    prop_assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b.iter()) {
        prop_assert!(x == y, "{:?} != {:?}", x, y);
    }
    Ok(())
}

/// Offsets where a descriptor ends in a well-formed loop.
fn boundaries(data: &[u8]) -> Vec<usize> {
    let mut out = vec![0];
    let mut pos = 0;
    while pos + 2 <= data.len() {
        pos += 2 + data[pos + 1] as usize;
        out.push(pos);
    }
    out
}

proptest! {
    #[test]
    fn binary_round_trip(list in any_list()) {
        let ctx = isdb_context();
        prop_assert!(list.iter().all(|d| d.is_valid()));
        let bytes = list.to_bytes(&ctx);
        prop_assert_eq!(bytes.len(), list.total_binary_size(&ctx));

        let back = DescriptorList::decode(&bytes, None, &ctx, Registry::global());
        prop_assert!(back.is_valid());
        same_entries(&list, &back)?;
        prop_assert_eq!(back.to_bytes(&ctx), bytes);
    }

    #[test]
    fn target_ip_round_trip(mask in any::<u32>(), addrs in vec(any::<u32>(), 0..20)) {
        let ctx = Context::default();
        let mut list = DescriptorList::for_table(TID_INT);
        list.push(boxed(TargetIpAddressDescriptor {
            ipv4_addr_mask: mask.into(),
            ipv4_addrs: addrs.into_iter().map(Into::into).collect(),
        }));
        let back = DescriptorList::decode(&list.to_bytes(&ctx), Some(TID_INT), &ctx, Registry::global());
        same_entries(&list, &back)?;
    }

    #[test]
    fn tree_round_trip(list in any_list()) {
        let ctx = isdb_context();
        let tree = list.to_tree(&ctx);

        let text = xml::to_string(&tree).unwrap();
        let from_xml = DescriptorList::from_tree(&xml::parse(&text).unwrap(), &ctx, Registry::global()).unwrap();
        same_entries(&list, &from_xml)?;

        let text = json::to_string(&tree).unwrap();
        let from_json = DescriptorList::from_tree(&json::parse(&text).unwrap(), &ctx, Registry::global()).unwrap();
        same_entries(&list, &from_json)?;
    }

    #[test]
    fn truncated_loops_are_flagged(list in any_list()) {
        let ctx = isdb_context();
        let bytes = list.to_bytes(&ctx);
        let ends = boundaries(&bytes);
        for k in 0..bytes.len() {
            let mut cursor = ReadCursor::new(&bytes[..k]);
            let mut decode_ctx = ctx.clone();
            let mut partial = DescriptorList::new();
            let valid = partial.deserialize_all(&mut cursor, &mut decode_ctx, Registry::global());
            prop_assert_eq!(valid, ends.contains(&k), "prefix {}", k);
            prop_assert!(partial.len() < list.len());
            let _ = display_list(Registry::global(), &ctx, &bytes[..k], None);
        }
    }

    #[test]
    fn garbage_never_panics(data in vec(any::<u8>(), 0..300), int in any::<bool>()) {
        let ctx = isdb_context();
        let table_id = int.then_some(TID_INT);
        let list = DescriptorList::decode(&data, table_id, &ctx, Registry::global());
        let _ = list.to_bytes(&ctx);
        let _ = list.to_tree(&ctx);
        let _ = display_list(Registry::global(), &ctx, &data, table_id);
    }

    #[test]
    fn unknown_tags_pass_through(tag in 0xA0u8..=0xBF, payload in vec(any::<u8>(), 0..=255)) {
        let mut bytes = vec![tag, payload.len() as u8];
        bytes.extend_from_slice(&payload);
        let ctx = isdb_context();
        let list = DescriptorList::decode(&bytes, None, &ctx, Registry::global());
        prop_assert_eq!(list.typed_count(), 0);
        prop_assert_eq!(list.get(0).map(|d| d.name()), Some("generic_descriptor"));
        prop_assert_eq!(list.to_bytes(&ctx), bytes);
    }

    #[test]
    fn raw_selectors_lossless_for_any_id(id in any::<u16>(), bytes in vec(any::<u8>(), 0..40)) {
        let ctx = Context::default();
        let mut list = DescriptorList::new();
        list.push(boxed(DataBroadcastIdDescriptor {
            data_broadcast_id: id,
            selector: Selector::Raw(bytes.clone()),
        }));
        prop_assert!(list.iter().all(|d| d.is_valid()));
        let encoded = list.to_bytes(&ctx);
        prop_assert_eq!(encoded.len(), 4 + bytes.len());

        let back = DescriptorList::decode(&encoded, None, &ctx, Registry::global());
        prop_assert!(back.is_valid());
        prop_assert_eq!(back.to_bytes(&ctx), encoded);
        let expected = Selector::parse(id, &bytes);
        let decoded = back.get(0).and_then(|d| d.downcast_ref::<DataBroadcastIdDescriptor>());
        prop_assert_eq!(decoded.map(|d| &d.selector), Some(&expected));

        let from_tree = DescriptorList::from_tree(&list.to_tree(&ctx), &ctx, Registry::global()).unwrap();
        same_entries(&list, &from_tree)?;
    }

    #[test]
    fn mismatched_selectors_are_invalid(d in mismatched_data_broadcast_id()) {
        prop_assert!(!d.is_valid());
    }

    #[test]
    fn contract_info_valid_iff_encodable(d in contract_info("[a-z\u{e9}\u{3042}]{0,100}")) {
        let ctx = isdb_context();
        let payload = descriptor::payload_bytes(&d, &ctx);
        prop_assert_eq!(d.is_valid(), payload.is_some());
        if let Some(p) = payload {
            prop_assert_eq!(p.len(), d.payload_size());
        }
    }

    #[test]
    fn specifier_depth_restored(data in vec(any::<u8>(), 0..64)) {
        let mut ctx = Context::default();
        let before = ctx.specifier_depth();
        let mut list = DescriptorList::new();
        list.deserialize_all(&mut ReadCursor::new(&data), &mut ctx, Registry::global());
        prop_assert_eq!(ctx.specifier_depth(), before);
    }
}
