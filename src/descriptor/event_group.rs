//! ISDB event_group_descriptor (ARIB STD-B10, 6.2.34).
//!
//! The event count only covers the "actual" events. For group types 4 and 5
//! (event relay and movement to other networks) the rest of the payload is a
//! list of events in other networks; for any other type it is private data.

use crate::buffer::{ReadCursor, WriteCursor, clamp_bits};
use crate::constants::{MAX_DESCRIPTOR_PAYLOAD, TAG_ISDB_EVENT_GROUP};
use crate::context::{Context, Standards};
use crate::descriptor::{Descriptor, DescriptorInfo};
use crate::display::TextDisplay;
use crate::error::{RegistryError, TreeError};
use crate::registry::{Matcher, Registry};
use crate::tree::Element;

/// At most 15 actual events: the count is 4 bits.
pub const MAX_ACTUAL_EVENTS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActualEvent {
    pub service_id: u16,
    pub event_id: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OtherEvent {
    pub original_network_id: u16,
    pub transport_stream_id: u16,
    pub service_id: u16,
    pub event_id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventGroupDescriptor {
    /// 4 bits.
    pub group_type: u8,
    pub actual_events: Vec<ActualEvent>,
    /// Only serialized when `group_type` is 4 or 5.
    pub other_events: Vec<OtherEvent>,
    /// Only serialized for other group types.
    pub private_data: Vec<u8>,
}

impl EventGroupDescriptor {
    pub const INFO: DescriptorInfo = DescriptorInfo {
        name: "event_group_descriptor",
        tag: TAG_ISDB_EVENT_GROUP,
        standards: Standards::ISDB,
        private_specifier: None,
    };

    pub fn has_other_events(&self) -> bool {
        has_other_events(self.group_type)
    }
}

fn has_other_events(group_type: u8) -> bool {
    group_type == 4 || group_type == 5
}

impl Descriptor for EventGroupDescriptor {
    fn info(&self) -> &'static DescriptorInfo {
        &Self::INFO
    }

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, _ctx: &Context) {
        self.group_type = buf.read_bits(4) as u8;
        let count = buf.read_bits(4) as usize;
        for _ in 0..count {
            if buf.remaining_bytes() < 4 {
                buf.mark_invalid();
                return;
            }
            self.actual_events.push(ActualEvent {
                service_id: buf.read_u16(),
                event_id: buf.read_u16(),
            });
        }
        if self.has_other_events() {
            while buf.is_valid() && !buf.is_at_end() {
                if buf.remaining_bytes() < 8 {
                    buf.mark_invalid();
                    return;
                }
                self.other_events.push(OtherEvent {
                    original_network_id: buf.read_u16(),
                    transport_stream_id: buf.read_u16(),
                    service_id: buf.read_u16(),
                    event_id: buf.read_u16(),
                });
            }
        } else {
            self.private_data = buf.read_remaining_bytes();
        }
    }

    /// Extra actual events beyond 15 are dropped and `group_type` is clamped.
    fn serialize_payload(&self, buf: &mut WriteCursor, _ctx: &Context) {
        let count = self.actual_events.len().min(MAX_ACTUAL_EVENTS);
        buf.write_bits(4, clamp_bits(u64::from(self.group_type), 4));
        buf.write_bits(4, count as u64);
        for ev in &self.actual_events[..count] {
            buf.write_u16(ev.service_id);
            buf.write_u16(ev.event_id);
        }
        if self.has_other_events() {
            for ev in &self.other_events {
                buf.write_u16(ev.original_network_id);
                buf.write_u16(ev.transport_stream_id);
                buf.write_u16(ev.service_id);
                buf.write_u16(ev.event_id);
            }
        } else {
            buf.write_bytes(&self.private_data);
        }
    }

    fn to_tree(&self, _ctx: &Context, element: &mut Element) {
        element.set_int("group_type", u64::from(self.group_type));
        for ev in &self.actual_events {
            let e = element.add_child("actual");
            e.set_hex("service_id", u64::from(ev.service_id), 16);
            e.set_hex("event_id", u64::from(ev.event_id), 16);
        }
        if self.has_other_events() {
            for ev in &self.other_events {
                let e = element.add_child("other");
                e.set_hex("original_network_id", u64::from(ev.original_network_id), 16);
                e.set_hex("transport_stream_id", u64::from(ev.transport_stream_id), 16);
                e.set_hex("service_id", u64::from(ev.service_id), 16);
                e.set_hex("event_id", u64::from(ev.event_id), 16);
            }
        } else {
            element.add_hex_child("private_data", &self.private_data);
        }
    }

    fn from_tree(&mut self, _ctx: &Context, element: &Element) -> Result<(), TreeError> {
        self.group_type = element.required_int("group_type", 4)? as u8;

        self.actual_events.clear();
        for e in element.children_named("actual") {
            self.actual_events.push(ActualEvent {
                service_id: e.required_int("service_id", 16)? as u16,
                event_id: e.required_int("event_id", 16)? as u16,
            });
        }
        if self.actual_events.len() > MAX_ACTUAL_EVENTS {
            return Err(TreeError::too_many(&element.name, "actual", MAX_ACTUAL_EVENTS));
        }

        self.other_events.clear();
        for e in element.children_named("other") {
            self.other_events.push(OtherEvent {
                original_network_id: e.required_int("original_network_id", 16)? as u16,
                transport_stream_id: e.required_int("transport_stream_id", 16)? as u16,
                service_id: e.required_int("service_id", 16)? as u16,
                event_id: e.required_int("event_id", 16)? as u16,
            });
        }
        let room = MAX_DESCRIPTOR_PAYLOAD - 1 - 4 * self.actual_events.len();
        if self.has_other_events() {
            if self.other_events.len() > room / 8 {
                return Err(TreeError::too_many(&element.name, "other", room / 8));
            }
            self.private_data.clear();
        } else {
            self.other_events.clear();
            self.private_data = element.hex_child_max("private_data", room)?;
        }
        Ok(())
    }

    fn is_valid(&self) -> bool {
        let tail = if self.has_other_events() {
            8 * self.other_events.len()
        } else {
            self.private_data.len()
        };
        self.group_type < 16
            && self.actual_events.len() <= MAX_ACTUAL_EVENTS
            && 1 + 4 * self.actual_events.len() + tail <= MAX_DESCRIPTOR_PAYLOAD
    }
}

fn group_type_name(group_type: u8) -> &'static str {
    match group_type {
        1 => "event common",
        2 => "event relay",
        3 => "event movement",
        4 => "event relay to other networks",
        5 => "event movement from other networks",
        _ => "undefined",
    }
}

pub fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>, _ctx: &Context) {
    let group_type = buf.read_bits(4) as u8;
    let count = buf.read_bits(4);
    if !buf.is_valid() {
        return;
    }
    disp.field("Group type", format!("{group_type} ({})", group_type_name(group_type)));
    disp.field("Actual events", count);
    for _ in 0..count {
        let service_id = buf.read_u16();
        let event_id = buf.read_u16();
        if !buf.is_valid() {
            return;
        }
        disp.line(format!("- Service id: 0x{service_id:04X} ({service_id}), event id: 0x{event_id:04X} ({event_id})"));
    }
    if has_other_events(group_type) {
        while buf.remaining_bytes() >= 8 {
            let onid = buf.read_u16();
            let tsid = buf.read_u16();
            let service_id = buf.read_u16();
            let event_id = buf.read_u16();
            disp.line(format!(
                "- Original network id: 0x{onid:04X}, TS id: 0x{tsid:04X}, service id: 0x{service_id:04X}, event id: 0x{event_id:04X}"
            ));
        }
    } else {
        let data = buf.read_remaining_bytes();
        disp.hexdump("Private data", &data);
    }
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        Matcher::standard(TAG_ISDB_EVENT_GROUP, Standards::ISDB),
        || Box::new(EventGroupDescriptor::default()),
        display,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{decode_payload, payload_bytes, to_element};

    fn two_pairs() -> EventGroupDescriptor {
        EventGroupDescriptor {
            group_type: 1,
            actual_events: vec![
                ActualEvent { service_id: 0x0101, event_id: 0x2001 },
                ActualEvent { service_id: 0x0102, event_id: 0x2002 },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn pairs_layout() {
        let ctx = Context::new(Standards::ISDB);
        let bytes = payload_bytes(&two_pairs(), &ctx).unwrap();
        assert_eq!(bytes, vec![0x12, 0x01, 0x01, 0x20, 0x01, 0x01, 0x02, 0x20, 0x02]);

        let mut back = EventGroupDescriptor::default();
        assert!(decode_payload(&mut back, &bytes, &ctx));
        assert_eq!(back, two_pairs());
    }

    #[test]
    fn short_count_invalid() {
        let ctx = Context::new(Standards::ISDB);
        let bytes = payload_bytes(&two_pairs(), &ctx).unwrap();
        let mut back = EventGroupDescriptor::default();
        assert!(!decode_payload(&mut back, &bytes[..8], &ctx));
        assert_eq!(back.actual_events.len(), 1);
    }

    #[test]
    fn other_events_for_relay() {
        let ctx = Context::new(Standards::ISDB);
        let d = EventGroupDescriptor {
            group_type: 4,
            actual_events: vec![],
            other_events: vec![OtherEvent {
                original_network_id: 4,
                transport_stream_id: 0x7FE0,
                service_id: 0x0400,
                event_id: 0x1234,
            }],
            private_data: vec![],
        };
        let bytes = payload_bytes(&d, &ctx).unwrap();
        assert_eq!(bytes.len(), 9);
        let mut back = EventGroupDescriptor::default();
        assert!(decode_payload(&mut back, &bytes, &ctx));
        assert_eq!(back, d);

        let e = to_element(&d, &ctx);
        assert_eq!(e.children_named("other").count(), 1);
        let mut imported = EventGroupDescriptor::default();
        imported.from_tree(&ctx, &e).unwrap();
        assert_eq!(imported, d);
    }

    #[test]
    fn too_many_actual_events() {
        let mut e = Element::new("event_group_descriptor");
        e.set_int("group_type", 1);
        for i in 0..16 {
            let a = e.add_child("actual");
            a.set_int("service_id", i);
            a.set_int("event_id", i);
        }
        let mut d = EventGroupDescriptor::default();
        assert!(matches!(d.from_tree(&Context::default(), &e), Err(TreeError::TooMany { max: 15, .. })));
    }
}
