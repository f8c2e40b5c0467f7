//! EACEM logical_channel_number_descriptor (IEC 62216), private tag 0x83.
//!
//! Only meaningful after a private data specifier 0x00000028 in the same loop
//! (or with EACEM as the default specifier).

use crate::buffer::{ReadCursor, WriteCursor, clamp_bits};
use crate::constants::{MAX_DESCRIPTOR_PAYLOAD, PDS_EACEM, TAG_EACEM_LOGICAL_CHANNEL_NUMBER};
use crate::context::{Context, Standards};
use crate::descriptor::{Descriptor, DescriptorInfo};
use crate::display::TextDisplay;
use crate::error::{RegistryError, TreeError};
use crate::registry::{Matcher, Registry};
use crate::tree::Element;

const ENTRY_SIZE: usize = 4;
pub const MAX_ENTRIES: usize = MAX_DESCRIPTOR_PAYLOAD / ENTRY_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogicalChannel {
    pub service_id: u16,
    pub visible: bool,
    /// 10 bits.
    pub lcn: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogicalChannelNumberDescriptor {
    pub entries: Vec<LogicalChannel>,
}

impl LogicalChannelNumberDescriptor {
    pub const INFO: DescriptorInfo = DescriptorInfo {
        name: "eacem_logical_channel_number_descriptor",
        tag: TAG_EACEM_LOGICAL_CHANNEL_NUMBER,
        standards: Standards::DVB,
        private_specifier: Some(PDS_EACEM),
    };
}

impl Descriptor for LogicalChannelNumberDescriptor {
    fn info(&self) -> &'static DescriptorInfo {
        &Self::INFO
    }

    fn clear_content(&mut self) {
        self.entries.clear();
    }

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, _ctx: &Context) {
        while buf.is_valid() && !buf.is_at_end() {
            if buf.remaining_bytes() < ENTRY_SIZE {
                buf.mark_invalid();
                return;
            }
            let service_id = buf.read_u16();
            let visible = buf.read_bool();
            buf.skip_reserved(5);
            let lcn = buf.read_bits(10) as u16;
            self.entries.push(LogicalChannel { service_id, visible, lcn });
        }
    }

    fn serialize_payload(&self, buf: &mut WriteCursor, _ctx: &Context) {
        for e in &self.entries {
            buf.write_u16(e.service_id);
            buf.write_bool(e.visible);
            buf.write_reserved(5);
            buf.write_bits(10, clamp_bits(u64::from(e.lcn), 10));
        }
    }

    fn to_tree(&self, _ctx: &Context, element: &mut Element) {
        for e in &self.entries {
            let child = element.add_child("service");
            child.set_hex("service_id", u64::from(e.service_id), 16);
            child.set_int("logical_channel_number", u64::from(e.lcn));
            child.set_bool("visible_service", e.visible);
        }
    }

    fn from_tree(&mut self, _ctx: &Context, element: &Element) -> Result<(), TreeError> {
        self.entries = element
            .children_named("service")
            .map(|c| {
                Ok(LogicalChannel {
                    service_id: c.required_int("service_id", 16)? as u16,
                    lcn: c.required_int("logical_channel_number", 10)? as u16,
                    visible: c.optional_bool("visible_service")?.unwrap_or(true),
                })
            })
            .collect::<Result<_, TreeError>>()?;
        if self.entries.len() > MAX_ENTRIES {
            return Err(TreeError::too_many(&element.name, "service", MAX_ENTRIES));
        }
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.entries.len() <= MAX_ENTRIES && self.entries.iter().all(|e| e.lcn < 1 << 10)
    }
}

pub fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>, _ctx: &Context) {
    while buf.remaining_bytes() >= ENTRY_SIZE {
        let service_id = buf.read_u16();
        let visible = buf.read_bool();
        buf.skip_reserved(5);
        let lcn = buf.read_bits(10);
        disp.line(format!("Service id: 0x{service_id:04X} ({service_id}), visible: {visible}"));
        disp.indent();
        disp.field("Logical channel number", lcn);
        disp.unindent();
    }
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        Matcher::private(TAG_EACEM_LOGICAL_CHANNEL_NUMBER, PDS_EACEM),
        || Box::new(LogicalChannelNumberDescriptor::default()),
        display,
    )
}
