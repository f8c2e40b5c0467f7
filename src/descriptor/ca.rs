//! MPEG CA_descriptor (ISO/IEC 13818-1, 2.6.16).

use crate::buffer::{ReadCursor, WriteCursor, clamp_bits};
use crate::constants::{MAX_DESCRIPTOR_PAYLOAD, TAG_CA};
use crate::context::{Context, Standards};
use crate::descriptor::{Descriptor, DescriptorInfo};
use crate::display::TextDisplay;
use crate::error::{RegistryError, TreeError};
use crate::registry::{Matcher, Registry};
use crate::tree::Element;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaDescriptor {
    pub ca_system_id: u16,
    /// 13 bits.
    pub ca_pid: u16,
    pub private_data: Vec<u8>,
}

impl CaDescriptor {
    pub const INFO: DescriptorInfo = DescriptorInfo {
        name: "CA_descriptor",
        tag: TAG_CA,
        standards: Standards::MPEG,
        private_specifier: None,
    };
}

impl Descriptor for CaDescriptor {
    fn info(&self) -> &'static DescriptorInfo {
        &Self::INFO
    }

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, _ctx: &Context) {
        self.ca_system_id = buf.read_u16();
        buf.skip_reserved(3);
        self.ca_pid = buf.read_bits(13) as u16;
        self.private_data = buf.read_remaining_bytes();
    }

    fn serialize_payload(&self, buf: &mut WriteCursor, _ctx: &Context) {
        buf.write_u16(self.ca_system_id);
        buf.write_reserved(3);
        buf.write_bits(13, clamp_bits(u64::from(self.ca_pid), 13));
        buf.write_bytes(&self.private_data);
    }

    fn to_tree(&self, _ctx: &Context, element: &mut Element) {
        element.set_hex("CA_system_id", u64::from(self.ca_system_id), 16);
        element.set_hex("CA_PID", u64::from(self.ca_pid), 13);
        element.add_hex_child("private_data", &self.private_data);
    }

    fn from_tree(&mut self, _ctx: &Context, element: &Element) -> Result<(), TreeError> {
        self.ca_system_id = element.required_int("CA_system_id", 16)? as u16;
        self.ca_pid = element.required_int("CA_PID", 13)? as u16;
        self.private_data = element.hex_child_max("private_data", MAX_DESCRIPTOR_PAYLOAD - 4)?;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.ca_pid < 0x2000 && self.private_data.len() <= MAX_DESCRIPTOR_PAYLOAD - 4
    }
}

pub fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>, _ctx: &Context) {
    let system_id = buf.read_u16();
    buf.skip_reserved(3);
    let pid = buf.read_bits(13);
    if !buf.is_valid() {
        return;
    }
    disp.hex_field("CA system id", u64::from(system_id), 16);
    disp.hex_field("CA PID", pid, 13);
    let rest = buf.read_remaining_bytes();
    disp.hexdump("Private CA data", &rest);
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(Matcher::tag(TAG_CA), || Box::new(CaDescriptor::default()), display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{decode_payload, payload_bytes};

    #[test]
    fn pid_layout() {
        let ctx = Context::default();
        let d = CaDescriptor {
            ca_system_id: 0x0B00,
            ca_pid: 0x0123,
            private_data: vec![1],
        };
        let bytes = payload_bytes(&d, &ctx).unwrap();
        assert_eq!(bytes, vec![0x0B, 0x00, 0xE1, 0x23, 0x01]);
        let mut back = CaDescriptor::default();
        assert!(decode_payload(&mut back, &bytes, &ctx));
        assert_eq!(back, d);
    }

    #[test]
    fn pid_clamped() {
        let d = CaDescriptor {
            ca_pid: 0xFFFF,
            ..Default::default()
        };
        assert!(!d.is_valid());
        assert_eq!(payload_bytes(&d, &Context::default()), Some(vec![0, 0, 0xFF, 0xFF]));
    }
}
