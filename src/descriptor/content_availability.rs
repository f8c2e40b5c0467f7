//! ISDB content_availability_descriptor (ARIB STD-B10, 6.2.45).

use crate::buffer::{ReadCursor, WriteCursor, clamp_bits};
use crate::constants::{MAX_DESCRIPTOR_PAYLOAD, TAG_ISDB_CONTENT_AVAILABILITY};
use crate::context::{Context, Standards};
use crate::descriptor::{Descriptor, DescriptorInfo};
use crate::display::TextDisplay;
use crate::error::{RegistryError, TreeError};
use crate::registry::{Matcher, Registry};
use crate::tree::Element;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentAvailabilityDescriptor {
    pub copy_restriction_mode: bool,
    pub image_constraint_token: bool,
    pub retention_mode: bool,
    /// 3 bits.
    pub retention_state: u8,
    pub encryption_mode: bool,
    pub reserved_future_use: Vec<u8>,
}

impl ContentAvailabilityDescriptor {
    pub const INFO: DescriptorInfo = DescriptorInfo {
        name: "content_availability_descriptor",
        tag: TAG_ISDB_CONTENT_AVAILABILITY,
        standards: Standards::ISDB,
        private_specifier: None,
    };
}

impl Descriptor for ContentAvailabilityDescriptor {
    fn info(&self) -> &'static DescriptorInfo {
        &Self::INFO
    }

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, _ctx: &Context) {
        buf.skip_reserved(1);
        self.copy_restriction_mode = buf.read_bool();
        self.image_constraint_token = buf.read_bool();
        self.retention_mode = buf.read_bool();
        self.retention_state = buf.read_bits(3) as u8;
        self.encryption_mode = buf.read_bool();
        self.reserved_future_use = buf.read_remaining_bytes();
    }

    /// `retention_state` is clamped to 3 bits.
    fn serialize_payload(&self, buf: &mut WriteCursor, _ctx: &Context) {
        buf.write_reserved(1);
        buf.write_bool(self.copy_restriction_mode);
        buf.write_bool(self.image_constraint_token);
        buf.write_bool(self.retention_mode);
        buf.write_bits(3, clamp_bits(u64::from(self.retention_state), 3));
        buf.write_bool(self.encryption_mode);
        buf.write_bytes(&self.reserved_future_use);
    }

    fn to_tree(&self, _ctx: &Context, element: &mut Element) {
        element.set_bool("copy_restriction_mode", self.copy_restriction_mode);
        element.set_bool("image_constraint_token", self.image_constraint_token);
        element.set_bool("retention_mode", self.retention_mode);
        element.set_int("retention_state", u64::from(self.retention_state));
        element.set_bool("encryption_mode", self.encryption_mode);
        element.add_hex_child("reserved_future_use", &self.reserved_future_use);
    }

    fn from_tree(&mut self, _ctx: &Context, element: &Element) -> Result<(), TreeError> {
        self.copy_restriction_mode = element.required_bool("copy_restriction_mode")?;
        self.image_constraint_token = element.required_bool("image_constraint_token")?;
        self.retention_mode = element.required_bool("retention_mode")?;
        self.retention_state = element.required_int("retention_state", 3)? as u8;
        self.encryption_mode = element.required_bool("encryption_mode")?;
        self.reserved_future_use = element.hex_child_max("reserved_future_use", MAX_DESCRIPTOR_PAYLOAD - 1)?;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.retention_state < 8 && self.reserved_future_use.len() < MAX_DESCRIPTOR_PAYLOAD
    }
}

fn retention_state_name(state: u8) -> &'static str {
    match state {
        0 => "no limit",
        1 => "1 week",
        2 => "3 days",
        3 => "1 day",
        4 => "12 hours",
        5 => "6 hours",
        6 => "3 hours",
        7 => "90 minutes",
        _ => "unknown",
    }
}

pub fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>, _ctx: &Context) {
    buf.skip_reserved(1);
    let copy = buf.read_bool();
    let image = buf.read_bool();
    let retention = buf.read_bool();
    let state = buf.read_bits(3) as u8;
    let encryption = buf.read_bool();
    if !buf.is_valid() {
        return;
    }
    disp.field("Copy restriction mode", copy);
    disp.field("Image constraint token", image);
    disp.field("Retention mode", retention);
    disp.field("Retention state", format!("{state} ({})", retention_state_name(state)));
    disp.field("Encryption mode", encryption);
    let rest = buf.read_remaining_bytes();
    disp.hexdump("Reserved future use", &rest);
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        Matcher::standard(TAG_ISDB_CONTENT_AVAILABILITY, Standards::ISDB),
        || Box::new(ContentAvailabilityDescriptor::default()),
        display,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{decode_payload, payload_bytes, to_element};

    #[test]
    fn single_byte_layout() {
        let ctx = Context::new(Standards::ISDB);
        let d = ContentAvailabilityDescriptor {
            copy_restriction_mode: false,
            image_constraint_token: true,
            retention_mode: false,
            retention_state: 5,
            encryption_mode: true,
            reserved_future_use: vec![],
        };
        // reserved=1, 0, 1, 0, 101, 1
        assert_eq!(payload_bytes(&d, &ctx), Some(vec![0b1010_1011]));

        let mut back = ContentAvailabilityDescriptor::default();
        assert!(decode_payload(&mut back, &[0b1010_1011], &ctx));
        assert_eq!(back, d);

        let e = to_element(&d, &ctx);
        assert_eq!(e.attr("image_constraint_token"), Some("true"));
        assert_eq!(e.attr("retention_state"), Some("5"));
        assert!(e.children.is_empty());
    }

    #[test]
    fn oversized_state_clamped_and_rejected() {
        let ctx = Context::new(Standards::ISDB);
        let d = ContentAvailabilityDescriptor {
            retention_state: 12,
            ..Default::default()
        };
        assert!(!d.is_valid());
        assert_eq!(payload_bytes(&d, &ctx), Some(vec![0b1000_1110]));

        let mut e = to_element(&d, &ctx);
        e.set_int("retention_state", 12);
        let mut back = ContentAvailabilityDescriptor::default();
        assert!(matches!(back.from_tree(&ctx, &e), Err(TreeError::OutOfRange { .. })));
    }

    #[test]
    fn empty_payload_invalid() {
        let mut d = ContentAvailabilityDescriptor::default();
        assert!(!decode_payload(&mut d, &[], &Context::default()));
    }
}
