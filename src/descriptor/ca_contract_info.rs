//! ISDB CA_contract_info_descriptor (ARIB STD-B25, part 1, 4.7.2).

use crate::buffer::{ReadCursor, WriteCursor, clamp_bits};
use crate::charset::max_encoded_len;
use crate::constants::{MAX_DESCRIPTOR_PAYLOAD, TAG_ISDB_CA_CONTRACT_INFO};
use crate::context::{Context, Standards};
use crate::descriptor::{Descriptor, DescriptorInfo};
use crate::display::TextDisplay;
use crate::error::{RegistryError, TreeError};
use crate::registry::{Matcher, Registry};
use crate::tree::Element;

/// The component count is 4 bits.
pub const MAX_COMPONENTS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaContractInfoDescriptor {
    pub ca_system_id: u16,
    /// 4 bits, billing unit group.
    pub ca_unit_id: u8,
    pub component_tags: Vec<u8>,
    pub contract_verification_info: Vec<u8>,
    pub fee_name: String,
}

impl CaContractInfoDescriptor {
    pub const INFO: DescriptorInfo = DescriptorInfo {
        name: "CA_contract_info_descriptor",
        tag: TAG_ISDB_CA_CONTRACT_INFO,
        standards: Standards::ISDB,
        private_specifier: None,
    };

    /// Payload size, with the fee name in its longest encoding.
    pub fn payload_size(&self) -> usize {
        2 + 1 + self.component_tags.len() + 1 + self.contract_verification_info.len() + 1 + max_encoded_len(&self.fee_name)
    }
}

impl Descriptor for CaContractInfoDescriptor {
    fn info(&self) -> &'static DescriptorInfo {
        &Self::INFO
    }

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, ctx: &Context) {
        self.ca_system_id = buf.read_u16();
        self.ca_unit_id = buf.read_bits(4) as u8;
        let count = buf.read_bits(4) as usize;
        self.component_tags = buf.read_bytes(count);
        let len = buf.read_u8() as usize;
        self.contract_verification_info = buf.read_bytes(len);
        self.fee_name = buf.read_string_with_byte_length(ctx);
    }

    /// `ca_unit_id` is clamped, components beyond 15 and verification info
    /// beyond 255 bytes are dropped. A fee name over 255 encoded bytes
    /// invalidates `buf`.
    fn serialize_payload(&self, buf: &mut WriteCursor, ctx: &Context) {
        let count = self.component_tags.len().min(MAX_COMPONENTS);
        let cvi_len = self.contract_verification_info.len().min(u8::MAX as usize);
        buf.write_u16(self.ca_system_id);
        buf.write_bits(4, clamp_bits(u64::from(self.ca_unit_id), 4));
        buf.write_bits(4, count as u64);
        buf.write_bytes(&self.component_tags[..count]);
        buf.write_u8(cvi_len as u8);
        buf.write_bytes(&self.contract_verification_info[..cvi_len]);
        buf.write_string_with_byte_length(&self.fee_name, ctx);
    }

    fn to_tree(&self, _ctx: &Context, element: &mut Element) {
        element.set_hex("CA_system_id", u64::from(self.ca_system_id), 16);
        element.set_int("CA_unit_id", u64::from(self.ca_unit_id));
        element.set_attr("fee_name", &self.fee_name);
        for tag in &self.component_tags {
            element.add_child("component").set_hex("tag", u64::from(*tag), 8);
        }
        element.add_hex_child("contract_verification_info", &self.contract_verification_info);
    }

    fn from_tree(&mut self, _ctx: &Context, element: &Element) -> Result<(), TreeError> {
        self.ca_system_id = element.required_int("CA_system_id", 16)? as u16;
        self.ca_unit_id = element.required_int("CA_unit_id", 4)? as u8;
        self.fee_name = element.optional_string("fee_name").unwrap_or_default();
        self.component_tags = element
            .children_named("component")
            .map(|c| c.required_int("tag", 8).map(|t| t as u8))
            .collect::<Result<_, _>>()?;
        if self.component_tags.len() > MAX_COMPONENTS {
            return Err(TreeError::too_many(&element.name, "component", MAX_COMPONENTS));
        }
        self.contract_verification_info = element.hex_child_max("contract_verification_info", u8::MAX as usize)?;
        let fee_size = max_encoded_len(&self.fee_name);
        if fee_size > u8::MAX as usize {
            return Err(TreeError::too_long(&element.name, "fee_name", fee_size, u8::MAX as usize));
        }
        let size = self.payload_size();
        if size > MAX_DESCRIPTOR_PAYLOAD {
            return Err(TreeError::too_long(&element.name, "payload", size, MAX_DESCRIPTOR_PAYLOAD));
        }
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.ca_unit_id < 16
            && self.component_tags.len() <= MAX_COMPONENTS
            && self.contract_verification_info.len() <= u8::MAX as usize
            && self.payload_size() <= MAX_DESCRIPTOR_PAYLOAD
    }
}

pub fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>, ctx: &Context) {
    let system_id = buf.read_u16();
    let unit_id = buf.read_bits(4);
    let count = buf.read_bits(4) as usize;
    if !buf.is_valid() {
        return;
    }
    disp.hex_field("CA system id", u64::from(system_id), 16);
    disp.field("CA unit id", unit_id);
    let tags = buf.read_bytes(count);
    if !buf.is_valid() {
        return;
    }
    for tag in tags {
        disp.line(format!("Component tag: 0x{tag:02X} ({tag})"));
    }
    let len = buf.read_u8() as usize;
    let cvi = buf.read_bytes(len);
    disp.hexdump("Contract verification info", &cvi);
    let fee_name = buf.read_string_with_byte_length(ctx);
    if buf.is_valid() {
        disp.field("Fee name", format!("\"{fee_name}\""));
    }
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        Matcher::standard(TAG_ISDB_CA_CONTRACT_INFO, Standards::ISDB),
        || Box::new(CaContractInfoDescriptor::default()),
        display,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{decode_payload, payload_bytes, to_element};

    fn sample() -> CaContractInfoDescriptor {
        CaContractInfoDescriptor {
            ca_system_id: 0x0005,
            ca_unit_id: 1,
            component_tags: vec![0x00, 0x10],
            contract_verification_info: vec![0xAA, 0xBB, 0xCC],
            fee_name: "PPV".into(),
        }
    }

    #[test]
    fn binary_round_trip() {
        let ctx = Context::new(Standards::ISDB);
        let bytes = payload_bytes(&sample(), &ctx).unwrap();
        assert_eq!(
            bytes,
            vec![0x00, 0x05, 0x12, 0x00, 0x10, 0x03, 0xAA, 0xBB, 0xCC, 0x03, b'P', b'P', b'V']
        );
        let mut back = CaContractInfoDescriptor::default();
        assert!(decode_payload(&mut back, &bytes, &ctx));
        assert_eq!(back, sample());
    }

    #[test]
    fn tree_round_trip() {
        let ctx = Context::new(Standards::ISDB);
        let e = to_element(&sample(), &ctx);
        assert_eq!(e.children_named("component").count(), 2);
        let mut back = CaContractInfoDescriptor::default();
        back.from_tree(&ctx, &e).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn payload_size_bounded() {
        let ctx = Context::new(Standards::ISDB);
        let mut d = CaContractInfoDescriptor {
            component_tags: vec![0; MAX_COMPONENTS],
            contract_verification_info: vec![0; 255],
            ..sample()
        };
        assert!(!d.is_valid());
        assert_eq!(payload_bytes(&d, &ctx), None);

        d.contract_verification_info.truncate(255 - 2 - 1 - 15 - 1 - 1 - 3);
        assert_eq!(d.payload_size(), MAX_DESCRIPTOR_PAYLOAD);
        assert!(d.is_valid());
        assert_eq!(payload_bytes(&d, &ctx).map(|b| b.len()), Some(MAX_DESCRIPTOR_PAYLOAD));

        d.fee_name = "\u{e9}".repeat(2);
        assert!(!d.is_valid());
    }

    #[test]
    fn oversized_import_rejected() {
        let ctx = Context::new(Standards::ISDB);
        let mut e = to_element(&sample(), &ctx);
        e.set_attr("fee_name", &"\u{3042}".repeat(90));
        let mut d = CaContractInfoDescriptor::default();
        assert!(matches!(
            d.from_tree(&ctx, &e),
            Err(TreeError::TooLong { ref item, size: 271, max: 255, .. }) if item == "fee_name"
        ));

        let mut e = to_element(
            &CaContractInfoDescriptor {
                contract_verification_info: vec![0x55; 250],
                ..sample()
            },
            &ctx,
        );
        e.set_attr("fee_name", "ABCDEFGHIJ");
        assert!(matches!(
            d.from_tree(&ctx, &e),
            Err(TreeError::TooLong { ref item, max: 255, .. }) if item == "payload"
        ));
    }

    #[test]
    fn truncated_components() {
        let mut d = CaContractInfoDescriptor::default();
        assert!(!decode_payload(&mut d, &[0x00, 0x05, 0x1F, 0x01], &Context::default()));
    }
}
