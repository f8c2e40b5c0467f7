//! target_IP_address_descriptor (ETSI EN 301 192, 8.4.5.8).
//!
//! Tag 0x09 is the CA descriptor everywhere except inside an INT.

use std::net::Ipv4Addr;

use crate::buffer::{ReadCursor, WriteCursor};
use crate::constants::{MAX_DESCRIPTOR_PAYLOAD, TAG_INT_TARGET_IP_ADDRESS, TID_INT};
use crate::context::{Context, Standards};
use crate::descriptor::{Descriptor, DescriptorInfo};
use crate::display::TextDisplay;
use crate::error::{RegistryError, TreeError};
use crate::registry::{Matcher, Registry};
use crate::tree::Element;

pub const MAX_ADDRESSES: usize = (MAX_DESCRIPTOR_PAYLOAD - 4) / 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetIpAddressDescriptor {
    pub ipv4_addr_mask: Ipv4Addr,
    pub ipv4_addrs: Vec<Ipv4Addr>,
}

impl Default for TargetIpAddressDescriptor {
    fn default() -> Self {
        Self {
            ipv4_addr_mask: Ipv4Addr::UNSPECIFIED,
            ipv4_addrs: Vec::new(),
        }
    }
}

impl TargetIpAddressDescriptor {
    pub const INFO: DescriptorInfo = DescriptorInfo {
        name: "target_IP_address_descriptor",
        tag: TAG_INT_TARGET_IP_ADDRESS,
        standards: Standards::DVB,
        private_specifier: None,
    };
}

fn parse_address(element: &Element, name: &str) -> Result<Ipv4Addr, TreeError> {
    let text = element
        .attr(name)
        .ok_or_else(|| TreeError::missing_attribute(&element.name, name))?;
    text.trim()
        .parse()
        .map_err(|_| TreeError::invalid_value(&element.name, name, text, "IPv4 address"))
}

impl Descriptor for TargetIpAddressDescriptor {
    fn info(&self) -> &'static DescriptorInfo {
        &Self::INFO
    }

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, _ctx: &Context) {
        self.ipv4_addr_mask = Ipv4Addr::from(buf.read_u32());
        while buf.is_valid() && !buf.is_at_end() {
            if buf.remaining_bytes() < 4 {
                buf.mark_invalid();
                return;
            }
            self.ipv4_addrs.push(Ipv4Addr::from(buf.read_u32()));
        }
    }

    fn serialize_payload(&self, buf: &mut WriteCursor, _ctx: &Context) {
        buf.write_u32(self.ipv4_addr_mask.into());
        for addr in &self.ipv4_addrs {
            buf.write_u32((*addr).into());
        }
    }

    fn to_tree(&self, _ctx: &Context, element: &mut Element) {
        element.set_attr("IPv4_addr_mask", self.ipv4_addr_mask);
        for addr in &self.ipv4_addrs {
            element.add_child("address").set_attr("IPv4_addr", addr);
        }
    }

    fn from_tree(&mut self, _ctx: &Context, element: &Element) -> Result<(), TreeError> {
        self.ipv4_addr_mask = parse_address(element, "IPv4_addr_mask")?;
        self.ipv4_addrs = element
            .children_named("address")
            .map(|c| parse_address(c, "IPv4_addr"))
            .collect::<Result<_, _>>()?;
        if self.ipv4_addrs.len() > MAX_ADDRESSES {
            return Err(TreeError::too_many(&element.name, "address", MAX_ADDRESSES));
        }
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.ipv4_addrs.len() <= MAX_ADDRESSES
    }
}

pub fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>, _ctx: &Context) {
    let mask = Ipv4Addr::from(buf.read_u32());
    if !buf.is_valid() {
        return;
    }
    disp.field("Address mask", mask);
    while buf.remaining_bytes() >= 4 {
        disp.field("Address", Ipv4Addr::from(buf.read_u32()));
    }
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        Matcher::table_specific(TAG_INT_TARGET_IP_ADDRESS, &[TID_INT]),
        || Box::new(TargetIpAddressDescriptor::default()),
        display,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{decode_payload, payload_bytes, to_element};

    #[test]
    fn addresses() {
        let ctx = Context::default();
        let payload = [255, 255, 255, 0, 10, 0, 0, 1, 239, 1, 2, 3];
        let mut d = TargetIpAddressDescriptor::default();
        assert!(decode_payload(&mut d, &payload, &ctx));
        assert_eq!(d.ipv4_addr_mask, Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(d.ipv4_addrs, vec![Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(239, 1, 2, 3)]);
        assert_eq!(payload_bytes(&d, &ctx), Some(payload.to_vec()));

        let e = to_element(&d, &ctx);
        assert_eq!(e.attr("IPv4_addr_mask"), Some("255.255.255.0"));
        let mut back = TargetIpAddressDescriptor::default();
        back.from_tree(&ctx, &e).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn bad_address_rejected() {
        let mut e = Element::new("target_IP_address_descriptor");
        e.set_attr("IPv4_addr_mask", "300.0.0.1");
        let mut d = TargetIpAddressDescriptor::default();
        assert!(matches!(d.from_tree(&Context::default(), &e), Err(TreeError::InvalidValue { .. })));
    }
}
