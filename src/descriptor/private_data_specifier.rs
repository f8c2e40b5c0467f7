//! DVB private_data_specifier_descriptor (ETSI EN 300 468, 6.2.31).
//!
//! Changes the meaning of the private tags that follow it in the same
//! descriptor loop.

use crate::buffer::{ReadCursor, WriteCursor};
use crate::constants::{TAG_PRIVATE_DATA_SPECIFIER, pds_name};
use crate::context::{Context, Standards};
use crate::descriptor::{Descriptor, DescriptorInfo};
use crate::display::TextDisplay;
use crate::error::{RegistryError, TreeError};
use crate::registry::{Matcher, Registry};
use crate::tree::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrivateDataSpecifierDescriptor {
    pub private_data_specifier: u32,
}

impl PrivateDataSpecifierDescriptor {
    pub const INFO: DescriptorInfo = DescriptorInfo {
        name: "private_data_specifier_descriptor",
        tag: TAG_PRIVATE_DATA_SPECIFIER,
        standards: Standards::DVB,
        private_specifier: None,
    };

    pub fn new(pds: u32) -> Self {
        Self {
            private_data_specifier: pds,
        }
    }
}

impl Descriptor for PrivateDataSpecifierDescriptor {
    fn info(&self) -> &'static DescriptorInfo {
        &Self::INFO
    }

    fn clear_content(&mut self) {
        self.private_data_specifier = 0;
    }

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, _ctx: &Context) {
        self.private_data_specifier = buf.read_u32();
    }

    fn serialize_payload(&self, buf: &mut WriteCursor, _ctx: &Context) {
        buf.write_u32(self.private_data_specifier);
    }

    fn to_tree(&self, _ctx: &Context, element: &mut Element) {
        element.set_hex("private_data_specifier", u64::from(self.private_data_specifier), 32);
    }

    fn from_tree(&mut self, _ctx: &Context, element: &Element) -> Result<(), TreeError> {
        self.private_data_specifier = element.required_int("private_data_specifier", 32)? as u32;
        Ok(())
    }

    fn private_specifier_override(&self) -> Option<u32> {
        Some(self.private_data_specifier)
    }
}

pub fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>, _ctx: &Context) {
    let pds = buf.read_u32();
    if buf.is_valid() {
        disp.field("Specifier", format!("0x{pds:08X} ({})", pds_name(pds)));
    }
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        Matcher::tag(TAG_PRIVATE_DATA_SPECIFIER),
        || Box::new(PrivateDataSpecifierDescriptor::default()),
        display,
    )
}
