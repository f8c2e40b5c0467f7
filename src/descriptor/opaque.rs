//! Fallback for tags with no registered meaning in the current context.

use crate::buffer::{ReadCursor, WriteCursor};
use crate::constants::MAX_DESCRIPTOR_PAYLOAD;
use crate::context::{Context, Standards};
use crate::descriptor::{Descriptor, DescriptorInfo};
use crate::error::TreeError;
use crate::tree::{Element, from_hex, to_hex};

/// Raw payload kept byte for byte, so unknown descriptors survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpaqueDescriptor {
    pub tag: u8,
    pub payload: Vec<u8>,
}

impl OpaqueDescriptor {
    pub const INFO: DescriptorInfo = DescriptorInfo {
        name: "generic_descriptor",
        tag: 0xFF,
        standards: Standards::NONE,
        private_specifier: None,
    };

    pub fn new(tag: u8) -> Self {
        Self {
            tag,
            payload: Vec::new(),
        }
    }

    pub fn with_payload(tag: u8, payload: &[u8]) -> Self {
        Self {
            tag,
            payload: payload.to_vec(),
        }
    }
}

impl Descriptor for OpaqueDescriptor {
    fn info(&self) -> &'static DescriptorInfo {
        &Self::INFO
    }

    fn tag(&self) -> u8 {
        self.tag
    }

    // The tag identifies the descriptor, only the content is cleared.
    fn clear_content(&mut self) {
        self.payload.clear();
    }

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, _ctx: &Context) {
        self.payload = buf.read_remaining_bytes();
    }

    fn serialize_payload(&self, buf: &mut WriteCursor, _ctx: &Context) {
        buf.write_bytes(&self.payload);
    }

    fn to_tree(&self, _ctx: &Context, element: &mut Element) {
        element.set_hex("tag", u64::from(self.tag), 8);
        if !self.payload.is_empty() {
            element.text = Some(to_hex(&self.payload));
        }
    }

    fn from_tree(&mut self, _ctx: &Context, element: &Element) -> Result<(), TreeError> {
        self.tag = element.required_int("tag", 8)? as u8;
        let text = element.text.as_deref().unwrap_or("");
        self.payload = from_hex(text).ok_or_else(|| TreeError::InvalidHex {
            element: element.name.clone(),
            child: "#text".into(),
        })?;
        if self.payload.len() > MAX_DESCRIPTOR_PAYLOAD {
            return Err(TreeError::too_many(&element.name, "#text", MAX_DESCRIPTOR_PAYLOAD));
        }
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.payload.len() <= MAX_DESCRIPTOR_PAYLOAD
    }
}
