//! data_broadcast_id_descriptor restricted to system software update
//! (ETSI TS 102 006, 7.1).
//!
//! Binary data always decodes to the generic descriptor, which keeps
//! malformed selectors as raw bytes. This variant is reached by its element
//! name and compares equal to the generic descriptor with the same content.

use crate::buffer::{ReadCursor, WriteCursor};
use crate::constants::{DBID_SSU, TAG_DATA_BROADCAST_ID};
use crate::context::{Context, Standards};
use crate::descriptor::data_broadcast_id::{DataBroadcastIdDescriptor, Selector, SsuSelector};
use crate::descriptor::{Descriptor, DescriptorInfo};
use crate::display::TextDisplay;
use crate::error::{RegistryError, TreeError};
use crate::registry::Registry;
use crate::tree::Element;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SsuDataBroadcastIdDescriptor {
    pub selector: SsuSelector,
}

impl SsuDataBroadcastIdDescriptor {
    pub const INFO: DescriptorInfo = DescriptorInfo {
        name: "SSU_data_broadcast_id_descriptor",
        tag: TAG_DATA_BROADCAST_ID,
        standards: Standards::DVB,
        private_specifier: None,
    };
}

impl From<SsuDataBroadcastIdDescriptor> for DataBroadcastIdDescriptor {
    fn from(d: SsuDataBroadcastIdDescriptor) -> Self {
        DataBroadcastIdDescriptor {
            data_broadcast_id: DBID_SSU,
            selector: Selector::Ssu(d.selector),
        }
    }
}

impl Descriptor for SsuDataBroadcastIdDescriptor {
    fn info(&self) -> &'static DescriptorInfo {
        &Self::INFO
    }

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, _ctx: &Context) {
        if buf.read_u16() != DBID_SSU {
            buf.mark_invalid();
            return;
        }
        self.selector = SsuSelector::deserialize(buf);
    }

    fn serialize_payload(&self, buf: &mut WriteCursor, _ctx: &Context) {
        buf.write_u16(DBID_SSU);
        self.selector.serialize(buf);
    }

    fn to_tree(&self, _ctx: &Context, element: &mut Element) {
        self.selector.to_tree(element);
    }

    fn from_tree(&mut self, _ctx: &Context, element: &Element) -> Result<(), TreeError> {
        self.selector = SsuSelector::from_tree(element)?;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.selector.is_valid()
    }

    fn eq_other_type(&self, other: &dyn Descriptor) -> bool {
        other
            .as_any()
            .downcast_ref::<DataBroadcastIdDescriptor>()
            .is_some_and(|g| {
                g.data_broadcast_id == DBID_SSU && matches!(&g.selector, Selector::Ssu(s) if *s == self.selector)
            })
    }
}

pub fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>, ctx: &Context) {
    crate::descriptor::data_broadcast_id::display(disp, buf, ctx);
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_named(|| Box::new(SsuDataBroadcastIdDescriptor::default()), display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::data_broadcast_id::SsuEntry;
    use crate::descriptor::{decode_payload, payload_bytes, to_element};
    use crate::list::DescriptorList;

    fn sample() -> SsuDataBroadcastIdDescriptor {
        SsuDataBroadcastIdDescriptor {
            selector: SsuSelector {
                entries: vec![SsuEntry {
                    oui: 0x00015A,
                    update_type: 2,
                    update_versioning_flag: false,
                    update_version: 0,
                    selector: vec![],
                }],
                private_data: vec![],
            },
        }
    }

    #[test]
    fn same_bytes_as_generic() {
        let ctx = Context::default();
        let ssu = payload_bytes(&sample(), &ctx).unwrap();
        let generic: DataBroadcastIdDescriptor = sample().into();
        assert_eq!(payload_bytes(&generic, &ctx).unwrap(), ssu);
        assert_eq!(ssu, vec![0x00, 0x0A, 0x06, 0x00, 0x01, 0x5A, 0xF2, 0xC0, 0x00]);
    }

    #[test]
    fn shares_tree_shape() {
        let ctx = Context::default();
        let ssu = to_element(&sample(), &ctx);
        let generic = to_element(&DataBroadcastIdDescriptor::from(sample()), &ctx);
        assert_eq!(ssu.children, generic.children);

        let mut back = SsuDataBroadcastIdDescriptor::default();
        back.from_tree(&ctx, &ssu).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn equal_to_generic_after_binary_pass() {
        let ctx = Context::default();
        let mut list = DescriptorList::new();
        list.push(Box::new(sample()));
        let back = DescriptorList::decode(&list.to_bytes(&ctx), None, &ctx, Registry::global());
        assert!(back.is_valid());
        assert_eq!(back.get(0).map(|d| d.name()), Some("data_broadcast_id_descriptor"));
        assert_eq!(back, list);
        assert_eq!(list, back);

        let mut other = sample();
        other.selector.entries[0].update_version = 1;
        let generic: Box<dyn Descriptor> = Box::new(DataBroadcastIdDescriptor::from(other));
        let ssu: Box<dyn Descriptor> = Box::new(sample());
        assert!(generic != ssu);
    }

    #[test]
    fn other_id_rejected() {
        let mut d = SsuDataBroadcastIdDescriptor::default();
        assert!(!decode_payload(&mut d, &[0x00, 0x05, 0x00], &Context::default()));
    }
}
