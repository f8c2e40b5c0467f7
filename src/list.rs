//! Ordered descriptor loop, as found in a table section.
//!
//! Binary form: `tag(8) length(8) payload` repeated until the end of the
//! loop. Decoding never fails: broken records leave the list flagged invalid
//! and are kept as their raw bytes.

use log::{debug, trace, warn};

use crate::buffer::{ReadCursor, WriteCursor};
use crate::constants::{DESCRIPTOR_HEADER_SIZE, table_name};
use crate::context::Context;
use crate::descriptor::{self, Descriptor, OpaqueDescriptor, PrivateDataSpecifierDescriptor};
use crate::error::{ImportFailure, ImportReport, TreeError};
use crate::registry::Registry;
use crate::tree::Element;

pub const LIST_ELEMENT: &str = "descriptor_list";

#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorList {
    /// Enclosing table, used to resolve table-specific tags.
    pub table_id: Option<u8>,
    /// Maximum serialized size, headers included.
    pub max_size: Option<usize>,
    entries: Vec<Box<dyn Descriptor>>,
    valid: bool,
}

impl Default for DescriptorList {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorList {
    pub fn new() -> Self {
        Self {
            table_id: None,
            max_size: None,
            entries: Vec::new(),
            valid: true,
        }
    }

    pub fn for_table(table_id: u8) -> Self {
        Self {
            table_id: Some(table_id),
            ..Self::new()
        }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// False once a decode pass met a broken record.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn get(&self, index: usize) -> Option<&(dyn Descriptor + 'static)> {
        self.entries.get(index).map(|d| d.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &(dyn Descriptor + 'static)> + '_ {
        self.entries.iter().map(|d| d.as_ref())
    }

    pub fn push(&mut self, desc: Box<dyn Descriptor>) {
        self.entries.push(desc);
    }

    /// Appends `desc`, preceded by a private_data_specifier_descriptor when
    /// the descriptor needs a specifier other than the one in effect at the
    /// end of the list. `default_pds` is the specifier in effect before it.
    pub fn push_with_specifier(&mut self, desc: Box<dyn Descriptor>, default_pds: Option<u32>) {
        if let Some(required) = desc.info().private_specifier {
            if self.specifier_at_end(default_pds) != Some(required) {
                self.entries.push(Box::new(PrivateDataSpecifierDescriptor::new(required)));
            }
        }
        self.entries.push(desc);
    }

    fn specifier_at_end(&self, default_pds: Option<u32>) -> Option<u32> {
        self.entries
            .iter()
            .rev()
            .find_map(|d| d.private_specifier_override())
            .or(default_pds)
    }

    /// Moves all descriptors of `other` at the end of this list.
    pub fn append(&mut self, other: DescriptorList) {
        self.valid &= other.valid;
        if self.table_id.is_none() {
            self.table_id = other.table_id;
        }
        self.entries.extend(other.entries);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.valid = true;
    }

    /// Descriptors resolved to a typed variant, i.e. not kept opaque.
    pub fn typed_count(&self) -> usize {
        self.iter().filter(|d| d.downcast_ref::<OpaqueDescriptor>().is_none()).count()
    }

    /// Decodes a whole descriptor loop from `buf`, appending to the list.
    ///
    /// A private data specifier scope is open for the duration of the pass;
    /// each private_data_specifier_descriptor met replaces it. A payload that
    /// does not decode is kept as opaque bytes and the loop goes on. Unread
    /// trailing bytes are accepted. Framing errors end the loop. Returns the
    /// validity.
    pub fn deserialize_all(&mut self, buf: &mut ReadCursor<'_>, ctx: &mut Context, registry: &Registry) -> bool {
        let inherited = ctx.private_specifier();
        let mut scope = ctx.push_private_specifier(inherited);

        while buf.is_valid() && !buf.is_at_end() {
            if buf.remaining_bytes() < DESCRIPTOR_HEADER_SIZE {
                debug!("truncated descriptor header, {} bits left", buf.remaining_bits());
                buf.mark_invalid();
                break;
            }
            let tag = buf.read_u8();
            let len = buf.read_u8() as usize;
            let payload = buf.read_slice(len);
            if !buf.is_valid() {
                debug!("descriptor 0x{tag:02X}: length {len} beyond end of loop");
                break;
            }

            let mut desc = registry.create(tag, &scope, self.table_id, payload);
            let mut sub = ReadCursor::new(payload);
            desc.deserialize_payload(&mut sub, &scope);
            if sub.is_valid() {
                if !sub.is_at_end() {
                    trace!("{}: {} unread byte(s)", desc.name(), sub.remaining_bytes());
                }
                trace!("decoded {} ({len} bytes)", desc.name());
                if let Some(pds) = desc.private_specifier_override() {
                    scope.set_private_specifier(pds);
                }
                self.entries.push(desc);
            } else {
                warn!(
                    "invalid {} (tag 0x{tag:02X}, {len} bytes) in {}, kept raw",
                    desc.name(),
                    self.table_id.map_or("descriptor loop", table_name)
                );
                self.valid = false;
                self.entries.push(Box::new(OpaqueDescriptor::with_payload(tag, payload)));
            }
        }

        if !buf.is_valid() {
            self.valid = false;
        }
        self.valid
    }

    /// Decodes `data` as a complete descriptor loop.
    pub fn decode(data: &[u8], table_id: Option<u8>, ctx: &Context, registry: &Registry) -> Self {
        let mut list = Self {
            table_id,
            ..Self::new()
        };
        let mut local = ctx.clone();
        list.deserialize_all(&mut ReadCursor::new(data), &mut local, registry);
        list
    }

    /// Writes descriptors in order until the maximum size or the cursor
    /// capacity is reached. Descriptors whose payload does not fit in 255
    /// bytes are skipped. Returns the number of descriptors written.
    pub fn serialize_all(&self, buf: &mut WriteCursor, ctx: &Context) -> usize {
        let mut written = 0;
        let mut used = 0;
        for desc in &self.entries {
            let Some(payload) = descriptor::payload_bytes(desc.as_ref(), ctx) else {
                warn!("{} does not fit in a descriptor, skipped", desc.name());
                continue;
            };
            let size = DESCRIPTOR_HEADER_SIZE + payload.len();
            if self.max_size.is_some_and(|max| used + size > max)
                || buf.remaining_capacity().is_some_and(|room| size > room)
            {
                debug!("{} of {} descriptors fit in the output", written, self.entries.len());
                break;
            }
            buf.write_u8(desc.tag());
            buf.write_u8(payload.len() as u8);
            buf.write_bytes(&payload);
            used += size;
            written += 1;
        }
        written
    }

    pub fn to_bytes(&self, ctx: &Context) -> Vec<u8> {
        let mut buf = WriteCursor::new();
        self.serialize_all(&mut buf, ctx);
        buf.into_bytes()
    }

    /// Size of the serialized loop, maximum size applied.
    pub fn total_binary_size(&self, ctx: &Context) -> usize {
        self.to_bytes(ctx).len()
    }

    pub fn to_tree(&self, ctx: &Context) -> Element {
        let mut root = Element::new(LIST_ELEMENT);
        if let Some(tid) = self.table_id {
            root.set_hex("table_id", u64::from(tid), 8);
        }
        root.children = self.iter().map(|d| descriptor::to_element(d, ctx)).collect();
        root
    }

    /// Imports every child of a `descriptor_list` element. When some fail,
    /// the report carries both the failures and the list of the others.
    pub fn from_tree(element: &Element, ctx: &Context, registry: &Registry) -> Result<Self, ImportReport> {
        let mut list = Self::new();
        let mut failures = Vec::new();

        let header = element
            .expect_name(LIST_ELEMENT)
            .and_then(|_| element.optional_int("table_id", 8));
        match header {
            Ok(tid) => list.table_id = tid.map(|t| t as u8),
            Err(error) => failures.push(ImportFailure {
                index: 0,
                element: element.name.clone(),
                error,
            }),
        }

        for (index, child) in element.children.iter().enumerate() {
            let imported = registry
                .create_by_name(&child.name)
                .ok_or_else(|| TreeError::UnknownElement(child.name.clone()))
                .and_then(|mut desc| desc.from_tree(ctx, child).map(|_| desc));
            match imported {
                Ok(desc) => list.push(desc),
                Err(error) => {
                    debug!("cannot import <{}>: {error}", child.name);
                    failures.push(ImportFailure {
                        index,
                        element: child.name.clone(),
                        error,
                    });
                }
            }
        }

        if failures.is_empty() {
            Ok(list)
        } else {
            Err(ImportReport {
                imported: list,
                failures,
            })
        }
    }
}
