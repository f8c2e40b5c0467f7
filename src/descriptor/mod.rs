//! Descriptor variants and the contract they implement.
//!
//! Every concrete descriptor owns typed fields matching its binary layout and
//! implements [`Descriptor`]. Variants are discovered through the
//! [`Registry`](crate::registry::Registry), never through a central `match`.
//! Each module exposes a `register` function adding its entries.

pub mod ca;
pub mod ca_contract_info;
pub mod content_availability;
pub mod data_broadcast_id;
pub mod event_group;
pub mod logical_channel;
pub mod opaque;
pub mod private_data_specifier;
pub mod ssu_data_broadcast_id;
pub mod target_ip_address;
pub mod time_slice_fec;

use std::any::Any;
use std::fmt;

pub use ca::CaDescriptor;
pub use ca_contract_info::CaContractInfoDescriptor;
pub use content_availability::ContentAvailabilityDescriptor;
pub use data_broadcast_id::{DataBroadcastIdDescriptor, Selector};
pub use event_group::EventGroupDescriptor;
pub use logical_channel::LogicalChannelNumberDescriptor;
pub use opaque::OpaqueDescriptor;
pub use private_data_specifier::PrivateDataSpecifierDescriptor;
pub use ssu_data_broadcast_id::SsuDataBroadcastIdDescriptor;
pub use target_ip_address::TargetIpAddressDescriptor;
pub use time_slice_fec::TimeSliceFecIdentifierDescriptor;

use crate::buffer::{ReadCursor, WriteCursor};
use crate::constants::MAX_DESCRIPTOR_PAYLOAD;
use crate::context::{Context, Standards};
use crate::error::{RegistryError, TreeError};
use crate::registry::Registry;
use crate::tree::Element;

/// Static identity of a descriptor type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorInfo {
    /// Tree element name, unique in a registry.
    pub name: &'static str,
    pub tag: u8,
    /// Standards defining the descriptor (informative).
    pub standards: Standards,
    /// Private data specifier required to interpret the tag.
    pub private_specifier: Option<u32>,
}

/// The per-variant serialization contract.
///
/// `deserialize_payload` receives a cursor bounded to the payload (tag and
/// length already consumed) and reports structural problems through the
/// cursor's validity flag. An instance after `clear_content` is the empty
/// state and serializes to a minimal valid payload.
pub trait Descriptor: DynDescriptor + fmt::Debug + Send + Sync {
    fn info(&self) -> &'static DescriptorInfo;

    fn tag(&self) -> u8 {
        self.info().tag
    }

    fn name(&self) -> &'static str {
        self.info().name
    }

    fn clear_content(&mut self);

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, ctx: &Context);

    fn serialize_payload(&self, buf: &mut WriteCursor, ctx: &Context);

    /// Fills `element` (already named after the descriptor).
    fn to_tree(&self, ctx: &Context, element: &mut Element);

    /// Loads the content from `element`. Unknown attributes and children are ignored.
    fn from_tree(&mut self, ctx: &Context, element: &Element) -> Result<(), TreeError>;

    /// Structural self-check: bit-fields within their widths, sizes within limits.
    fn is_valid(&self) -> bool {
        true
    }

    /// Specifier that applies to the descriptors following this one in a list.
    fn private_specifier_override(&self) -> Option<u32> {
        None
    }

    /// Equality with an instance of another type describing the same bytes.
    fn eq_other_type(&self, _other: &dyn Descriptor) -> bool {
        false
    }
}

/// Object-safe helpers, implemented for every `Clone + PartialEq` descriptor.
pub trait DynDescriptor {
    fn as_any(&self) -> &dyn Any;
    fn clone_box(&self) -> Box<dyn Descriptor>;
    fn dyn_eq(&self, other: &dyn Descriptor) -> bool;
}

impl<T> DynDescriptor for T
where
    T: Descriptor + Clone + PartialEq + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn Descriptor> {
        Box::new(self.clone())
    }

    fn dyn_eq(&self, other: &dyn Descriptor) -> bool {
        match other.as_any().downcast_ref::<T>() {
            Some(o) => self == o,
            None => self.eq_other_type(other),
        }
    }
}

impl PartialEq for dyn Descriptor {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

impl Clone for Box<dyn Descriptor> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl dyn Descriptor {
    pub fn downcast_ref<T: Descriptor + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Serializes the payload alone. `None` if it does not fit in a descriptor.
pub fn payload_bytes(desc: &dyn Descriptor, ctx: &Context) -> Option<Vec<u8>> {
    let mut buf = WriteCursor::new();
    desc.serialize_payload(&mut buf, ctx);
    if !buf.is_valid() || buf.bytes_written() > MAX_DESCRIPTOR_PAYLOAD {
        return None;
    }
    Some(buf.into_bytes())
}

/// Resets `desc` and decodes `payload` into it. Returns the cursor validity.
pub fn decode_payload(desc: &mut dyn Descriptor, payload: &[u8], ctx: &Context) -> bool {
    desc.clear_content();
    let mut buf = ReadCursor::new(payload);
    desc.deserialize_payload(&mut buf, ctx);
    buf.is_valid()
}

/// Builds the complete tree element of a descriptor.
pub fn to_element(desc: &dyn Descriptor, ctx: &Context) -> Element {
    let mut element = Element::new(desc.name());
    desc.to_tree(ctx, &mut element);
    element
}

/// Adds every built-in descriptor to `registry`.
pub fn register_all(registry: &mut Registry) -> Result<(), RegistryError> {
    ca::register(registry)?;
    target_ip_address::register(registry)?;
    private_data_specifier::register(registry)?;
    data_broadcast_id::register(registry)?;
    ssu_data_broadcast_id::register(registry)?;
    time_slice_fec::register(registry)?;
    logical_channel::register(registry)?;
    ca_contract_info::register(registry)?;
    event_group::register(registry)?;
    content_availability::register(registry)?;
    Ok(())
}
