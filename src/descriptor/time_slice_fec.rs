//! DVB time_slice_fec_identifier_descriptor (ETSI EN 301 192, 9.5).

use crate::buffer::{ReadCursor, WriteCursor, clamp_bits};
use crate::constants::{MAX_DESCRIPTOR_PAYLOAD, TAG_TIME_SLICE_FEC_ID};
use crate::context::{Context, Standards};
use crate::descriptor::{Descriptor, DescriptorInfo};
use crate::display::TextDisplay;
use crate::error::{RegistryError, TreeError};
use crate::registry::{Matcher, Registry};
use crate::tree::Element;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeSliceFecIdentifierDescriptor {
    pub time_slicing: bool,
    /// 2 bits.
    pub mpe_fec: u8,
    /// 3 bits.
    pub frame_size: u8,
    pub max_burst_duration: u8,
    /// 4 bits.
    pub max_average_rate: u8,
    /// 4 bits.
    pub time_slice_fec_id: u8,
    pub id_selector_bytes: Vec<u8>,
}

impl TimeSliceFecIdentifierDescriptor {
    pub const INFO: DescriptorInfo = DescriptorInfo {
        name: "time_slice_fec_identifier_descriptor",
        tag: TAG_TIME_SLICE_FEC_ID,
        standards: Standards::DVB,
        private_specifier: None,
    };
}

impl Descriptor for TimeSliceFecIdentifierDescriptor {
    fn info(&self) -> &'static DescriptorInfo {
        &Self::INFO
    }

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, _ctx: &Context) {
        self.time_slicing = buf.read_bool();
        self.mpe_fec = buf.read_bits(2) as u8;
        buf.skip_reserved(2);
        self.frame_size = buf.read_bits(3) as u8;
        self.max_burst_duration = buf.read_u8();
        self.max_average_rate = buf.read_bits(4) as u8;
        self.time_slice_fec_id = buf.read_bits(4) as u8;
        self.id_selector_bytes = buf.read_remaining_bytes();
    }

    fn serialize_payload(&self, buf: &mut WriteCursor, _ctx: &Context) {
        buf.write_bool(self.time_slicing);
        buf.write_bits(2, clamp_bits(u64::from(self.mpe_fec), 2));
        buf.write_reserved(2);
        buf.write_bits(3, clamp_bits(u64::from(self.frame_size), 3));
        buf.write_u8(self.max_burst_duration);
        buf.write_bits(4, clamp_bits(u64::from(self.max_average_rate), 4));
        buf.write_bits(4, clamp_bits(u64::from(self.time_slice_fec_id), 4));
        buf.write_bytes(&self.id_selector_bytes);
    }

    fn to_tree(&self, _ctx: &Context, element: &mut Element) {
        element.set_bool("time_slicing", self.time_slicing);
        element.set_int("mpe_fec", u64::from(self.mpe_fec));
        element.set_int("frame_size", u64::from(self.frame_size));
        element.set_int("max_burst_duration", u64::from(self.max_burst_duration));
        element.set_int("max_average_rate", u64::from(self.max_average_rate));
        element.set_int("time_slice_fec_id", u64::from(self.time_slice_fec_id));
        element.add_hex_child("id_selector_bytes", &self.id_selector_bytes);
    }

    fn from_tree(&mut self, _ctx: &Context, element: &Element) -> Result<(), TreeError> {
        self.time_slicing = element.required_bool("time_slicing")?;
        self.mpe_fec = element.required_int("mpe_fec", 2)? as u8;
        self.frame_size = element.required_int("frame_size", 3)? as u8;
        self.max_burst_duration = element.required_int("max_burst_duration", 8)? as u8;
        self.max_average_rate = element.required_int("max_average_rate", 4)? as u8;
        self.time_slice_fec_id = element.int_or("time_slice_fec_id", 4, 0)? as u8;
        self.id_selector_bytes = element.hex_child_max("id_selector_bytes", MAX_DESCRIPTOR_PAYLOAD - 3)?;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.mpe_fec < 4
            && self.frame_size < 8
            && self.max_average_rate < 16
            && self.time_slice_fec_id < 16
            && self.id_selector_bytes.len() <= MAX_DESCRIPTOR_PAYLOAD - 3
    }
}

fn frame_size_name(frame_size: u8, time_slicing: bool) -> &'static str {
    match (frame_size, time_slicing) {
        (0, true) => "512 kbits, 256 rows",
        (1, true) => "1024 kbits, 512 rows",
        (2, true) => "1536 kbits, 768 rows",
        (3, true) => "2048 kbits, 1024 rows",
        (0..=3, false) => "MPE-FEC rows only",
        _ => "reserved",
    }
}

fn max_average_rate_name(rate: u8) -> &'static str {
    match rate {
        0 => "16 kbps",
        1 => "32 kbps",
        2 => "64 kbps",
        3 => "128 kbps",
        4 => "256 kbps",
        5 => "512 kbps",
        6 => "1024 kbps",
        7 => "2048 kbps",
        15 => "not defined",
        _ => "reserved",
    }
}

pub fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>, _ctx: &Context) {
    let time_slicing = buf.read_bool();
    let mpe_fec = buf.read_bits(2);
    buf.skip_reserved(2);
    let frame_size = buf.read_bits(3) as u8;
    let burst = buf.read_u8();
    let rate = buf.read_bits(4) as u8;
    let id = buf.read_bits(4);
    if !buf.is_valid() {
        return;
    }
    disp.field("Use time slicing", time_slicing);
    disp.field("MPE-FEC algorithm", mpe_fec);
    disp.field("Frame size", format!("{frame_size} ({})", frame_size_name(frame_size, time_slicing)));
    disp.field("Max burst duration", format!("{burst} ({} ms)", 20 * u32::from(burst)));
    disp.field("Max average rate", format!("{rate} ({})", max_average_rate_name(rate)));
    disp.field("Time slice FEC id", id);
    let rest = buf.read_remaining_bytes();
    disp.hexdump("Id selector bytes", &rest);
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        Matcher::tag(TAG_TIME_SLICE_FEC_ID),
        || Box::new(TimeSliceFecIdentifierDescriptor::default()),
        display,
    )
}
