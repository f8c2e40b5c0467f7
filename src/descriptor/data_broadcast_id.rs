//! DVB data_broadcast_id_descriptor (ETSI EN 300 468, 6.2.12).
//!
//! The selector bytes have a grammar that depends on the data broadcast id
//! (ETSI TS 101 162). Three of them are understood: system software update
//! (TS 102 006), multiprotocol encapsulation and IP/MAC notification
//! (EN 301 192). Anything else, or a selector that does not parse with the
//! grammar of its id, is kept as raw bytes so nothing is lost.

use log::debug;

use crate::buffer::{ReadCursor, WriteCursor, clamp_bits};
use crate::constants::{
    DBID_IP_MAC_NOTIFICATION, DBID_MPE, DBID_SSU, MAX_DESCRIPTOR_PAYLOAD, TAG_DATA_BROADCAST_ID,
    data_broadcast_id_name,
};
use crate::context::{Context, Standards};
use crate::descriptor::{Descriptor, DescriptorInfo, SsuDataBroadcastIdDescriptor};
use crate::display::TextDisplay;
use crate::error::{RegistryError, TreeError};
use crate::registry::{Matcher, Registry};
use crate::tree::Element;

/// Largest selector: the payload minus the 16-bit id.
pub const MAX_SELECTOR_SIZE: usize = MAX_DESCRIPTOR_PAYLOAD - 2;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SsuEntry {
    /// 24 bits.
    pub oui: u32,
    /// 4 bits.
    pub update_type: u8,
    pub update_versioning_flag: bool,
    /// 5 bits.
    pub update_version: u8,
    pub selector: Vec<u8>,
}

/// SSU selector, shared by the generic descriptor and the SSU-only one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SsuSelector {
    pub entries: Vec<SsuEntry>,
    pub private_data: Vec<u8>,
}

impl SsuSelector {
    fn oui_data_length(&self) -> usize {
        self.entries.iter().map(|e| 6 + e.selector.len()).sum()
    }

    pub fn deserialize(buf: &mut ReadCursor<'_>) -> Self {
        let mut sel = Self::default();
        let len = buf.read_u8() as usize;
        let mut oui = ReadCursor::new(buf.read_slice(len));
        while buf.is_valid() && oui.is_valid() && !oui.is_at_end() {
            let mut entry = SsuEntry {
                oui: oui.read_u24(),
                ..Default::default()
            };
            oui.skip_reserved(4);
            entry.update_type = oui.read_bits(4) as u8;
            oui.skip_reserved(2);
            entry.update_versioning_flag = oui.read_bool();
            entry.update_version = oui.read_bits(5) as u8;
            let sel_len = oui.read_u8() as usize;
            entry.selector = oui.read_bytes(sel_len);
            if oui.is_valid() {
                sel.entries.push(entry);
            }
        }
        if !oui.is_valid() {
            buf.mark_invalid();
        }
        sel.private_data = buf.read_remaining_bytes();
        sel
    }

    /// Bit-fields are clamped. An OUI loop over 255 bytes invalidates `buf`.
    pub fn serialize(&self, buf: &mut WriteCursor) {
        let len = self.oui_data_length();
        if len > u8::MAX as usize || self.entries.iter().any(|e| e.selector.len() > u8::MAX as usize) {
            buf.mark_invalid();
            return;
        }
        buf.write_u8(len as u8);
        for e in &self.entries {
            buf.write_u24(clamp_bits(u64::from(e.oui), 24) as u32);
            buf.write_reserved(4);
            buf.write_bits(4, clamp_bits(u64::from(e.update_type), 4));
            buf.write_reserved(2);
            buf.write_bool(e.update_versioning_flag);
            buf.write_bits(5, clamp_bits(u64::from(e.update_version), 5));
            buf.write_u8(e.selector.len() as u8);
            buf.write_bytes(&e.selector);
        }
        buf.write_bytes(&self.private_data);
    }

    pub fn to_tree(&self, element: &mut Element) {
        for e in &self.entries {
            let child = element.add_child("OUI");
            child.set_hex("OUI", u64::from(e.oui), 24);
            child.set_hex("update_type", u64::from(e.update_type), 4);
            child.set_bool("update_versioning_flag", e.update_versioning_flag);
            child.set_int("update_version", u64::from(e.update_version));
            child.add_hex_child("selector", &e.selector);
        }
        element.add_hex_child("private_data", &self.private_data);
    }

    pub fn from_tree(element: &Element) -> Result<Self, TreeError> {
        let mut sel = Self::default();
        for child in element.children_named("OUI") {
            sel.entries.push(SsuEntry {
                oui: child.required_int("OUI", 24)? as u32,
                update_type: child.required_int("update_type", 4)? as u8,
                update_versioning_flag: child.optional_bool("update_versioning_flag")?.unwrap_or(false),
                update_version: child.int_or("update_version", 5, 0)? as u8,
                selector: child.hex_child_max("selector", u8::MAX as usize)?,
            });
        }
        if sel.oui_data_length() > u8::MAX as usize {
            return Err(TreeError::too_many(&element.name, "OUI", sel.entries.len() - 1));
        }
        sel.private_data = element.hex_child("private_data")?;
        if 1 + sel.oui_data_length() + sel.private_data.len() > MAX_SELECTOR_SIZE {
            return Err(TreeError::too_many(&element.name, "private_data", MAX_SELECTOR_SIZE));
        }
        Ok(sel)
    }

    pub fn is_valid(&self) -> bool {
        self.oui_data_length() <= u8::MAX as usize
            && self.entries.iter().all(|e| {
                e.oui < 1 << 24 && e.update_type < 16 && e.update_version < 32 && e.selector.len() <= u8::MAX as usize
            })
    }

    pub fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>) {
        let len = buf.read_u8() as usize;
        let mut oui = ReadCursor::new(buf.read_slice(len));
        if !buf.is_valid() {
            return;
        }
        while oui.remaining_bytes() >= 6 {
            let id = oui.read_u24();
            oui.skip_reserved(4);
            let update_type = oui.read_bits(4);
            oui.skip_reserved(2);
            let versioned = oui.read_bool();
            let version = oui.read_bits(5);
            let sel_len = oui.read_u8() as usize;
            let selector = oui.read_bytes(sel_len);
            if !oui.is_valid() {
                buf.mark_invalid();
                return;
            }
            disp.line(format!("- OUI: 0x{id:06X}, update type: 0x{update_type:X} ({})", update_type_name(update_type)));
            disp.indent();
            if versioned {
                disp.field("Update version", version);
            } else {
                disp.line("No update version");
            }
            disp.hexdump("Selector", &selector);
            disp.unindent();
        }
        if !oui.is_at_end() {
            buf.mark_invalid();
            return;
        }
        let rest = buf.read_remaining_bytes();
        disp.hexdump("Private data", &rest);
    }
}

fn update_type_name(update_type: u64) -> &'static str {
    match update_type {
        0 => "proprietary update solution",
        1 => "standard update carousel via broadcast",
        2 => "system software update with UNT via broadcast",
        3 => "system software update with UNT via return channel",
        _ => "reserved",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MpeSelector {
    /// 3 bits.
    pub mac_address_range: u8,
    pub mac_ip_mapping_flag: bool,
    pub alignment_indicator: bool,
    pub max_sections_per_datagram: u8,
}

impl MpeSelector {
    pub fn deserialize(buf: &mut ReadCursor<'_>) -> Self {
        let mac_address_range = buf.read_bits(3) as u8;
        let mac_ip_mapping_flag = buf.read_bool();
        let alignment_indicator = buf.read_bool();
        buf.skip_reserved(3);
        Self {
            mac_address_range,
            mac_ip_mapping_flag,
            alignment_indicator,
            max_sections_per_datagram: buf.read_u8(),
        }
    }

    pub fn serialize(&self, buf: &mut WriteCursor) {
        buf.write_bits(3, clamp_bits(u64::from(self.mac_address_range), 3));
        buf.write_bool(self.mac_ip_mapping_flag);
        buf.write_bool(self.alignment_indicator);
        buf.write_reserved(3);
        buf.write_u8(self.max_sections_per_datagram);
    }

    fn to_tree(&self, element: &mut Element) {
        let e = element.add_child("MPE");
        e.set_int("MAC_address_range", u64::from(self.mac_address_range));
        e.set_bool("MAC_IP_mapping_flag", self.mac_ip_mapping_flag);
        e.set_bool("alignment_indicator", self.alignment_indicator);
        e.set_int("max_sections_per_datagram", u64::from(self.max_sections_per_datagram));
    }

    fn from_tree(element: &Element) -> Result<Self, TreeError> {
        let e = element.child("MPE").ok_or_else(|| TreeError::MissingChild {
            element: element.name.clone(),
            child: "MPE".into(),
        })?;
        Ok(Self {
            mac_address_range: e.required_int("MAC_address_range", 3)? as u8,
            mac_ip_mapping_flag: e.required_bool("MAC_IP_mapping_flag")?,
            alignment_indicator: e.required_bool("alignment_indicator")?,
            max_sections_per_datagram: e.required_int("max_sections_per_datagram", 8)? as u8,
        })
    }

    fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>) {
        let sel = Self::deserialize(buf);
        if buf.is_valid() {
            disp.field("MAC address range", sel.mac_address_range);
            disp.field("MAC/IP mapping", sel.mac_ip_mapping_flag);
            disp.field("Alignment indicator", sel.alignment_indicator);
            disp.field("Max sections per datagram", sel.max_sections_per_datagram);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntPlatform {
    /// 24 bits.
    pub platform_id: u32,
    pub action_type: u8,
    pub int_versioning_flag: bool,
    /// 5 bits.
    pub int_version: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntSelector {
    pub platforms: Vec<IntPlatform>,
    pub private_data: Vec<u8>,
}

impl IntSelector {
    pub fn deserialize(buf: &mut ReadCursor<'_>) -> Self {
        let mut sel = Self::default();
        let len = buf.read_u8() as usize;
        if len % 5 != 0 {
            buf.mark_invalid();
            return sel;
        }
        for _ in 0..len / 5 {
            let platform_id = buf.read_u24();
            let action_type = buf.read_u8();
            buf.skip_reserved(2);
            let int_versioning_flag = buf.read_bool();
            let int_version = buf.read_bits(5) as u8;
            if !buf.is_valid() {
                return sel;
            }
            sel.platforms.push(IntPlatform {
                platform_id,
                action_type,
                int_versioning_flag,
                int_version,
            });
        }
        sel.private_data = buf.read_remaining_bytes();
        sel
    }

    pub fn serialize(&self, buf: &mut WriteCursor) {
        let len = self.platforms.len() * 5;
        if len > u8::MAX as usize {
            buf.mark_invalid();
            return;
        }
        buf.write_u8(len as u8);
        for p in &self.platforms {
            buf.write_u24(clamp_bits(u64::from(p.platform_id), 24) as u32);
            buf.write_u8(p.action_type);
            buf.write_reserved(2);
            buf.write_bool(p.int_versioning_flag);
            buf.write_bits(5, clamp_bits(u64::from(p.int_version), 5));
        }
        buf.write_bytes(&self.private_data);
    }

    fn to_tree(&self, element: &mut Element) {
        for p in &self.platforms {
            let e = element.add_child("platform");
            e.set_hex("platform_id", u64::from(p.platform_id), 24);
            e.set_hex("action_type", u64::from(p.action_type), 8);
            e.set_bool("INT_versioning_flag", p.int_versioning_flag);
            e.set_int("INT_version", u64::from(p.int_version));
        }
        element.add_hex_child("private_data", &self.private_data);
    }

    fn from_tree(element: &Element) -> Result<Self, TreeError> {
        let mut sel = Self::default();
        for e in element.children_named("platform") {
            sel.platforms.push(IntPlatform {
                platform_id: e.required_int("platform_id", 24)? as u32,
                action_type: e.required_int("action_type", 8)? as u8,
                int_versioning_flag: e.optional_bool("INT_versioning_flag")?.unwrap_or(false),
                int_version: e.int_or("INT_version", 5, 0)? as u8,
            });
        }
        if sel.platforms.len() > u8::MAX as usize / 5 {
            return Err(TreeError::too_many(&element.name, "platform", u8::MAX as usize / 5));
        }
        sel.private_data = element.hex_child("private_data")?;
        if 1 + 5 * sel.platforms.len() + sel.private_data.len() > MAX_SELECTOR_SIZE {
            return Err(TreeError::too_many(&element.name, "private_data", MAX_SELECTOR_SIZE));
        }
        Ok(sel)
    }

    fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>) {
        let sel = Self::deserialize(buf);
        if !buf.is_valid() {
            return;
        }
        for p in &sel.platforms {
            disp.line(format!("- Platform id: 0x{:06X}, action type: 0x{:02X}", p.platform_id, p.action_type));
            if p.int_versioning_flag {
                disp.indent();
                disp.field("INT version", p.int_version);
                disp.unindent();
            }
        }
        disp.hexdump("Private data", &sel.private_data);
    }
}

/// Selector bytes, decoded according to the data broadcast id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Ssu(SsuSelector),
    Mpe(MpeSelector),
    Int(IntSelector),
    /// Unknown id, or bytes that do not follow the grammar of the id.
    Raw(Vec<u8>),
}

impl Default for Selector {
    fn default() -> Self {
        Selector::Raw(Vec::new())
    }
}

impl Selector {
    /// Decodes `data` with the grammar of `id`, falling back to raw bytes.
    pub fn parse(id: u16, data: &[u8]) -> Self {
        let mut buf = ReadCursor::new(data);
        let sel = match id {
            DBID_SSU => Selector::Ssu(SsuSelector::deserialize(&mut buf)),
            DBID_MPE => Selector::Mpe(MpeSelector::deserialize(&mut buf)),
            DBID_IP_MAC_NOTIFICATION => Selector::Int(IntSelector::deserialize(&mut buf)),
            _ => return Selector::Raw(data.to_vec()),
        };
        if buf.is_valid() && buf.is_at_end() {
            sel
        } else {
            debug!("selector of {} does not parse, kept raw", data_broadcast_id_name(id));
            Selector::Raw(data.to_vec())
        }
    }

    pub fn serialize(&self, buf: &mut WriteCursor) {
        match self {
            Selector::Ssu(s) => s.serialize(buf),
            Selector::Mpe(s) => s.serialize(buf),
            Selector::Int(s) => s.serialize(buf),
            Selector::Raw(data) => buf.write_bytes(data),
        }
    }

    fn to_tree(&self, element: &mut Element) {
        match self {
            Selector::Ssu(s) => s.to_tree(element),
            Selector::Mpe(s) => s.to_tree(element),
            Selector::Int(s) => s.to_tree(element),
            // Always present, so that an empty raw selector is not taken for
            // an empty structured one on import.
            Selector::Raw(data) => {
                let child = element.add_child("selector_bytes");
                if !data.is_empty() {
                    child.text = Some(crate::tree::to_hex(data));
                }
            }
        }
    }

    fn from_tree(id: u16, element: &Element) -> Result<Self, TreeError> {
        if element.child("selector_bytes").is_some() {
            return Ok(Selector::Raw(element.hex_child_max("selector_bytes", MAX_SELECTOR_SIZE)?));
        }
        Ok(match id {
            DBID_SSU => Selector::Ssu(SsuSelector::from_tree(element)?),
            DBID_MPE => Selector::Mpe(MpeSelector::from_tree(element)?),
            DBID_IP_MAC_NOTIFICATION => Selector::Int(IntSelector::from_tree(element)?),
            _ => Selector::Raw(Vec::new()),
        })
    }

    fn is_valid(&self) -> bool {
        match self {
            Selector::Ssu(s) => s.is_valid(),
            Selector::Mpe(s) => s.mac_address_range < 8,
            Selector::Int(s) => {
                s.platforms.len() <= u8::MAX as usize / 5
                    && s.platforms.iter().all(|p| p.platform_id < 1 << 24 && p.int_version < 32)
            }
            Selector::Raw(data) => data.len() <= MAX_SELECTOR_SIZE,
        }
    }
}

/// Shows selector bytes with the grammar of `id`, as a hex dump otherwise.
pub fn display_selector(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>, id: u16) {
    let data = buf.read_remaining_bytes();
    let mut sel = ReadCursor::new(&data);
    let mut structured = TextDisplay::new();
    match id {
        DBID_SSU => SsuSelector::display(&mut structured, &mut sel),
        DBID_MPE => MpeSelector::display(&mut structured, &mut sel),
        DBID_IP_MAC_NOTIFICATION => IntSelector::display(&mut structured, &mut sel),
        _ => sel.mark_invalid(),
    }
    if sel.is_valid() && sel.is_at_end() {
        for line in structured.into_lines() {
            disp.line(line);
        }
    } else {
        disp.hexdump("Data broadcast selector", &data);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataBroadcastIdDescriptor {
    pub data_broadcast_id: u16,
    pub selector: Selector,
}

impl DataBroadcastIdDescriptor {
    pub const INFO: DescriptorInfo = DescriptorInfo {
        name: "data_broadcast_id_descriptor",
        tag: TAG_DATA_BROADCAST_ID,
        standards: Standards::DVB,
        private_specifier: None,
    };

    pub fn new(data_broadcast_id: u16) -> Self {
        Self {
            data_broadcast_id,
            selector: Selector::default(),
        }
    }
}

impl Descriptor for DataBroadcastIdDescriptor {
    fn info(&self) -> &'static DescriptorInfo {
        &Self::INFO
    }

    fn clear_content(&mut self) {
        *self = Self::default();
    }

    fn deserialize_payload(&mut self, buf: &mut ReadCursor<'_>, _ctx: &Context) {
        self.data_broadcast_id = buf.read_u16();
        let rest = buf.read_remaining_bytes();
        if buf.is_valid() {
            self.selector = Selector::parse(self.data_broadcast_id, &rest);
        }
    }

    fn serialize_payload(&self, buf: &mut WriteCursor, _ctx: &Context) {
        buf.write_u16(self.data_broadcast_id);
        self.selector.serialize(buf);
    }

    fn to_tree(&self, _ctx: &Context, element: &mut Element) {
        element.set_hex("data_broadcast_id", u64::from(self.data_broadcast_id), 16);
        self.selector.to_tree(element);
    }

    fn from_tree(&mut self, _ctx: &Context, element: &Element) -> Result<(), TreeError> {
        self.data_broadcast_id = element.required_int("data_broadcast_id", 16)? as u16;
        self.selector = Selector::from_tree(self.data_broadcast_id, element)?;
        Ok(())
    }

    /// A structured selector must be the one of its id. Raw bytes go with any id.
    fn is_valid(&self) -> bool {
        let grammar_matches = match self.selector {
            Selector::Ssu(_) => self.data_broadcast_id == DBID_SSU,
            Selector::Mpe(_) => self.data_broadcast_id == DBID_MPE,
            Selector::Int(_) => self.data_broadcast_id == DBID_IP_MAC_NOTIFICATION,
            Selector::Raw(_) => true,
        };
        grammar_matches && self.selector.is_valid()
    }

    fn eq_other_type(&self, other: &dyn Descriptor) -> bool {
        other
            .as_any()
            .downcast_ref::<SsuDataBroadcastIdDescriptor>()
            .is_some_and(|ssu| ssu.eq_other_type(self))
    }
}

pub fn display(disp: &mut TextDisplay, buf: &mut ReadCursor<'_>, _ctx: &Context) {
    let id = buf.read_u16();
    if !buf.is_valid() {
        return;
    }
    disp.line(format!("Data broadcast id: 0x{id:04X} ({id}), {}", data_broadcast_id_name(id)));
    display_selector(disp, buf, id);
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(
        Matcher::tag(TAG_DATA_BROADCAST_ID),
        || Box::new(DataBroadcastIdDescriptor::default()),
        display,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{decode_payload, payload_bytes, to_element};

    #[test]
    fn mpe_selector() {
        let ctx = Context::default();
        let payload = [0x00, 0x05, 0b1011_0111, 0x08];
        let mut d = DataBroadcastIdDescriptor::default();
        assert!(decode_payload(&mut d, &payload, &ctx));
        assert_eq!(
            d.selector,
            Selector::Mpe(MpeSelector {
                mac_address_range: 5,
                mac_ip_mapping_flag: true,
                alignment_indicator: false,
                max_sections_per_datagram: 8,
            })
        );
        assert_eq!(payload_bytes(&d, &ctx), Some(payload.to_vec()));
    }

    #[test]
    fn malformed_selector_kept_raw() {
        let ctx = Context::default();
        // MPE selector with a trailing byte.
        let payload = [0x00, 0x05, 0xFF, 0x08, 0x99];
        let mut d = DataBroadcastIdDescriptor::default();
        assert!(decode_payload(&mut d, &payload, &ctx));
        assert_eq!(d.selector, Selector::Raw(vec![0xFF, 0x08, 0x99]));
        assert_eq!(payload_bytes(&d, &ctx), Some(payload.to_vec()));
    }

    #[test]
    fn ssu_selector() {
        let ctx = Context::default();
        let payload = [
            0x00, 0x0A, // id
            0x08, // OUI loop length
            0x00, 0x01, 0x5A, 0xF1, 0xE3, 0x02, 0xAB, 0xCD, // one OUI entry
            0x77, // private data
        ];
        let mut d = DataBroadcastIdDescriptor::default();
        assert!(decode_payload(&mut d, &payload, &ctx));
        let Selector::Ssu(ssu) = &d.selector else {
            panic!("expected SSU selector, got {:?}", d.selector);
        };
        assert_eq!(ssu.entries.len(), 1);
        assert_eq!(ssu.entries[0].oui, 0x00015A);
        assert_eq!(ssu.entries[0].update_type, 1);
        assert!(ssu.entries[0].update_versioning_flag);
        assert_eq!(ssu.entries[0].update_version, 3);
        assert_eq!(ssu.private_data, vec![0x77]);
        assert_eq!(payload_bytes(&d, &ctx), Some(payload.to_vec()));
    }

    #[test]
    fn int_selector_tree() {
        let ctx = Context::default();
        let d = DataBroadcastIdDescriptor {
            data_broadcast_id: DBID_IP_MAC_NOTIFICATION,
            selector: Selector::Int(IntSelector {
                platforms: vec![IntPlatform {
                    platform_id: 0x123456,
                    action_type: 1,
                    int_versioning_flag: true,
                    int_version: 9,
                }],
                private_data: vec![],
            }),
        };
        let e = to_element(&d, &ctx);
        assert_eq!(e.attr("data_broadcast_id"), Some("0x000B"));
        let mut back = DataBroadcastIdDescriptor::default();
        back.from_tree(&ctx, &e).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn empty_raw_selector_survives_tree() {
        let ctx = Context::default();
        let d = DataBroadcastIdDescriptor::new(DBID_SSU);
        let e = to_element(&d, &ctx);
        let mut back = DataBroadcastIdDescriptor::default();
        back.from_tree(&ctx, &e).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn selector_must_follow_id() {
        let mpe = MpeSelector {
            mac_address_range: 1,
            mac_ip_mapping_flag: false,
            alignment_indicator: false,
            max_sections_per_datagram: 1,
        };
        let mismatched = DataBroadcastIdDescriptor {
            data_broadcast_id: DBID_MPE,
            selector: Selector::Ssu(SsuSelector::default()),
        };
        assert!(!mismatched.is_valid());
        let mismatched = DataBroadcastIdDescriptor {
            data_broadcast_id: DBID_SSU,
            selector: Selector::Mpe(mpe.clone()),
        };
        assert!(!mismatched.is_valid());
        let matched = DataBroadcastIdDescriptor {
            data_broadcast_id: DBID_MPE,
            selector: Selector::Mpe(mpe),
        };
        assert!(matched.is_valid());
        for id in [DBID_SSU, DBID_MPE, DBID_IP_MAC_NOTIFICATION, 0x0123] {
            let raw = DataBroadcastIdDescriptor {
                data_broadcast_id: id,
                selector: Selector::Raw(vec![0x03, 0x01]),
            };
            assert!(raw.is_valid());
        }
    }

    #[test]
    fn ssu_id_stays_generic_and_lossless() {
        let ctx = Context::default();
        let registry = crate::registry::Registry::global();
        for data in [
            &[0x66, 0x02, 0x00, 0x0A][..],
            &[0x66, 0x04, 0x00, 0x0A, 0x03, 0x01][..],
            &[0x66, 0x03, 0x00, 0x0A, 0x00][..],
        ] {
            let list = crate::list::DescriptorList::decode(data, None, &ctx, registry);
            assert!(list.is_valid(), "{data:02X?}");
            assert_eq!(list.get(0).map(|d| d.name()), Some("data_broadcast_id_descriptor"));
            assert_eq!(list.to_bytes(&ctx), data);
        }

        let mut list = crate::list::DescriptorList::new();
        list.push(Box::new(DataBroadcastIdDescriptor::new(DBID_SSU)));
        let bytes = list.to_bytes(&ctx);
        assert_eq!(bytes, [0x66, 0x02, 0x00, 0x0A]);
        assert_eq!(crate::list::DescriptorList::decode(&bytes, None, &ctx, registry), list);
    }

    #[test]
    fn selector_display_falls_back_to_dump() {
        let data = [0x03, 0x01];
        let mut disp = TextDisplay::new();
        display_selector(&mut disp, &mut ReadCursor::new(&data), DBID_SSU);
        assert!(disp.lines()[0].starts_with("Data broadcast selector (2 bytes)"));
    }
}
