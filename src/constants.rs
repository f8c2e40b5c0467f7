//! Constants for descriptor tags, table ids and private data specifiers

/// Descriptor framing: 1 byte tag + 1 byte length
pub const DESCRIPTOR_HEADER_SIZE: usize = 2;
pub const MAX_DESCRIPTOR_PAYLOAD: usize = 255;

/// MPEG / DVB descriptor tags
pub const TAG_CA: u8 = 0x09;
pub const TAG_PRIVATE_DATA_SPECIFIER: u8 = 0x5F;
pub const TAG_DATA_BROADCAST_ID: u8 = 0x66;
pub const TAG_TIME_SLICE_FEC_ID: u8 = 0x77;

/// DVB private descriptor tags (meaning depends on the private data specifier)
pub const TAG_EACEM_LOGICAL_CHANNEL_NUMBER: u8 = 0x83;

/// ISDB descriptor tags (ARIB STD-B10 / STD-B25)
pub const TAG_ISDB_CA_CONTRACT_INFO: u8 = 0xCB;
pub const TAG_ISDB_EVENT_GROUP: u8 = 0xD6;
pub const TAG_ISDB_CONTENT_AVAILABILITY: u8 = 0xDE;

/// INT-specific descriptor tags (ETSI EN 301 192)
pub const TAG_INT_TARGET_IP_ADDRESS: u8 = 0x09;

/// Table ids
pub const TID_PAT: u8 = 0x00;
pub const TID_CAT: u8 = 0x01;
pub const TID_PMT: u8 = 0x02;
pub const TID_NIT_ACT: u8 = 0x40;
pub const TID_NIT_OTH: u8 = 0x41;
pub const TID_SDT_ACT: u8 = 0x42;
pub const TID_SDT_OTH: u8 = 0x46;
pub const TID_BAT: u8 = 0x4A;
pub const TID_INT: u8 = 0x4C;
pub const TID_EIT_PF_ACT: u8 = 0x4E;
pub const TID_EIT_S_OTH_MAX: u8 = 0x6F;
pub const TID_TDT: u8 = 0x70;
pub const TID_TOT: u8 = 0x73;

/// Private data specifiers
pub const PDS_EACEM: u32 = 0x0000_0028;
pub const PDS_EUTELSAT: u32 = 0x0000_0055;
pub const PDS_OFCOM: u32 = 0x0000_233A;

/// data_broadcast_id values with a dedicated selector grammar (ETSI TS 101 162)
pub const DBID_MPE: u16 = 0x0005;
pub const DBID_SSU: u16 = 0x000A;
pub const DBID_IP_MAC_NOTIFICATION: u16 = 0x000B;

/// Well-known names, used by the display engine
pub fn table_name(table_id: u8) -> &'static str {
    match table_id {
        TID_PAT => "PAT",
        TID_CAT => "CAT",
        TID_PMT => "PMT",
        TID_NIT_ACT | TID_NIT_OTH => "NIT",
        TID_SDT_ACT | TID_SDT_OTH => "SDT",
        TID_BAT => "BAT",
        TID_INT => "INT",
        TID_EIT_PF_ACT..=TID_EIT_S_OTH_MAX => "EIT",
        TID_TDT => "TDT",
        TID_TOT => "TOT",
        _ => "unknown",
    }
}

pub fn pds_name(pds: u32) -> &'static str {
    match pds {
        PDS_EACEM => "EACEM/EICTA",
        PDS_EUTELSAT => "Eutelsat",
        PDS_OFCOM => "Ofcom",
        _ => "unknown",
    }
}

pub fn data_broadcast_id_name(id: u16) -> &'static str {
    match id {
        0x0001 => "Data pipe",
        0x0002 => "Asynchronous data stream",
        0x0003 => "Synchronous data stream",
        0x0004 => "Synchronised data stream",
        DBID_MPE => "Multi protocol encapsulation",
        0x0006 => "Data Carousel",
        0x0007 => "Object Carousel",
        DBID_SSU => "System Software Update",
        DBID_IP_MAC_NOTIFICATION => "IP/MAC Notification Table",
        _ => "unknown",
    }
}
