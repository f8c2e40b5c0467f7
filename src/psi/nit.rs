// psi/nit.rs
//! Network Information Table (0x40 / 0x41) and Bouquet Association Table
//! (0x4A), which share the same syntax.
use crate::constants::{TID_BAT, TID_NIT_ACT, TID_NIT_OTH};
use crate::psi::section::{SectionReader, descriptor_loop};

pub struct NitSection<'a> {
    pub version:     u8,
    /// network_id, or bouquet_id for a BAT.
    pub network_id:  u16,
    pub descriptors: &'a [u8],
    pub transports:  Vec<Transport<'a>>,
}

pub struct Transport<'a> {
    pub ts_id:       u16,
    pub orig_net_id: u16,
    pub descriptors: &'a [u8],
}

pub fn parse_nit(section: &[u8]) -> anyhow::Result<(u8, NitSection<'_>)> {
    let sec = SectionReader::new(section)?;
    if ![TID_NIT_ACT, TID_NIT_OTH, TID_BAT].contains(&sec.table_id) {
        anyhow::bail!("not NIT/BAT");
    }

    let b = sec.body;                 // shorthand, CRC already stripped
    let (descriptors, idx) = descriptor_loop(b, 0)?;
    let (ts_loop, _) = descriptor_loop(b, idx)?;

    let mut transports = Vec::new();
    let mut idx = 0;
    while idx + 6 <= ts_loop.len() {
        let ts_id       = u16::from_be_bytes([ts_loop[idx], ts_loop[idx + 1]]);
        let orig_net_id = u16::from_be_bytes([ts_loop[idx + 2], ts_loop[idx + 3]]);
        let (descriptors, next) = descriptor_loop(ts_loop, idx + 4)?;
        transports.push(Transport { ts_id, orig_net_id, descriptors });
        idx = next;
    }
    if idx != ts_loop.len() { anyhow::bail!("truncated transport stream loop"); }

    Ok((
        sec.table_id,
        NitSection {
            version: sec.version,
            network_id: sec.table_id_ext,
            descriptors,
            transports,
        },
    ))
}
