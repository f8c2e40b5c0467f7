// psi/sdt.rs
use crate::constants::{TID_SDT_ACT, TID_SDT_OTH};
use super::section::{SectionReader, descriptor_loop};

pub struct SdtSection<'a> {
    pub version:             u8,
    pub transport_stream_id: u16,
    pub original_network_id: u16,
    pub services:            Vec<Service<'a>>,
}

pub struct Service<'a> {
    pub service_id:     u16,
    pub eit_schedule:   bool,
    pub eit_pf:         bool,
    pub running_status: u8,
    pub free_ca:        bool,
    pub descriptors:    &'a [u8],
}

/// SDT (table_id 0x42 actual / 0x46 other-TS) with CRC check.
pub fn parse_sdt(section: &[u8]) -> anyhow::Result<(u8, SdtSection<'_>)> {
    let sec = SectionReader::new(section)?;
    if sec.table_id != TID_SDT_ACT && sec.table_id != TID_SDT_OTH {
        anyhow::bail!("not SDT");
    }

    let b = sec.body;
    if b.len() < 3 {
        anyhow::bail!("SDT body too short");
    }
    let original_network_id = u16::from_be_bytes([b[0], b[1]]);

    let mut idx = 3;                              // start of service loop
    let mut services = Vec::new();
    while idx + 5 <= b.len() {
        let service_id = u16::from_be_bytes([b[idx], b[idx + 1]]);
        let flags      = b[idx + 2];
        let status     = b[idx + 3];
        let (descriptors, next) = descriptor_loop(b, idx + 3)?;
        services.push(Service {
            service_id,
            eit_schedule:   flags & 0x02 != 0,
            eit_pf:         flags & 0x01 != 0,
            running_status: status >> 5,
            free_ca:        status & 0x10 != 0,
            descriptors,
        });
        idx = next;
    }
    if idx != b.len() { anyhow::bail!("truncated service loop"); }

    Ok((
        sec.table_id,
        SdtSection {
            version: sec.version,
            transport_stream_id: sec.table_id_ext,
            original_network_id,
            services,
        },
    ))
}
