//! PSI / SI sections carrying descriptor loops.
//!
//! Each table parser only locates the descriptor loops; [`parse_section`]
//! then decodes every loop as a [`DescriptorList`] with the table id as
//! resolution hint.

pub mod nit;
pub mod sdt;
pub mod eit;
pub mod tdt;
pub mod cat;
pub mod section;
pub mod pmt;

pub use nit::parse_nit;
pub use eit::parse_eit;
pub use tdt::{parse_tdt_tot, TdtTot};
pub use sdt::parse_sdt;
pub use cat::parse_cat;
pub use pmt::parse_pmt;
pub use section::SectionReader;

use bytes::Bytes;
use chrono::NaiveDateTime;

use crate::constants::*;
use crate::context::Context;
use crate::list::DescriptorList;
use crate::registry::Registry;

/// One descriptor loop of a section.
#[derive(Debug)]
pub struct DescriptorLoop {
    /// Where the loop sits, e.g. "program info" or "service 0x0001".
    pub label:       String,
    /// The loop as found in the section.
    pub raw:         Bytes,
    pub descriptors: DescriptorList,
}

/// Descriptor loops of one section, in section order.
#[derive(Debug)]
pub struct TableDescriptors {
    pub table_id: u8,
    pub version:  Option<u8>,
    /// UTC time of TDT / TOT sections.
    pub utc_time: Option<NaiveDateTime>,
    pub loops:    Vec<DescriptorLoop>,
}

impl TableDescriptors {
    pub fn is_valid(&self) -> bool {
        self.loops.iter().all(|l| l.descriptors.is_valid())
    }

    pub fn descriptor_count(&self) -> usize {
        self.loops.iter().map(|l| l.descriptors.len()).sum()
    }
}

/// Parses a complete section (starting at table_id) and decodes its
/// descriptor loops.
pub fn parse_section(section: &[u8], ctx: &Context, registry: &Registry) -> anyhow::Result<TableDescriptors> {
    let Some(&table_id) = section.first() else {
        anyhow::bail!("empty section");
    };
    let mut raw: Vec<(String, &[u8])> = Vec::new();
    let mut version = None;
    let mut utc_time = None;

    match table_id {
        TID_CAT => {
            let cat = parse_cat(section)?;
            version = Some(cat.version);
            raw.push(("CA descriptors".into(), cat.descriptors));
        }
        TID_PMT => {
            let pmt = parse_pmt(section)?;
            version = Some(pmt.version);
            raw.push((format!("program 0x{:04X} info", pmt.program_number), pmt.program_info));
            for s in &pmt.streams {
                raw.push((
                    format!("PID 0x{:04X}, stream type 0x{:02X}", s.elementary_pid, s.stream_type),
                    s.descriptors,
                ));
            }
        }
        TID_NIT_ACT | TID_NIT_OTH | TID_BAT => {
            let (_, nit) = parse_nit(section)?;
            version = Some(nit.version);
            let what = if table_id == TID_BAT { "bouquet" } else { "network" };
            raw.push((format!("{what} 0x{:04X}", nit.network_id), nit.descriptors));
            for ts in &nit.transports {
                raw.push((format!("TS 0x{:04X}, network 0x{:04X}", ts.ts_id, ts.orig_net_id), ts.descriptors));
            }
        }
        TID_SDT_ACT | TID_SDT_OTH => {
            let (_, sdt) = parse_sdt(section)?;
            version = Some(sdt.version);
            for s in &sdt.services {
                raw.push((format!("service 0x{:04X}", s.service_id), s.descriptors));
            }
        }
        TID_EIT_PF_ACT..=TID_EIT_S_OTH_MAX => {
            let (_, eit) = parse_eit(section)?;
            version = Some(eit.version);
            for e in &eit.events {
                raw.push((format!("service 0x{:04X}, event 0x{:04X}", eit.service_id, e.event_id), e.descriptors));
            }
        }
        TID_TDT | TID_TOT => match parse_tdt_tot(section)? {
            (_, TdtTot::Tdt { utc }) => utc_time = utc,
            (_, TdtTot::Tot { utc, descriptors }) => {
                utc_time = utc;
                raw.push(("local time offsets".into(), descriptors));
            }
        },
        _ => anyhow::bail!("table 0x{table_id:02X} ({}) carries no descriptor loop", table_name(table_id)),
    }

    let loops = raw
        .into_iter()
        .map(|(label, data)| DescriptorLoop {
            label,
            raw: Bytes::copy_from_slice(data),
            descriptors: DescriptorList::decode(data, Some(table_id), ctx, registry),
        })
        .collect();
    Ok(TableDescriptors { table_id, version, utc_time, loops })
}
