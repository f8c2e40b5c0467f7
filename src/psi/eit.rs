// psi/eit.rs
//! EIT, present/following and schedule (table_ids 0x4E..=0x6F).

use chrono::NaiveDateTime;

use super::section::{SectionReader, descriptor_loop};
use super::tdt::decode_mjd_utc;
use crate::constants::{TID_EIT_PF_ACT, TID_EIT_S_OTH_MAX};

pub struct EitSection<'a> {
    pub version:             u8,
    pub service_id:          u16,
    pub transport_stream_id: u16,
    pub original_network_id: u16,
    pub events:              Vec<Event<'a>>,
}

pub struct Event<'a> {
    pub event_id:       u16,
    /// `None` for an undefined (all ones) start time.
    pub start_time:     Option<NaiveDateTime>,
    /// Duration in seconds.
    pub duration:       u32,
    pub running_status: u8,
    pub free_ca:        bool,
    pub descriptors:    &'a [u8],
}

fn bcd_duration(b: &[u8]) -> u32 {
    let d = |x: u8| u32::from(x >> 4) * 10 + u32::from(x & 0x0F);
    d(b[0]) * 3600 + d(b[1]) * 60 + d(b[2])
}

pub fn parse_eit(section: &[u8]) -> anyhow::Result<(u8, EitSection<'_>)> {
    let sec = SectionReader::new(section)?;
    if !(TID_EIT_PF_ACT..=TID_EIT_S_OTH_MAX).contains(&sec.table_id) {
        anyhow::bail!("not EIT");
    }
    let b = sec.body;
    if b.len() < 6 {
        anyhow::bail!("EIT body too short");
    }

    let mut events = Vec::new();
    let mut idx = 6;
    while idx + 12 <= b.len() {
        let event_id = u16::from_be_bytes([b[idx], b[idx + 1]]);
        let (descriptors, next) = descriptor_loop(b, idx + 10)?;
        events.push(Event {
            event_id,
            start_time:     decode_mjd_utc(&b[idx + 2..idx + 7]),
            duration:       bcd_duration(&b[idx + 7..idx + 10]),
            running_status: b[idx + 10] >> 5,
            free_ca:        b[idx + 10] & 0x10 != 0,
            descriptors,
        });
        idx = next;
    }
    if idx != b.len() { anyhow::bail!("truncated event loop"); }

    Ok((
        sec.table_id,
        EitSection {
            version: sec.version,
            service_id: sec.table_id_ext,
            transport_stream_id: u16::from_be_bytes([b[0], b[1]]),
            original_network_id: u16::from_be_bytes([b[2], b[3]]),
            events,
        },
    ))
}
