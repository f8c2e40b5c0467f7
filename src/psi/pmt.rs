use crate::constants::TID_PMT;
use crate::psi::section::{SectionReader, descriptor_loop};

/// ─────────── PMT ───────────
pub struct PmtSection<'a> {
    pub version:        u8,
    pub program_number: u16,
    pub pcr_pid:        u16,
    pub program_info:   &'a [u8],
    pub streams:        Vec<StreamInfo<'a>>,
}

pub struct StreamInfo<'a> {
    pub stream_type:    u8,
    pub elementary_pid: u16,
    pub descriptors:    &'a [u8],
}

pub fn parse_pmt(section: &[u8]) -> anyhow::Result<PmtSection<'_>> {
    let sec = SectionReader::new(section)?;
    if sec.table_id != TID_PMT { anyhow::bail!("not PMT"); }
    let b = sec.body;
    if b.len() < 4 { anyhow::bail!("PMT body too short"); }

    let pcr_pid = (((b[0] & 0x1F) as u16) << 8) | (b[1] as u16);
    let (program_info, mut idx) = descriptor_loop(b, 2)?;

    let mut streams = Vec::new();
    while idx + 5 <= b.len() {
        let stream_type    = b[idx];
        let elementary_pid = (((b[idx + 1] & 0x1F) as u16) << 8) | (b[idx + 2] as u16);
        let (descriptors, next) = descriptor_loop(b, idx + 3)?;
        streams.push(StreamInfo { stream_type, elementary_pid, descriptors });
        idx = next;
    }
    if idx != b.len() { anyhow::bail!("{} trailing bytes after ES loop", b.len() - idx); }

    Ok(PmtSection {
        version: sec.version,
        program_number: sec.table_id_ext,
        pcr_pid,
        program_info,
        streams,
    })
}
