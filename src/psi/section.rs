// psi/section.rs
//! Generic long-form PSI / SI section reader with CRC-32 (MPEG-2) validation.

use crc::{CRC_32_MPEG_2, Crc};

/// Returned by [`SectionReader::new`].
pub struct SectionReader<'a> {
    pub table_id:       u8,
    /// program_number, transport_stream_id, network_id... depending on the table.
    pub table_id_ext:   u16,
    pub version:        u8,
    pub current_next:   bool,
    pub section_number: u8,
    pub last_section:   u8,
    pub body:           &'a [u8],   // bytes between fixed header & CRC
}

pub(crate) const CRC_MPEG: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

/// section_length of a section starting at `section[0]`.
pub fn section_length(section: &[u8]) -> Option<usize> {
    if section.len() < 3 {
        return None;
    }
    Some(((section[1] & 0x0F) as usize) << 8 | section[2] as usize)
}

/// Checks the trailing CRC-32 of a complete section.
pub fn check_crc(section: &[u8]) -> anyhow::Result<()> {
    if section.len() < 4 { anyhow::bail!("section too short for CRC") }
    let end = section.len();
    let crc_calc = CRC_MPEG.checksum(&section[..end - 4]);
    let crc_pkt  = u32::from_be_bytes(section[end - 4..].try_into()?);
    if crc_calc != crc_pkt {
        anyhow::bail!("CRC-32 mismatch (computed 0x{crc_calc:08X}, found 0x{crc_pkt:08X})");
    }
    Ok(())
}

impl<'a> SectionReader<'a> {
    /// Validates length and CRC-32 of a section starting at its table_id.
    pub fn new(section: &'a [u8]) -> anyhow::Result<Self> {
        if section.len() < 12 { anyhow::bail!("short section ({} bytes)", section.len()) }
        if section[1] & 0x80 == 0 { anyhow::bail!("not a long section (table 0x{:02X})", section[0]) }

        let sec_len = section_length(section).unwrap_or(0);
        if sec_len < 9 { anyhow::bail!("invalid section_length {sec_len}") }
        let end = 3 + sec_len;
        if end > section.len() { anyhow::bail!("truncated section: {} of {end} bytes", section.len()) }
        check_crc(&section[..end])?;

        Ok(Self {
            table_id:       section[0],
            table_id_ext:   u16::from_be_bytes([section[3], section[4]]),
            version:        (section[5] & 0x3E) >> 1,
            current_next:   section[5] & 0x01 != 0,
            section_number: section[6],
            last_section:   section[7],
            body:           &section[8..end - 4],
        })
    }
}

/// Builds a long section around `body`, CRC included.
pub fn build_long_section(table_id: u8, table_id_ext: u16, version: u8, body: &[u8]) -> Vec<u8> {
    let sec_len = 5 + body.len() + 4;
    let mut out = Vec::with_capacity(3 + sec_len);
    out.push(table_id);
    out.push(0xB0 | ((sec_len >> 8) as u8 & 0x0F));
    out.push(sec_len as u8);
    out.extend_from_slice(&table_id_ext.to_be_bytes());
    out.push(0xC1 | ((version & 0x1F) << 1));
    out.push(0);
    out.push(0);
    out.extend_from_slice(body);
    let crc = CRC_MPEG.checksum(&out);
    out.extend_from_slice(&crc.to_be_bytes());
    out
}

/// Reads a 12-bit loop length at `b[idx..idx+2]` and returns the loop bytes
/// with the index just after them.
pub(crate) fn descriptor_loop(b: &[u8], idx: usize) -> anyhow::Result<(&[u8], usize)> {
    if idx + 2 > b.len() { anyhow::bail!("missing descriptor loop length at offset {idx}") }
    let len   = (((b[idx] & 0x0F) as usize) << 8) | b[idx + 1] as usize;
    let start = idx + 2;
    if start + len > b.len() { anyhow::bail!("descriptor loop of {len} bytes beyond section end") }
    Ok((&b[start..start + len], start + len))
}
