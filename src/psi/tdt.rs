// psi/tdt.rs
//! TDT (0x70, no CRC) & TOT (0x73, CRC present), plus the MJD/BCD time
//! encoding they share with the EIT.

use anyhow::bail;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::constants::{TID_TDT, TID_TOT};
use crate::psi::section::{check_crc, descriptor_loop, section_length};

pub enum TdtTot<'a> {
    Tdt { utc: Option<NaiveDateTime> },
    Tot { utc: Option<NaiveDateTime>, descriptors: &'a [u8] },
}

fn bcd(b: u8) -> Option<u32> {
    let (hi, lo) = (u32::from(b >> 4), u32::from(b & 0x0F));
    (hi < 10 && lo < 10).then_some(hi * 10 + lo)
}

/// 16-bit Modified Julian Date followed by HH MM SS in BCD.
pub fn decode_mjd_utc(b: &[u8]) -> Option<NaiveDateTime> {
    if b.len() < 5 {
        return None;
    }
    let mjd = i64::from(u16::from_be_bytes([b[0], b[1]]));
    // MJD 0 is 1858-11-17.
    let date = NaiveDate::from_ymd_opt(1858, 11, 17)? + Duration::days(mjd);
    date.and_hms_opt(bcd(b[2])?, bcd(b[3])?, bcd(b[4])?)
}

pub fn parse_tdt_tot(section: &[u8]) -> anyhow::Result<(u8, TdtTot<'_>)> {
    let Some(sec_len) = section_length(section) else { bail!("short TDT/TOT"); };
    let tid = section[0];
    let end = 3 + sec_len;
    if end > section.len() { bail!("truncated"); }
    if sec_len < 5 { bail!("TDT/TOT too short for UTC time"); }
    let utc = decode_mjd_utc(&section[3..8]);

    match tid {
        TID_TDT => Ok((tid, TdtTot::Tdt { utc })),      // no CRC
        TID_TOT => {
            // TOT has CRC-32 at end
            check_crc(&section[..end])?;
            if end < 14 { bail!("TOT too short"); }
            let (descriptors, _) = descriptor_loop(&section[..end - 4], 8)?;
            Ok((tid, TdtTot::Tot { utc, descriptors }))
        }
        _ => bail!("not TDT/TOT"),
    }
}
