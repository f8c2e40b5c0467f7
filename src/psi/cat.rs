use crate::constants::TID_CAT;
use crate::psi::section::SectionReader;

/// ─────────── CAT ───────────
pub struct CatSection<'a> {
    pub version:     u8,
    /// The whole body is one descriptor loop.
    pub descriptors: &'a [u8],
}

pub fn parse_cat(section: &[u8]) -> anyhow::Result<CatSection<'_>> {
    let sec = SectionReader::new(section)?;          // CRC verified
    if sec.table_id != TID_CAT {
        anyhow::bail!("not CAT");
    }
    Ok(CatSection { version: sec.version, descriptors: sec.body })
}
