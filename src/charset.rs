//! Text encodings used in descriptor strings.
//!
//! DVB strings may start with a character table selector byte (ETSI EN 300 468
//! annex A). Only the selectors that map onto Unicode without tables are
//! interpreted here: 0x15 (UTF-8) and 0x10 0x00 0x01 (ISO 8859-1). Any other
//! selector, and the default table, fall back to Latin-1 for bytes >= 0x20.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Charset {
    /// DVB string with optional leading table selector.
    #[default]
    Dvb,
    /// Raw UTF-8, no selector.
    Utf8,
    /// ISO 8859-1, no selector.
    Latin1,
}

const DVB_UTF8_SELECTOR: u8 = 0x15;
const DVB_8859_SELECTOR: u8 = 0x10;

impl Charset {
    pub fn decode(self, data: &[u8]) -> String {
        match self {
            Charset::Utf8 => String::from_utf8_lossy(data).into_owned(),
            Charset::Latin1 => decode_latin1(data),
            Charset::Dvb => match data.first() {
                None => String::new(),
                Some(&DVB_UTF8_SELECTOR) => String::from_utf8_lossy(&data[1..]).into_owned(),
                Some(&DVB_8859_SELECTOR) if data.len() >= 3 => decode_latin1(&data[3..]),
                Some(&b) if b < 0x20 => decode_latin1(&data[1..]),
                Some(_) => decode_latin1(data),
            },
        }
    }

    /// Encodes a string. With `Dvb`, pure ASCII is written without selector,
    /// anything else is prefixed with the UTF-8 selector.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Charset::Utf8 => text.as_bytes().to_vec(),
            Charset::Latin1 => encode_latin1(text),
            Charset::Dvb => {
                if text.bytes().all(|b| (0x20..0x7F).contains(&b)) {
                    text.as_bytes().to_vec()
                } else {
                    let mut out = Vec::with_capacity(text.len() + 1);
                    out.push(DVB_UTF8_SELECTOR);
                    out.extend_from_slice(text.as_bytes());
                    out
                }
            }
        }
    }
}

/// Largest encoded size of `text` over all charsets: the DVB form, which
/// adds a selector byte to anything but printable ASCII.
pub fn max_encoded_len(text: &str) -> usize {
    Charset::Dvb.encode(text).len()
}

fn decode_latin1(data: &[u8]) -> String {
    data.iter().map(|&b| b as char).collect()
}

// Characters outside Latin-1 are replaced with '?'.
fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Charset::Dvb => "dvb",
            Charset::Utf8 => "utf8",
            Charset::Latin1 => "latin1",
        })
    }
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dvb" => Ok(Charset::Dvb),
            "utf8" | "utf-8" => Ok(Charset::Utf8),
            "latin1" | "iso-8859-1" => Ok(Charset::Latin1),
            other => Err(format!("unknown charset '{other}'")),
        }
    }
}
