//! Generic attributed tree used as the interchange form of descriptors.
//!
//! The same tree is rendered in two syntaxes, see [`xml`] and [`json`].
//! Descriptors only ever see [`Element`].

pub mod json;
pub mod xml;

use std::fmt::Write as _;

use crate::error::TreeError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    /// Attributes in insertion order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    pub text: Option<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn set_attr(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.set_attr(name, value);
    }

    /// Decimal attribute.
    pub fn set_int(&mut self, name: &str, value: u64) {
        self.set_attr(name, value);
    }

    /// Hexadecimal attribute, zero-padded to the field width in bits.
    pub fn set_hex(&mut self, name: &str, value: u64, bits: u32) {
        let digits = bits.div_ceil(4) as usize;
        self.set_attr(name, format!("0x{value:0digits$X}"));
    }

    pub fn add_child(&mut self, name: &str) -> &mut Element {
        self.children.push(Element::new(name));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Adds `<name>hex bytes</name>`; nothing is added for an empty block.
    pub fn add_hex_child(&mut self, name: &str, data: &[u8]) {
        if !data.is_empty() {
            self.add_child(name).text = Some(to_hex(data));
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn required_bool(&self, name: &str) -> Result<bool, TreeError> {
        self.optional_bool(name)?
            .ok_or_else(|| TreeError::missing_attribute(&self.name, name))
    }

    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>, TreeError> {
        let Some(value) = self.attr(name) else {
            return Ok(None);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(Some(true)),
            "false" | "no" | "0" | "off" => Ok(Some(false)),
            _ => Err(TreeError::invalid_value(&self.name, name, value, "boolean")),
        }
    }

    /// Mandatory unsigned attribute of at most `bits` bits.
    pub fn required_int(&self, name: &str, bits: u32) -> Result<u64, TreeError> {
        self.optional_int(name, bits)?
            .ok_or_else(|| TreeError::missing_attribute(&self.name, name))
    }

    /// Unsigned attribute with a default value when absent.
    pub fn int_or(&self, name: &str, bits: u32, default: u64) -> Result<u64, TreeError> {
        Ok(self.optional_int(name, bits)?.unwrap_or(default))
    }

    pub fn optional_int(&self, name: &str, bits: u32) -> Result<Option<u64>, TreeError> {
        let Some(text) = self.attr(name) else {
            return Ok(None);
        };
        let value = parse_integer(text)
            .ok_or_else(|| TreeError::invalid_value(&self.name, name, text, "unsigned integer"))?;
        let max = if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 };
        if value > max {
            return Err(TreeError::OutOfRange {
                element: self.name.clone(),
                attribute: name.to_string(),
                value,
                max,
            });
        }
        Ok(Some(value))
    }

    pub fn optional_string(&self, name: &str) -> Option<String> {
        self.attr(name).map(str::to_string)
    }

    /// Content of the hexadecimal child `name`, empty when the child is absent.
    pub fn hex_child(&self, name: &str) -> Result<Vec<u8>, TreeError> {
        match self.child(name) {
            None => Ok(Vec::new()),
            Some(child) => from_hex(child.text.as_deref().unwrap_or("")).ok_or_else(|| {
                TreeError::InvalidHex {
                    element: self.name.clone(),
                    child: name.to_string(),
                }
            }),
        }
    }

    /// Hexadecimal child with a maximum size in bytes.
    pub fn hex_child_max(&self, name: &str, max: usize) -> Result<Vec<u8>, TreeError> {
        let data = self.hex_child(name)?;
        if data.len() > max {
            return Err(TreeError::too_many(&self.name, name, max));
        }
        Ok(data)
    }

    /// Fails when `expected` is not this element's name.
    pub fn expect_name(&self, expected: &str) -> Result<(), TreeError> {
        if self.name == expected {
            Ok(())
        } else {
            Err(TreeError::WrongElement {
                expected: expected.to_string(),
                found: self.name.clone(),
            })
        }
    }
}

/// Decimal, "0x" hexadecimal or "0b" binary, with optional '_' or ',' separators.
pub fn parse_integer(text: &str) -> Option<u64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != '_' && *c != ',')
        .collect();
    if let Some(hex) = cleaned.strip_prefix("0x").or_else(|| cleaned.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = cleaned.strip_prefix("0b").or_else(|| cleaned.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).ok()
    } else {
        cleaned.parse().ok()
    }
}

/// Uppercase hex bytes separated by spaces.
pub fn to_hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for (i, b) in data.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b:02X}");
    }
    out
}

/// Parses hex digits, ignoring whitespace. Odd digit counts are rejected.
pub fn from_hex(text: &str) -> Option<Vec<u8>> {
    let digits: Vec<u8> = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<_>>()?;
    if digits.len() % 2 != 0 {
        return None;
    }
    Some(digits.chunks(2).map(|p| (p[0] << 4) | p[1]).collect())
}
