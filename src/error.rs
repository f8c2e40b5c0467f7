//! Error types for tree import and registry construction.
//!
//! Binary decoding never produces an error value: structural problems are
//! tracked by the cursor and list validity flags. Only tree import (which
//! handles user-edited documents) and registry misuse are reported here.

use thiserror::Error;

use crate::list::DescriptorList;

/// Failure while importing a descriptor from its tree form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A mandatory attribute is absent.
    #[error("<{element}>: missing mandatory attribute '{attribute}'")]
    MissingAttribute { element: String, attribute: String },

    /// An attribute value could not be converted to the expected type.
    #[error("<{element}>: invalid value '{value}' for attribute '{attribute}', expected {expected}")]
    InvalidValue {
        element: String,
        attribute: String,
        value: String,
        expected: &'static str,
    },

    /// A numeric attribute does not fit in the declared bit width.
    #[error("<{element}>: value {value} of attribute '{attribute}' exceeds maximum {max}")]
    OutOfRange {
        element: String,
        attribute: String,
        value: u64,
        max: u64,
    },

    /// A mandatory child element is absent.
    #[error("<{element}>: missing mandatory child <{child}>")]
    MissingChild { element: String, child: String },

    /// Too many occurrences of a repeated child, or too much data in a child.
    #[error("<{element}>: too many <{child}> entries, maximum is {max}")]
    TooMany {
        element: String,
        child: String,
        max: usize,
    },

    /// Encoded data larger than its length field or the descriptor allows.
    #[error("<{element}>: {item} takes {size} bytes, maximum is {max}")]
    TooLong {
        element: String,
        item: String,
        size: usize,
        max: usize,
    },

    /// Hexadecimal content of a child element is malformed.
    #[error("<{element}>: invalid hexadecimal content in <{child}>")]
    InvalidHex { element: String, child: String },

    /// The element name does not designate any registered descriptor.
    #[error("<{0}>: unknown descriptor element")]
    UnknownElement(String),

    /// The element does not match the descriptor it is imported into.
    #[error("expected <{expected}>, found <{found}>")]
    WrongElement { expected: String, found: String },

    /// The document itself is not well formed.
    #[error("syntax error: {0}")]
    Syntax(String),
}

/// Registry construction errors, detected when variants are registered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two entries would accept exactly the same inputs.
    #[error("conflicting registration for tag 0x{tag:02X}: '{new}' has the same matcher as '{existing}'")]
    Conflict {
        tag: u8,
        existing: &'static str,
        new: &'static str,
    },

    /// Two entries share the same tree element name.
    #[error("duplicate element name '{0}'")]
    DuplicateName(&'static str),
}

/// One descriptor element that failed to import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    /// Position of the offending child under the list element.
    pub index: usize,
    /// Name of the offending element.
    pub element: String,
    pub error: TreeError,
}

/// Result of a list import where at least one element failed.
///
/// Elements that imported cleanly are kept in `imported`, in document order,
/// so callers may report every problem at once and still use the rest.
#[derive(Error, Debug)]
#[error("{} descriptor(s) failed to import{}", .failures.len(), first_failure(.failures))]
pub struct ImportReport {
    pub imported: DescriptorList,
    pub failures: Vec<ImportFailure>,
}

fn first_failure(failures: &[ImportFailure]) -> String {
    failures
        .first()
        .map(|f| format!(", first: #{} {}", f.index, f.error))
        .unwrap_or_default()
}

impl TreeError {
    pub(crate) fn missing_attribute(element: &str, attribute: &str) -> Self {
        TreeError::MissingAttribute {
            element: element.to_string(),
            attribute: attribute.to_string(),
        }
    }

    pub(crate) fn invalid_value(element: &str, attribute: &str, value: &str, expected: &'static str) -> Self {
        TreeError::InvalidValue {
            element: element.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
            expected,
        }
    }

    pub(crate) fn too_long(element: &str, item: &str, size: usize, max: usize) -> Self {
        TreeError::TooLong {
            element: element.to_string(),
            item: item.to_string(),
            size,
            max,
        }
    }

    pub(crate) fn too_many(element: &str, child: &str, max: usize) -> Self {
        TreeError::TooMany {
            element: element.to_string(),
            child: child.to_string(),
            max,
        }
    }
}
