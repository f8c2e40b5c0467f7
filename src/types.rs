use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::charset::Charset;
use crate::context::{Context, Standards};

/// Syntax used to render descriptor lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Diagnostic text.
    #[default]
    Text,
    Xml,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Xml => "xml",
            OutputFormat::Json => "json",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "xml" => Ok(OutputFormat::Xml),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

impl OutputFormat {
    /// Tree syntax from a file name extension, XML by default.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Xml,
        }
    }
}

/// Configuration options for decoding and encoding descriptors
#[derive(Debug, Clone, Default, Serialize)]
pub struct Options {
    #[serde(serialize_with = "display")]
    pub standards: Standards,
    /// Default private data specifier, before any specifier descriptor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_specifier: Option<u32>,
    pub charset: Charset,
    /// Enclosing table of raw descriptor lists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<u8>,
    pub format: OutputFormat,
}

fn display<T: fmt::Display, S: serde::Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(value)
}

impl Options {
    /// Execution context matching these options.
    pub fn context(&self) -> Context {
        let ctx = Context::new(self.standards).with_charset(self.charset);
        match self.private_specifier {
            Some(pds) => ctx.with_private_specifier(pds),
            None => ctx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_from_options() {
        let opts = Options {
            standards: Standards::DVB | Standards::ISDB,
            private_specifier: Some(0x28),
            charset: Charset::Utf8,
            ..Default::default()
        };
        let ctx = opts.context();
        assert!(ctx.has_standard(Standards::ISDB));
        assert_eq!(ctx.private_specifier(), Some(0x28));
        assert_eq!(ctx.default_charset(), Charset::Utf8);

        let json = serde_json::to_value(&opts).unwrap();
        assert_eq!(json["standards"], "DVB|ISDB");
        assert_eq!(json["format"], "text");
    }

    #[test]
    fn formats() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::from_path("a/b.json".as_ref()), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path("a/b.xml".as_ref()), OutputFormat::Xml);
    }
}
