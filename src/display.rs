//! Diagnostic text rendering of descriptors.
//!
//! Display functions read directly from a cursor instead of building a
//! variant, so they can show whatever is decodable in a broken payload.
//! Rendering never fails: anything not understood becomes a hex dump.

use std::fmt::Write as _;

use crate::buffer::ReadCursor;
use crate::constants::{TAG_PRIVATE_DATA_SPECIFIER, pds_name};
use crate::context::Context;
use crate::registry::Registry;

/// Renders one payload, starting at the first payload byte.
pub type DisplayFn = fn(&mut TextDisplay, &mut ReadCursor<'_>, &Context);

const HEXDUMP_WIDTH: usize = 16;

/// Line-oriented text sink with an indentation level.
#[derive(Debug, Default)]
pub struct TextDisplay {
    lines: Vec<String>,
    indent: usize,
}

impl TextDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        self.lines
            .push(format!("{:width$}{}", "", text.as_ref(), width = self.indent * 2));
    }

    /// `label: value`
    pub fn field(&mut self, label: &str, value: impl std::fmt::Display) {
        self.line(format!("{label}: {value}"));
    }

    /// `label: 0x00AB (171)`
    pub fn hex_field(&mut self, label: &str, value: u64, bits: u32) {
        let digits = bits.div_ceil(4) as usize;
        self.line(format!("{label}: 0x{value:0digits$X} ({value})"));
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn unindent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    /// Offset-prefixed hex and ASCII dump. Nothing for an empty block.
    pub fn hexdump(&mut self, label: &str, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.line(format!("{label} ({} bytes):", data.len()));
        self.indent();
        for (row, chunk) in data.chunks(HEXDUMP_WIDTH).enumerate() {
            let mut text = format!("{:04X}:", row * HEXDUMP_WIDTH);
            for b in chunk {
                let _ = write!(text, " {b:02X}");
            }
            let pad = (HEXDUMP_WIDTH - chunk.len()) * 3;
            let _ = write!(text, "{:pad$}  ", "");
            text.extend(chunk.iter().map(|&b| if (0x20..0x7F).contains(&b) { b as char } else { '.' }));
            self.line(text);
        }
        self.unindent();
    }

    /// Dumps what is left in `buf` as extraneous data.
    pub fn extraneous(&mut self, buf: &mut ReadCursor<'_>) {
        if buf.is_valid() && !buf.is_at_end() {
            buf.align_to_byte();
            let rest = buf.read_remaining_bytes();
            self.hexdump("Extraneous data", &rest);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Renders one descriptor given its tag and payload.
pub fn display_descriptor(
    registry: &Registry,
    ctx: &Context,
    tag: u8,
    payload: &[u8],
    table_id: Option<u8>,
) -> Vec<String> {
    let mut disp = TextDisplay::new();
    render_descriptor(&mut disp, registry, ctx, tag, payload, table_id);
    disp.into_lines()
}

fn render_descriptor(
    disp: &mut TextDisplay,
    registry: &Registry,
    ctx: &Context,
    tag: u8,
    payload: &[u8],
    table_id: Option<u8>,
) {
    let Some(entry) = registry.resolve(tag, ctx, table_id, payload) else {
        disp.line(format!("- Unknown descriptor, tag 0x{tag:02X} ({tag}), {} bytes", payload.len()));
        disp.indent();
        disp.hexdump("Data", payload);
        disp.unindent();
        return;
    };

    disp.line(format!("- {}, tag 0x{tag:02X} ({tag}), {} bytes", entry.name, payload.len()));
    disp.indent();
    let mut buf = ReadCursor::new(payload);
    (entry.display)(disp, &mut buf, ctx);
    if buf.is_valid() {
        disp.extraneous(&mut buf);
    } else {
        disp.line("Invalid or truncated payload");
        disp.hexdump("Payload", payload);
    }
    disp.unindent();
}

/// Renders a binary descriptor loop. Private data specifiers met along the
/// way apply to the following descriptors. A broken frame ends the rendering
/// with a dump of the remaining bytes.
pub fn display_list(registry: &Registry, ctx: &Context, data: &[u8], table_id: Option<u8>) -> Vec<String> {
    let mut disp = TextDisplay::new();
    let mut local = ctx.clone();
    let mut scope = local.push_private_specifier(ctx.private_specifier());
    let mut pos = 0;

    while pos < data.len() {
        if data.len() - pos < 2 || data.len() - pos - 2 < data[pos + 1] as usize {
            disp.hexdump("Truncated descriptor", &data[pos..]);
            break;
        }
        let tag = data[pos];
        let len = data[pos + 1] as usize;
        let payload = &data[pos + 2..pos + 2 + len];
        render_descriptor(&mut disp, registry, &scope, tag, payload, table_id);

        if tag == TAG_PRIVATE_DATA_SPECIFIER && len >= 4 {
            let pds = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
            scope.set_private_specifier(pds);
            disp.indent();
            disp.line(format!("Following descriptors use specifier {}", pds_name(pds)));
            disp.unindent();
        }
        pos += 2 + len;
    }
    drop(scope);
    disp.into_lines()
}
