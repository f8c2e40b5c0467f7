//! Execution context passed explicitly to every codec operation.

use std::fmt;
use std::ops::{BitOr, BitOrAssign, Deref, DerefMut};
use std::str::FromStr;

use crate::charset::Charset;

/// Set of active broadcast standards. Flags are not exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Standards(u16);

impl Standards {
    pub const NONE: Standards = Standards(0x0000);
    pub const MPEG: Standards = Standards(0x0001);
    pub const DVB: Standards = Standards(0x0002);
    pub const SCTE: Standards = Standards(0x0004);
    pub const ATSC: Standards = Standards(0x0008);
    pub const ISDB: Standards = Standards(0x0010);
    pub const JAPAN: Standards = Standards(0x0020);
    pub const ABNT: Standards = Standards(0x0040);

    const NAMES: [(Standards, &'static str); 7] = [
        (Standards::MPEG, "MPEG"),
        (Standards::DVB, "DVB"),
        (Standards::SCTE, "SCTE"),
        (Standards::ATSC, "ATSC"),
        (Standards::ISDB, "ISDB"),
        (Standards::JAPAN, "JAPAN"),
        (Standards::ABNT, "ABNT"),
    ];

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every flag of `other` is also set in `self`.
    pub fn contains(self, other: Standards) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Standards {
    type Output = Standards;
    fn bitor(self, rhs: Standards) -> Standards {
        Standards(self.0 | rhs.0)
    }
}

impl BitOrAssign for Standards {
    fn bitor_assign(&mut self, rhs: Standards) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Standards {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}

impl FromStr for Standards {
    type Err = String;

    /// Parses "DVB", "isdb,japan", "DVB|ISDB" or "none".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut result = Standards::NONE;
        for word in s.split([',', '|', '+']).map(str::trim).filter(|w| !w.is_empty()) {
            if word.eq_ignore_ascii_case("none") {
                continue;
            }
            let flag = Self::NAMES
                .iter()
                .find(|(_, name)| name.eq_ignore_ascii_case(word))
                .map(|(flag, _)| *flag)
                .ok_or_else(|| format!("unknown standard '{word}'"))?;
            result |= flag;
        }
        Ok(result)
    }
}

/// Active standards, default private data specifier and default charset.
///
/// The private data specifier stack only lives for the duration of one
/// decode pass; see [`Context::push_private_specifier`].
#[derive(Debug, Clone, Default)]
pub struct Context {
    standards: Standards,
    default_pds: Option<u32>,
    charset: Charset,
    pds_stack: Vec<Option<u32>>,
}

impl Context {
    pub fn new(standards: Standards) -> Self {
        Self {
            standards,
            ..Default::default()
        }
    }

    pub fn with_private_specifier(mut self, pds: u32) -> Self {
        self.default_pds = Some(pds);
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    pub fn standards(&self) -> Standards {
        self.standards
    }

    pub fn has_standard(&self, flag: Standards) -> bool {
        self.standards.contains(flag)
    }

    pub fn add_standards(&mut self, flags: Standards) {
        self.standards |= flags;
    }

    pub fn default_charset(&self) -> Charset {
        self.charset
    }

    /// Specifier in effect: innermost scope first, then the default.
    pub fn private_specifier(&self) -> Option<u32> {
        match self.pds_stack.last() {
            Some(scoped) => *scoped,
            None => self.default_pds,
        }
    }

    /// Opens a specifier scope. The scope is closed (popped) when the returned
    /// guard is dropped, on every exit path of the caller.
    pub fn push_private_specifier(&mut self, pds: Option<u32>) -> SpecifierScope<'_> {
        let depth = self.pds_stack.len();
        self.pds_stack.push(pds);
        SpecifierScope { ctx: self, depth }
    }

    /// Replaces the specifier of the innermost scope. Outside any scope this
    /// is a no-op: the default specifier is never changed by decoding.
    pub fn set_private_specifier(&mut self, pds: u32) {
        if let Some(top) = self.pds_stack.last_mut() {
            *top = Some(pds);
        }
    }

    pub fn specifier_depth(&self) -> usize {
        self.pds_stack.len()
    }
}

/// Guard returned by [`Context::push_private_specifier`].
pub struct SpecifierScope<'a> {
    ctx: &'a mut Context,
    depth: usize,
}

impl Deref for SpecifierScope<'_> {
    type Target = Context;
    fn deref(&self) -> &Context {
        self.ctx
    }
}

impl DerefMut for SpecifierScope<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        self.ctx
    }
}

impl Drop for SpecifierScope<'_> {
    fn drop(&mut self) {
        self.ctx.pds_stack.truncate(self.depth);
    }
}
