//! Context-sensitive descriptor registry.
//!
//! A raw tag does not identify a descriptor on its own: tags in the private
//! range depend on the standard or the private data specifier in effect,
//! some tags are redefined inside specific tables, and a few variants are
//! selected by the first payload bytes. Each registered entry carries a
//! [`Matcher`] over all of this; resolution tries the most specific matchers
//! first and falls back to registration order between equals. Entries
//! without a matcher are reachable by tree element name only.

use std::collections::HashMap;

use log::{error, trace};
use once_cell::sync::Lazy;

use crate::context::{Context, Standards};
use crate::descriptor::{self, Descriptor, OpaqueDescriptor};
use crate::display::DisplayFn;
use crate::error::RegistryError;

pub type Factory = fn() -> Box<dyn Descriptor>;

/// Predicate over (tag, context, enclosing table, payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matcher {
    pub tag: u8,
    /// Standards that must all be active. Empty means any.
    pub standards: Standards,
    /// Private data specifier that must be in effect.
    pub private_specifier: Option<u32>,
    /// Enclosing tables the tag is valid in. Empty means any table.
    pub table_ids: &'static [u8],
    /// Leading payload bytes that must match.
    pub payload_prefix: &'static [u8],
}

impl Matcher {
    /// Matches the tag in any context.
    pub const fn tag(tag: u8) -> Self {
        Self {
            tag,
            standards: Standards::NONE,
            private_specifier: None,
            table_ids: &[],
            payload_prefix: &[],
        }
    }

    pub const fn standard(tag: u8, standards: Standards) -> Self {
        Self {
            standards,
            ..Self::tag(tag)
        }
    }

    pub const fn private(tag: u8, pds: u32) -> Self {
        Self {
            private_specifier: Some(pds),
            ..Self::tag(tag)
        }
    }

    pub const fn table_specific(tag: u8, table_ids: &'static [u8]) -> Self {
        Self {
            table_ids,
            ..Self::tag(tag)
        }
    }

    pub const fn with_payload_prefix(self, prefix: &'static [u8]) -> Self {
        Self {
            payload_prefix: prefix,
            ..self
        }
    }

    /// 0: table, specifier or payload qualified; 1: standard qualified; 2: generic.
    pub fn tier(&self) -> u8 {
        if !self.table_ids.is_empty() || self.private_specifier.is_some() || !self.payload_prefix.is_empty() {
            0
        } else if !self.standards.is_empty() {
            1
        } else {
            2
        }
    }

    pub fn accepts(&self, tag: u8, ctx: &Context, table_id: Option<u8>, payload: &[u8]) -> bool {
        tag == self.tag
            && ctx.has_standard(self.standards)
            && self
                .private_specifier
                .is_none_or(|pds| ctx.private_specifier() == Some(pds))
            && (self.table_ids.is_empty() || table_id.is_some_and(|t| self.table_ids.contains(&t)))
            && payload.starts_with(self.payload_prefix)
    }
}

pub struct Entry {
    /// `None` for entries never selected from binary data.
    pub matcher: Option<Matcher>,
    pub name: &'static str,
    pub factory: Factory,
    pub display: DisplayFn,
}

#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
    by_tag: HashMap<u8, Vec<usize>>,
    by_name: HashMap<&'static str, usize>,
}

static GLOBAL: Lazy<Registry> = Lazy::new(|| {
    Registry::with_defaults().unwrap_or_else(|e| {
        error!("built-in descriptor registration failed: {e}");
        Registry::new()
    })
});

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in descriptor.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        descriptor::register_all(&mut registry)?;
        Ok(registry)
    }

    /// Shared read-only registry with the built-in descriptors.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    pub fn register(&mut self, matcher: Matcher, factory: Factory, display: DisplayFn) -> Result<(), RegistryError> {
        let name = factory().name();
        if let Some(existing) = self.entries.iter().find(|e| e.matcher.as_ref() == Some(&matcher)) {
            return Err(RegistryError::Conflict {
                tag: matcher.tag,
                existing: existing.name,
                new: name,
            });
        }
        let tier = matcher.tier();
        let tag = matcher.tag;
        let index = self.add_entry(Some(matcher), name, factory, display)?;

        // Keep candidates sorted by (tier, registration order).
        let entries = &self.entries;
        let candidates = self.by_tag.entry(tag).or_default();
        let pos = candidates.partition_point(|&i| entries[i].matcher.as_ref().is_some_and(|m| m.tier() <= tier));
        candidates.insert(pos, index);
        Ok(())
    }

    /// Adds an entry known by its element name only. Binary data never
    /// resolves to it, but tree import and display by name do.
    pub fn register_named(&mut self, factory: Factory, display: DisplayFn) -> Result<(), RegistryError> {
        let name = factory().name();
        self.add_entry(None, name, factory, display).map(|_| ())
    }

    fn add_entry(
        &mut self,
        matcher: Option<Matcher>,
        name: &'static str,
        factory: Factory,
        display: DisplayFn,
    ) -> Result<usize, RegistryError> {
        if self.by_name.contains_key(name) || name == OpaqueDescriptor::INFO.name {
            return Err(RegistryError::DuplicateName(name));
        }
        let index = self.entries.len();
        self.entries.push(Entry {
            matcher,
            name,
            factory,
            display,
        });
        self.by_name.insert(name, index);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First accepting entry, or `None` for "opaque private data".
    pub fn resolve(&self, tag: u8, ctx: &Context, table_id: Option<u8>, payload: &[u8]) -> Option<&Entry> {
        let found = self
            .by_tag
            .get(&tag)?
            .iter()
            .map(|&i| &self.entries[i])
            .find(|e| e.matcher.as_ref().is_some_and(|m| m.accepts(tag, ctx, table_id, payload)));
        if found.is_none() {
            trace!("tag 0x{tag:02X} unresolved (standards {}, pds {:?})", ctx.standards(), ctx.private_specifier());
        }
        found
    }

    pub fn resolve_display(&self, tag: u8, ctx: &Context, table_id: Option<u8>, payload: &[u8]) -> Option<DisplayFn> {
        self.resolve(tag, ctx, table_id, payload).map(|e| e.display)
    }

    /// Instance for a binary tag: the resolved variant or the opaque fallback.
    pub fn create(&self, tag: u8, ctx: &Context, table_id: Option<u8>, payload: &[u8]) -> Box<dyn Descriptor> {
        match self.resolve(tag, ctx, table_id, payload) {
            Some(entry) => (entry.factory)(),
            None => Box::new(OpaqueDescriptor::new(tag)),
        }
    }

    pub fn by_name(&self, name: &str) -> Option<&Entry> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    /// Instance for a tree element name, including the opaque fallback.
    pub fn create_by_name(&self, name: &str) -> Option<Box<dyn Descriptor>> {
        if name == OpaqueDescriptor::INFO.name {
            return Some(Box::new(OpaqueDescriptor::default()));
        }
        self.by_name(name).map(|e| (e.factory)())
    }
}
