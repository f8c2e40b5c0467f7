//! A descriptor list bound to a context, loaded from and saved to files in
//! any of the three forms. This is the surface exposed to foreign callers:
//! every operation is a plain method returning `anyhow::Result`, with no
//! borrowed state escaping the object.

use std::path::Path;

use anyhow::Context as _;
use log::info;

use crate::buffer::ReadCursor;
use crate::context::Context;
use crate::io::{ByteSink, ByteSource, FileSink, FileSource};
use crate::list::DescriptorList;
use crate::registry::Registry;
use crate::tree::{json, xml, Element};

pub struct DescriptorFile<'r> {
    ctx: Context,
    registry: &'r Registry,
    list: DescriptorList,
}

impl DescriptorFile<'static> {
    /// Empty file using the built-in registry.
    pub fn new(ctx: Context) -> Self {
        Self::with_registry(ctx, Registry::global())
    }
}

impl<'r> DescriptorFile<'r> {
    pub fn with_registry(ctx: Context, registry: &'r Registry) -> Self {
        Self {
            ctx,
            registry,
            list: DescriptorList::new(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn list(&self) -> &DescriptorList {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut DescriptorList {
        &mut self.list
    }

    pub fn set_table_id(&mut self, table_id: Option<u8>) {
        self.list.table_id = table_id;
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Number of descriptors.
    pub fn count(&self) -> usize {
        self.list.len()
    }

    /// Number of descriptors decoded to a known type.
    pub fn typed_count(&self) -> usize {
        self.list.typed_count()
    }

    pub fn binary_size(&self) -> usize {
        self.list.total_binary_size(&self.ctx)
    }

    /// Appends the descriptors of a binary loop. Broken data is an error,
    /// but every record before a framing error is kept, undecodable ones as
    /// raw bytes.
    pub fn from_binary(&mut self, data: &[u8]) -> anyhow::Result<()> {
        let mut ctx = self.ctx.clone();
        let mut decoded = DescriptorList::new();
        decoded.table_id = self.list.table_id;
        let valid = decoded.deserialize_all(&mut ReadCursor::new(data), &mut ctx, self.registry);
        let count = decoded.len();
        self.list.append(decoded);
        if !valid {
            anyhow::bail!("invalid descriptor data, {count} descriptor(s) recovered");
        }
        Ok(())
    }

    pub fn to_binary(&self) -> Vec<u8> {
        self.list.to_bytes(&self.ctx)
    }

    pub fn read_binary(&mut self, source: &mut impl ByteSource) -> anyhow::Result<()> {
        let data = source.read_all()?;
        self.from_binary(&data)
    }

    pub fn write_binary(&self, sink: &mut impl ByteSink) -> anyhow::Result<()> {
        sink.write_all(&self.to_binary())
    }

    pub fn load_binary(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        self.read_binary(&mut FileSource::new(path))
            .with_context(|| format!("loading {}", path.display()))?;
        info!("{}: {} descriptors", path.display(), self.count());
        Ok(())
    }

    pub fn save_binary(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        self.write_binary(&mut FileSink::new(path))
    }

    pub fn to_tree(&self) -> Element {
        self.list.to_tree(&self.ctx)
    }

    /// Appends the descriptors of a tree. Elements that fail to import are
    /// reported in the error; the others are kept.
    pub fn from_tree(&mut self, root: &Element) -> anyhow::Result<()> {
        match DescriptorList::from_tree(root, &self.ctx, self.registry) {
            Ok(list) => {
                self.list.append(list);
                Ok(())
            }
            Err(mut report) => {
                let imported = std::mem::take(&mut report.imported);
                self.list.append(imported);
                Err(report.into())
            }
        }
    }

    pub fn to_xml(&self) -> anyhow::Result<String> {
        Ok(xml::to_string(&self.to_tree())?)
    }

    pub fn from_xml(&mut self, text: &str) -> anyhow::Result<()> {
        let root = xml::parse(text)?;
        self.from_tree(&root)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(json::to_string(&self.to_tree())?)
    }

    pub fn from_json(&mut self, text: &str) -> anyhow::Result<()> {
        let root = json::parse(text)?;
        self.from_tree(&root)
    }

    pub fn load_xml(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let text = read_text(path.as_ref())?;
        self.from_xml(&text)
            .with_context(|| format!("importing {}", path.as_ref().display()))
    }

    pub fn save_xml(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        FileSink::new(path).write_all(self.to_xml()?.as_bytes())
    }

    pub fn load_json(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let text = read_text(path.as_ref())?;
        self.from_json(&text)
            .with_context(|| format!("importing {}", path.as_ref().display()))
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        FileSink::new(path).write_all(self.to_json()?.as_bytes())
    }
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    let data = FileSource::new(path).read_all()?;
    String::from_utf8(data.to_vec()).with_context(|| format!("{} is not UTF-8 text", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Standards;

    const LOOP: [u8; 9] = [0xDE, 0x01, 0xA9, 0x5F, 0x04, 0x00, 0x00, 0x00, 0x28];

    #[test]
    fn counts_and_forms() {
        let mut file = DescriptorFile::new(Context::new(Standards::ISDB));
        file.from_binary(&LOOP).unwrap();
        assert_eq!(file.count(), 2);
        assert_eq!(file.typed_count(), 2);
        assert_eq!(file.binary_size(), LOOP.len());

        let xml = file.to_xml().unwrap();
        let json = file.to_json().unwrap();
        let mut from_xml = DescriptorFile::new(Context::new(Standards::ISDB));
        from_xml.from_xml(&xml).unwrap();
        let mut from_json = DescriptorFile::new(Context::new(Standards::ISDB));
        from_json.from_json(&json).unwrap();
        assert_eq!(from_xml.to_binary(), LOOP);
        assert_eq!(from_json.to_binary(), LOOP);

        file.clear();
        assert_eq!(file.count(), 0);
        assert_eq!(file.binary_size(), 0);
    }

    #[test]
    fn without_isdb_tags_stay_opaque() {
        let mut file = DescriptorFile::new(Context::new(Standards::DVB));
        file.from_binary(&LOOP).unwrap();
        assert_eq!(file.typed_count(), 1);
        assert_eq!(file.to_binary(), LOOP);
    }

    #[test]
    fn partial_import_keeps_good_elements() {
        let mut file = DescriptorFile::new(Context::default());
        let text = r#"<?xml version="1.0"?>
<descriptor_list>
  <private_data_specifier_descriptor private_data_specifier="0x28"/>
  <bogus/>
</descriptor_list>"#;
        let err = file.from_xml(text).unwrap_err();
        assert!(err.to_string().contains("1 descriptor(s) failed"));
        assert_eq!(file.count(), 1);
    }

    #[test]
    fn broken_binary_reported() {
        let mut file = DescriptorFile::new(Context::default());
        assert!(file.from_binary(&LOOP[3..8]).is_err());
        assert_eq!(file.count(), 0);
    }
}
