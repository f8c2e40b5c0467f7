//! Byte sources and sinks the codec is fed from and writes to.
//!
//! The codec itself never performs I/O; these traits are the seam where a
//! file, a memory buffer or a network receiver plugs in.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use bytes::{BufMut, Bytes, BytesMut};

use crate::psi::section::section_length;

pub trait ByteSource {
    /// Returns the complete content of the source.
    fn read_all(&mut self) -> anyhow::Result<Bytes>;
}

pub trait ByteSink {
    fn write_all(&mut self, data: &[u8]) -> anyhow::Result<()>;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ByteSource for FileSource {
    fn read_all(&mut self) -> anyhow::Result<Bytes> {
        let data = fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        Ok(Bytes::from(data))
    }
}

/// Replaces the file content on each write.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ByteSink for FileSink {
    fn write_all(&mut self, data: &[u8]) -> anyhow::Result<()> {
        fs::write(&self.path, data).with_context(|| format!("writing {}", self.path.display()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    data: Bytes,
}

impl MemorySource {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

impl ByteSource for MemorySource {
    fn read_all(&mut self) -> anyhow::Result<Bytes> {
        Ok(self.data.clone())
    }
}

/// Accumulates everything written to it.
#[derive(Debug, Default)]
pub struct MemorySink {
    data: BytesMut,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn freeze(self) -> Bytes {
        self.data.freeze()
    }
}

impl ByteSink for MemorySink {
    fn write_all(&mut self, data: &[u8]) -> anyhow::Result<()> {
        self.data.put_slice(data);
        Ok(())
    }
}

/// Splits concatenated sections. Stops at a truncated section or at stuffing
/// (0xFF table id); the rest is returned as an error.
pub fn split_sections(data: &Bytes) -> anyhow::Result<Vec<Bytes>> {
    let mut sections = Vec::new();
    let mut pos = 0;
    while pos < data.len() && data[pos] != 0xFF {
        let len = section_length(&data[pos..])
            .map(|l| 3 + l)
            .filter(|&l| pos + l <= data.len())
            .with_context(|| format!("truncated section at offset {pos}"))?;
        sections.push(data.slice(pos..pos + len));
        pos += len;
    }
    Ok(sections)
}
