// src/lib.rs
//! MPEG-TS descriptor codec: binary, XML and JSON forms of PSI/SI
//! descriptors, with context-sensitive tag resolution.

pub mod buffer;
pub mod charset;
pub mod constants;
pub mod context;
pub mod descriptor;
pub mod display;
pub mod error;
pub mod file;
pub mod io;
pub mod list;
pub mod psi;
pub mod registry;
pub mod report;
pub mod tree;
pub mod types;

pub use buffer::{ReadCursor, WriteCursor};
pub use charset::Charset;
pub use context::{Context, Standards};
pub use descriptor::Descriptor;
pub use error::{ImportReport, RegistryError, TreeError};
pub use file::DescriptorFile;
pub use list::DescriptorList;
pub use registry::Registry;
pub use tree::Element;
pub use types::{Options, OutputFormat};
