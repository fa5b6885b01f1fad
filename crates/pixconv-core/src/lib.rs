#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

pub mod config;
pub mod error;

// ---- Stable re-exports ----
pub use error::{ConvertError, ErrorKind};

pub use config::{load_typed_json, ContextProfile, PixconvConfig};
