#![forbid(unsafe_code)]

//! pixconv format vocabulary.
//!
//! This crate is **contract-only**: no GL handles, no shader text. It defines the pixel
//! format catalog, texture targets, frame descriptions, caps structures and the capability
//! snapshot of a GL context. Negotiation and shader synthesis live in `pixconv-shader`;
//! execution lives in `pixconv-glow`.
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

pub mod caps;
pub mod format;
pub mod gl_caps;
pub mod info;
pub mod target;

pub use caps::{Caps, CapsStructure, MemoryKind};
pub use format::{FormatClass, FormatFlags, FormatInfo, PlaneLayout, PlaneStorage, VideoFormat};
pub use gl_caps::{GlApi, GlCapabilities, TexFormat, TexFormats};
pub use info::{ChromaSite, Colorimetry, VideoInfo};
pub use target::{TargetMask, TextureTarget};

pub use pixconv_core::ConvertError;
