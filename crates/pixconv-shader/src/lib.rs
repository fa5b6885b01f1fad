#![forbid(unsafe_code)]

//! Backend-agnostic conversion algorithms.
//!
//! Everything here is pure computation over the format catalog and a capability snapshot:
//! caps negotiation and fixation, swizzles, color matrices, body selection, GLSL assembly
//! and mangling. Nothing touches a GL context; `pixconv-glow` executes what this crate plans.
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]

pub mod assemble;
pub mod body;
pub mod color_matrix;
pub mod mangle;
pub mod negotiate;
pub mod plan;
pub mod swizzle;
pub mod templates;
pub mod uniform;

pub use assemble::{ShaderSources, ATTRIBUTE_BINDINGS, INDICES, VERTICES};
pub use body::{BodyRequest, BodySelection};
pub use color_matrix::{ColorMatrix, MatrixDirection};
pub use mangle::{GlslProfile, GlslVersion, ShaderStage};
pub use negotiate::{
    fixate, fixate_caps, negotiate_caps, supported_formats, transform_caps, Candidate, Fixation,
};
pub use plan::{plane_tex_formats, ConversionPlan};
pub use swizzle::Swizzle;
pub use uniform::{Uniform, UniformValue};

pub use pixconv_core::ConvertError;
