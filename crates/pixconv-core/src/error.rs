use std::fmt;
use std::path::PathBuf;

/// Errors shared by every pixconv crate.
///
/// Contract rule: this type lives in `pixconv-core` and is re-exported by the backends.
#[derive(Debug)]
pub enum ConvertError {
    // ---- Config (SDK-level) ----
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    InvalidConfig {
        path: PathBuf,
        msg: String,
    },

    // ---- Negotiation / selection ----
    UnknownFormat(String),
    InvalidCaps(String),
    UnsupportedFormatPair {
        input: String,
        output: String,
    },
    IncompatibleCapability {
        input: String,
        output: String,
        reason: String,
    },

    // ---- Runtime-facing (backend) ----
    VertexCompile(String),
    FragmentCompile(String),
    Link(String),
    ResourceAcquisition(String),
    Context(String),

    // ---- Fallback ----
    Other(String),
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedFormatPair,
    IncompatibleCapability,
    ShaderCompileOrLink,
    ResourceAcquisition,
    InvalidInput,
    Config,
    Other,
}

impl ConvertError {
    pub fn other<T: Into<String>>(s: T) -> Self {
        ConvertError::Other(s.into())
    }

    pub fn unsupported(input: impl fmt::Display, output: impl fmt::Display) -> Self {
        ConvertError::UnsupportedFormatPair {
            input: input.to_string(),
            output: output.to_string(),
        }
    }

    pub fn incompatible(
        input: impl fmt::Display,
        output: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        ConvertError::IncompatibleCapability {
            input: input.to_string(),
            output: output.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::Io { .. }
            | ConvertError::Json { .. }
            | ConvertError::InvalidConfig { .. } => ErrorKind::Config,
            ConvertError::UnknownFormat(_) | ConvertError::InvalidCaps(_) => {
                ErrorKind::InvalidInput
            }
            ConvertError::UnsupportedFormatPair { .. } => ErrorKind::UnsupportedFormatPair,
            ConvertError::IncompatibleCapability { .. } => ErrorKind::IncompatibleCapability,
            ConvertError::VertexCompile(_)
            | ConvertError::FragmentCompile(_)
            | ConvertError::Link(_) => ErrorKind::ShaderCompileOrLink,
            ConvertError::ResourceAcquisition(_) | ConvertError::Context(_) => {
                ErrorKind::ResourceAcquisition
            }
            ConvertError::Other(_) => ErrorKind::Other,
        }
    }

    /// Resource failures may succeed on a later frame; everything else is fatal for the
    /// current format pair.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ConvertError::ResourceAcquisition(_) | ConvertError::Context(_)
        )
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Io { path, source } => {
                write!(f, "io error at {}: {}", path.display(), source)
            }
            ConvertError::Json { path, source } => {
                write!(f, "json parse error at {}: {}", path.display(), source)
            }
            ConvertError::InvalidConfig { path, msg } => {
                write!(f, "invalid config at {}: {}", path.display(), msg)
            }

            ConvertError::UnknownFormat(name) => write!(f, "unknown video format: {name}"),
            ConvertError::InvalidCaps(msg) => write!(f, "invalid caps: {msg}"),
            ConvertError::UnsupportedFormatPair { input, output } => {
                write!(f, "unsupported conversion from {input} to {output}")
            }
            ConvertError::IncompatibleCapability {
                input,
                output,
                reason,
            } => write!(
                f,
                "conversion from {input} to {output} is incompatible with the context: {reason}"
            ),

            ConvertError::VertexCompile(msg) => write!(f, "vertex shader compile error: {msg}"),
            ConvertError::FragmentCompile(msg) => write!(f, "fragment shader compile error: {msg}"),
            ConvertError::Link(msg) => write!(f, "program link error: {msg}"),
            ConvertError::ResourceAcquisition(msg) => {
                write!(f, "backend object creation failed: {msg}")
            }
            ConvertError::Context(msg) => write!(f, "gl context unavailable: {msg}"),

            ConvertError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::Io { source, .. } => Some(source),
            ConvertError::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_failures_share_a_kind() {
        for e in [
            ConvertError::VertexCompile("v".into()),
            ConvertError::FragmentCompile("f".into()),
            ConvertError::Link("l".into()),
        ] {
            assert_eq!(e.kind(), ErrorKind::ShaderCompileOrLink);
            assert!(!e.is_transient());
        }
    }

    #[test]
    fn compile_log_is_kept_verbatim() {
        let log = "0:12(3): error: `foo' undeclared";
        let e = ConvertError::FragmentCompile(log.to_string());
        assert!(e.to_string().ends_with(log));
    }

    #[test]
    fn resource_errors_are_transient() {
        assert!(ConvertError::ResourceAcquisition("fbo".into()).is_transient());
        assert!(ConvertError::Context("gone".into()).is_transient());
        assert!(!ConvertError::unsupported("AYUV", "I420").is_transient());
    }

    #[test]
    fn incompatible_message_names_both_formats() {
        let e = ConvertError::incompatible("RGBA", "I420", "draw buffers unavailable");
        let s = e.to_string();
        assert!(s.contains("RGBA") && s.contains("I420") && s.contains("draw buffers"));
        assert_eq!(e.kind(), ErrorKind::IncompatibleCapability);
    }
}
