//! The thread that owns a GL context, and the hand-off onto it.
//!
//! GL state is bound to one thread. Everything that touches it is packaged as a job, sent to
//! that thread, and waited for: one conversion is one synchronous round-trip.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};

use glow::HasContext;
use pixconv_core::ConvertError;
use pixconv_format::{GlApi, GlCapabilities};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("context thread is not running")]
    Unavailable,
    #[error("failed to spawn context thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("context creation failed: {0}")]
    Init(String),
    #[error("job panicked on the context thread")]
    JobPanicked,
}

impl From<ContextError> for ConvertError {
    fn from(e: ContextError) -> Self {
        ConvertError::Context(e.to_string())
    }
}

/// Work to run against the device on its own thread.
pub type Job<D> = Box<dyn FnOnce(&D) + Send + 'static>;

/// A GL context reachable from any thread.
pub trait GlContext: Send + Sync {
    type Device;

    /// Capability snapshot taken when the context was created.
    fn capabilities(&self) -> &GlCapabilities;

    /// Runs `job` on the context thread and returns once it has finished.
    fn dispatch(&self, job: Job<Self::Device>) -> Result<(), ContextError>;

    /// Typed submit-and-wait on top of [`GlContext::dispatch`].
    fn run<R, F>(&self, f: F) -> Result<R, ContextError>
    where
        Self: Sized,
        R: Send + 'static,
        F: FnOnce(&Self::Device) -> R + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        self.dispatch(Box::new(move |device| {
            let _ = tx.send(f(device));
        }))?;
        rx.recv().map_err(|_| ContextError::JobPanicked)
    }
}

enum Message<G> {
    Job(Job<G>, mpsc::Sender<Result<(), ContextError>>),
    Shutdown,
}

/// A worker thread owning device `G`.
pub struct GlThread<G> {
    tx: mpsc::Sender<Message<G>>,
    caps: GlCapabilities,
    handle: Option<JoinHandle<()>>,
}

impl<G> std::fmt::Debug for GlThread<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlThread")
            .field("caps", &self.caps)
            .field("running", &self.handle.is_some())
            .finish()
    }
}

impl<G: 'static> GlThread<G> {
    /// Spawns the thread and builds the device on it with `factory`.
    ///
    /// `factory` also reports the capability snapshot; see [`capabilities_from_gl`] for a
    /// `glow::Context`.
    pub fn spawn<F>(factory: F) -> Result<Self, ContextError>
    where
        F: FnOnce() -> Result<(G, GlCapabilities), String> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Message<G>>();
        let (init_tx, init_rx) = mpsc::channel::<Result<GlCapabilities, String>>();

        let handle = thread::Builder::new()
            .name("pixconv-gl".into())
            .spawn(move || {
                let device = match factory() {
                    Ok((device, caps)) => {
                        let _ = init_tx.send(Ok(caps));
                        device
                    }
                    Err(e) => {
                        let _ = init_tx.send(Err(e));
                        return;
                    }
                };
                while let Ok(msg) = rx.recv() {
                    match msg {
                        Message::Job(job, reply) => {
                            let res = panic::catch_unwind(AssertUnwindSafe(|| job(&device)))
                                .map_err(|_| {
                                    error!("job panicked on the context thread");
                                    ContextError::JobPanicked
                                });
                            let _ = reply.send(res);
                        }
                        Message::Shutdown => break,
                    }
                }
                debug!("context thread exiting");
            })
            .map_err(ContextError::Spawn)?;

        let caps = match init_rx.recv() {
            Ok(Ok(caps)) => caps,
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(ContextError::Init(e));
            }
            Err(_) => {
                let _ = handle.join();
                return Err(ContextError::Init(
                    "context thread exited during initialisation".into(),
                ));
            }
        };
        debug!(
            "context thread up: {:?} {}.{}",
            caps.api, caps.major, caps.minor
        );

        Ok(Self {
            tx,
            caps,
            handle: Some(handle),
        })
    }
}

impl<G: 'static> GlContext for GlThread<G> {
    type Device = G;

    fn capabilities(&self) -> &GlCapabilities {
        &self.caps
    }

    fn dispatch(&self, job: Job<G>) -> Result<(), ContextError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Message::Job(job, reply_tx))
            .map_err(|_| ContextError::Unavailable)?;
        reply_rx.recv().map_err(|_| ContextError::Unavailable)?
    }
}

impl<G> Drop for GlThread<G> {
    fn drop(&mut self) {
        let _ = self.tx.send(Message::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A context that reports capabilities but has no thread behind it.
///
/// Planning and validation work against it; any GL work fails with
/// [`ContextError::Unavailable`].
#[derive(Debug, Clone)]
pub struct HeadlessContext {
    caps: GlCapabilities,
}

impl HeadlessContext {
    pub fn new(caps: GlCapabilities) -> Self {
        Self { caps }
    }
}

impl GlContext for HeadlessContext {
    type Device = glow::Context;

    fn capabilities(&self) -> &GlCapabilities {
        &self.caps
    }

    fn dispatch(&self, _job: Job<glow::Context>) -> Result<(), ContextError> {
        Err(ContextError::Unavailable)
    }
}

/// Which API a reported version belongs to.
pub fn api_for_version(is_embedded: bool, major: u32, minor: u32, core_profile: bool) -> GlApi {
    if is_embedded {
        GlApi::Gles2
    } else if (major, minor) >= (3, 2) && core_profile {
        GlApi::Gl3
    } else {
        GlApi::Gl
    }
}

/// Queries the capability snapshot of a live context. Must run on its thread.
pub unsafe fn capabilities_from_gl(gl: &glow::Context) -> GlCapabilities {
    let version = gl.version();
    let (major, minor) = (version.major, version.minor);
    let core_profile = !version.is_embedded
        && (major, minor) >= (3, 2)
        && (gl.get_parameter_i32(glow::CONTEXT_PROFILE_MASK)
            & glow::CONTEXT_CORE_PROFILE_BIT as i32)
            != 0;
    let api = api_for_version(version.is_embedded, major, minor, core_profile);

    let mut extensions: Vec<String> = gl.supported_extensions().iter().cloned().collect();
    extensions.sort();

    GlCapabilities::new(api, major, minor, extensions)
}
