use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::backend::DiagramBackend;
use crate::normalize::normalize_svg;

/// What the diagram panel currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DiagramState {
    /// Nothing to draw. Terminal for blank sources.
    Empty,
    Rendering {
        request: u64,
    },
    Rendered {
        request: u64,
        svg: String,
    },
    /// The source is kept so it can still be shown and copied as text.
    Failed {
        request: u64,
        source: String,
        message: String,
    },
}

impl DiagramState {
    pub fn fallback_text(&self) -> Option<&str> {
        match self {
            Self::Failed { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn visible_svg(&self) -> Option<&str> {
        match self {
            Self::Rendered { svg, .. } => Some(svg),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, Self::Rendering { .. })
    }
}

/// How a single render request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Empty,
    Rendered,
    Failed,
    /// A newer request (or a detach) arrived first; nothing was committed.
    Superseded,
}

#[derive(Debug)]
struct Surface {
    latest: u64,
    state: DiagramState,
}

/// Renders diagram sources into a single visible surface.
///
/// Requests are numbered when [`render`](Self::render) is called, not when
/// the returned future is first polled. Only the most recently dispatched
/// request may commit, so a slow render that finishes after a newer one is
/// dropped.
#[derive(Clone)]
pub struct DiagramRenderer {
    backend: Arc<dyn DiagramBackend>,
    surface: Arc<Mutex<Surface>>,
}

impl DiagramRenderer {
    pub fn new(backend: Arc<dyn DiagramBackend>) -> Self {
        Self {
            backend,
            surface: Arc::new(Mutex::new(Surface {
                latest: 0,
                state: DiagramState::Empty,
            })),
        }
    }

    pub fn with_backend<B: DiagramBackend + 'static>(backend: B) -> Self {
        Self::new(Arc::new(backend))
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn state(&self) -> DiagramState {
        self.lock().state.clone()
    }

    pub fn latest_request(&self) -> u64 {
        self.lock().latest
    }

    /// Dispatch a render of `source`.
    ///
    /// The surface is cleared before this returns. The future resolves once
    /// the backend finishes and reports whether its result was committed.
    /// Dropping the future unfinished resets the surface to `Empty` if the
    /// request is still the latest.
    pub fn render(
        &self,
        source: impl Into<String>,
    ) -> impl Future<Output = RenderOutcome> + Send + 'static {
        let source = source.into();
        let blank = source.trim().is_empty();

        let request = {
            let mut surface = self.lock();
            surface.latest += 1;
            let request = surface.latest;
            surface.state = if blank {
                DiagramState::Empty
            } else {
                DiagramState::Rendering { request }
            };
            request
        };

        let backend = Arc::clone(&self.backend);
        let pending = PendingRender {
            surface: Arc::clone(&self.surface),
            request,
        };

        async move {
            if blank {
                return RenderOutcome::Empty;
            }

            let result = AssertUnwindSafe(backend.render(&source))
                .catch_unwind()
                .await;

            let next = match result {
                Ok(Ok(svg)) => DiagramState::Rendered {
                    request,
                    svg: normalize_svg(&svg),
                },
                Ok(Err(err)) => {
                    log::warn!("Diagram request {request} failed: {err}");
                    DiagramState::Failed {
                        request,
                        source,
                        message: err.to_string(),
                    }
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    log::warn!("Diagram backend {} panicked: {message}", backend.name());
                    DiagramState::Failed {
                        request,
                        source,
                        message,
                    }
                }
            };

            commit(&pending.surface, request, next)
        }
    }

    /// Invalidate every in-flight request and clear the surface.
    pub fn detach(&self) {
        let mut surface = self.lock();
        surface.latest += 1;
        surface.state = DiagramState::Empty;
    }

    fn lock(&self) -> MutexGuard<'_, Surface> {
        self.surface.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for DiagramRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagramRenderer")
            .field("backend", &self.backend.name())
            .field("surface", &*self.lock())
            .finish()
    }
}

/// Owned by an in-flight render. Dropped before its commit, it clears a
/// surface still showing its `Rendering` state.
struct PendingRender {
    surface: Arc<Mutex<Surface>>,
    request: u64,
}

impl Drop for PendingRender {
    fn drop(&mut self) {
        let mut surface = self.surface.lock().unwrap_or_else(PoisonError::into_inner);
        if surface.latest == self.request
            && matches!(surface.state, DiagramState::Rendering { request } if request == self.request)
        {
            log::debug!("Diagram request {} abandoned", self.request);
            surface.state = DiagramState::Empty;
        }
    }
}

fn commit(surface: &Mutex<Surface>, request: u64, next: DiagramState) -> RenderOutcome {
    let mut surface = surface.lock().unwrap_or_else(PoisonError::into_inner);
    if surface.latest != request {
        log::debug!(
            "Dropping diagram request {request}, latest is {}",
            surface.latest
        );
        return RenderOutcome::Superseded;
    }
    let outcome = match &next {
        DiagramState::Rendered { .. } => RenderOutcome::Rendered,
        DiagramState::Failed { .. } => RenderOutcome::Failed,
        DiagramState::Empty | DiagramState::Rendering { .. } => RenderOutcome::Empty,
    };
    surface.state = next;
    outcome
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "renderer panicked".to_string()
    }
}
