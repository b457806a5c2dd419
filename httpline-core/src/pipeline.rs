//! Pipeline composition.
//!
//! Stages are listed outermost first: the first stage sees the request first
//! and the response last. The transport is always innermost.
//!
//! ```rust,ignore
//! use httpline_core::{PipelineBuilder, stages::TracingStage};
//!
//! let pipeline = PipelineBuilder::new()
//!     .stage(TracingStage::new())
//!     .stage(retry_handler)
//!     .transport(transport)
//!     .build()?;
//!
//! let response = pipeline.send(request).await?;
//! ```

use crate::error::{ConfigurationError, Result};
use crate::message::{Request, Response};
use crate::stage::{Next, Stage, Transport};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A wired chain of stages ending in a transport.
///
/// Immutable once built; share it behind an `Arc` across any number of
/// concurrent calls.
#[derive(Clone)]
pub struct Pipeline {
    stages: Arc<[Arc<dyn Stage>]>,
    transport: Arc<dyn Transport>,
}

impl Pipeline {
    /// Send a request through every stage.
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.send_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Send a request, aborting promptly once `cancellation` fires.
    pub async fn send_with_cancellation(
        &self,
        request: Request,
        cancellation: &CancellationToken,
    ) -> Result<Response> {
        Next::new(&self.stages, self.transport.as_ref(), cancellation)
            .run(request)
            .await
    }

    /// Number of stages, not counting the transport.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline is just a transport.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names, outermost first.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Wire `stages` around `transport`.
///
/// `stages` is ordered outermost first. Wiring walks it from the innermost
/// end, attaching each stage to what has been wired so far, and fails if
/// the transport is absent, a slot is empty, or a stage instance occurs
/// twice.
pub fn compose(
    transport: Option<Arc<dyn Transport>>,
    stages: Vec<Option<Arc<dyn Stage>>>,
) -> std::result::Result<Pipeline, ConfigurationError> {
    let transport = transport.ok_or(ConfigurationError::MissingTransport)?;

    let mut wired: Vec<Arc<dyn Stage>> = Vec::with_capacity(stages.len());
    for (index, slot) in stages.into_iter().enumerate().rev() {
        let stage = slot.ok_or(ConfigurationError::NullStage { index })?;
        if wired.iter().any(|w| same_stage(w, &stage)) {
            return Err(ConfigurationError::StageReused { index });
        }
        debug!(index, stage = stage.name(), "Wiring pipeline stage");
        wired.push(stage);
    }
    wired.reverse();

    Ok(Pipeline {
        stages: wired.into(),
        transport,
    })
}

fn same_stage(a: &Arc<dyn Stage>, b: &Arc<dyn Stage>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Fluent front end for [`compose`].
#[derive(Default)]
pub struct PipelineBuilder {
    transport: Option<Arc<dyn Transport>>,
    stages: Vec<Option<Arc<dyn Stage>>>,
}

impl PipelineBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the terminal transport.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set an already shared transport.
    #[must_use]
    pub fn transport_arc(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Append a stage inside the ones added so far.
    #[must_use]
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Some(Arc::new(stage)));
        self
    }

    /// Append an already shared stage.
    #[must_use]
    pub fn stage_arc(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(Some(stage));
        self
    }

    /// Append several shared stages, outermost first.
    #[must_use]
    pub fn stages(mut self, stages: impl IntoIterator<Item = Arc<dyn Stage>>) -> Self {
        self.stages.extend(stages.into_iter().map(Some));
        self
    }

    /// Validate and wire.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigurationError> {
        compose(self.transport, self.stages)
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("has_transport", &self.transport.is_some())
            .field("stages", &self.stages.len())
            .finish()
    }
}
