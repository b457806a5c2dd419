//! Stage and transport traits.
//!
//! A [`Stage`] sees every request on its way out and every response on its
//! way back. It forwards work by calling [`Next::run`], which hands the
//! request to the following stage or, at the end of the chain, to the
//! [`Transport`].

use crate::error::{PipelineError, Result};
use crate::message::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Innermost element of a pipeline: performs the actual network send.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the response, which must carry the request
    /// back to the caller.
    async fn send(&self, request: Request) -> Result<Response>;
}

/// One unit in the request/response chain.
///
/// Stages are shared by every call that goes through a pipeline. Anything a
/// stage tracks for a single call must live in local variables of
/// [`Stage::handle`], never in `self`.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Process `request`, usually by calling `next.run(request)`.
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response>;

    /// Name used in logs and debug output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: Request) -> Result<Response> {
        (**self).send(request).await
    }
}

/// The remainder of a pipeline as seen from inside a stage.
///
/// `Next` is `Copy`, so a stage that needs to send more than once (a retry
/// stage, for instance) can call [`Next::run`] repeatedly.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    stages: &'a [Arc<dyn Stage>],
    transport: &'a dyn Transport,
    cancellation: &'a CancellationToken,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        stages: &'a [Arc<dyn Stage>],
        transport: &'a dyn Transport,
        cancellation: &'a CancellationToken,
    ) -> Self {
        Self {
            stages,
            transport,
            cancellation,
        }
    }

    /// Cancellation signal for the current call.
    pub fn cancellation(&self) -> &'a CancellationToken {
        self.cancellation
    }

    /// Number of stages left before the transport.
    pub fn remaining(&self) -> usize {
        self.stages.len()
    }

    /// Forward `request` down the chain.
    ///
    /// The transport send races the cancellation token; if the token fires
    /// first the in-flight send is dropped and [`PipelineError::Cancelled`]
    /// is returned.
    pub async fn run(self, request: Request) -> Result<Response> {
        if self.cancellation.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        match self.stages.split_first() {
            Some((stage, rest)) => {
                let next = Next {
                    stages: rest,
                    ..self
                };
                stage.handle(request, next).await
            }
            None => {
                tokio::select! {
                    biased;
                    _ = self.cancellation.cancelled() => Err(PipelineError::Cancelled),
                    result = self.transport.send(request) => result,
                }
            }
        }
    }
}

impl std::fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.stages.len())
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}
