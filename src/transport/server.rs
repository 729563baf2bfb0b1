//! # Sidecar Server
//!
//! The receiving half of the sidecar connection. It owns the request receiver
//! and hands every request to a [`SidecarService`].

use crate::transport::channel::SidecarChannel;
use crate::transport::message::SidecarRequest;
use crate::transport::service::SidecarService;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Dispatches [`SidecarRequest`]s to a [`SidecarService`].
///
/// # Usage Pattern
///
/// 1. **Create**: `SidecarServer::new(buffer, service)` returns the server and a
///    [`SidecarChannel`].
/// 2. **Run**: spawn `server.run()` in a background task.
/// 3. **Use**: hand the channel to a [`DaprClient`](crate::DaprClient).
///
/// Requests are served concurrently, each in its own task, so a handler that
/// calls back into the sidecar (actor A invoking actor B invoking actor A)
/// cannot deadlock the loop. The loop ends once every channel handle has been
/// dropped and all in-flight requests have been answered.
pub struct SidecarServer<S: SidecarService> {
    receiver: mpsc::Receiver<SidecarRequest>,
    service: Arc<S>,
}

impl<S: SidecarService> SidecarServer<S> {
    /// Creates a server and its channel. `buffer_size` bounds the number of
    /// requests queued before callers wait for space.
    pub fn new(buffer_size: usize, service: S) -> (Self, SidecarChannel) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let server = Self {
            receiver,
            service: Arc::new(service),
        };
        (server, SidecarChannel::new(sender))
    }

    /// Shared handle to the service, e.g. to inspect its state after a test.
    pub fn service(&self) -> Arc<S> {
        self.service.clone()
    }

    /// Runs the dispatch loop until the connection closes.
    pub async fn run(mut self) {
        let service_type = std::any::type_name::<S>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(service_type, "Sidecar server started");

        let mut in_flight = JoinSet::new();
        let mut served = 0usize;

        while let Some(msg) = self.receiver.recv().await {
            let procedure = msg.procedure();
            debug!(service_type, procedure, "Request");
            served += 1;
            let service = self.service.clone();
            in_flight.spawn(async move { dispatch(service.as_ref(), msg).await });

            // Reap whatever already finished so the set does not grow unbounded.
            while let Some(joined) = in_flight.try_join_next() {
                if let Err(e) = joined {
                    warn!(service_type, error = %e, "Request task failed");
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Err(e) = joined {
                warn!(service_type, error = %e, "Request task failed");
            }
        }
        info!(service_type, served, "Shutdown");
    }
}

async fn dispatch<S: SidecarService>(service: &S, msg: SidecarRequest) {
    let procedure = msg.procedure();
    let delivered = match msg {
        SidecarRequest::BulkPublish {
            request,
            metadata,
            respond_to,
        } => respond_to
            .send(service.bulk_publish(request, &metadata).await)
            .is_ok(),
        SidecarRequest::TryLock {
            request,
            metadata,
            respond_to,
        } => respond_to
            .send(service.try_lock(request, &metadata).await)
            .is_ok(),
        SidecarRequest::Unlock {
            request,
            metadata,
            respond_to,
        } => respond_to
            .send(service.unlock(request, &metadata).await)
            .is_ok(),
        SidecarRequest::InvokeActor {
            request,
            metadata,
            respond_to,
        } => respond_to
            .send(service.invoke_actor(request, &metadata).await)
            .is_ok(),
        SidecarRequest::GetWorkflow {
            request,
            metadata,
            respond_to,
        } => respond_to
            .send(service.get_workflow(request, &metadata).await)
            .is_ok(),
    };
    if !delivered {
        debug!(procedure, "Caller went away before the response");
    }
}
