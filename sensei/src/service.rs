//! Runs service calls off the main loop.
//!
//! Each call is a spawned tokio task that owns a clone of the service handle
//! and reports back on the event bus with the ticket it was started with.
//! The main loop never awaits the network.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use sensei_core::client::ReviewService;
use sensei_core::conversation::PendingChat;
use sensei_core::types::FeedbackRequest;
use sensei_core::PendingAnalysis;

use crate::event::AppEvent;

#[derive(Clone)]
pub struct ServiceDispatcher {
    service: Arc<dyn ReviewService>,
    tx: UnboundedSender<AppEvent>,
}

impl ServiceDispatcher {
    pub fn new(service: Arc<dyn ReviewService>, tx: UnboundedSender<AppEvent>) -> Self {
        Self { service, tx }
    }

    pub fn analyze(&self, pending: PendingAnalysis) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = service.analyze(&pending.request).await;
            let _ = tx.send(AppEvent::AnalysisFinished { pending, outcome });
        });
    }

    pub fn chat(&self, pending: PendingChat) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = service.chat(&pending.request).await;
            let _ = tx.send(AppEvent::ChatFinished { pending, outcome });
        });
    }

    /// Fire and forget. Failures are logged and go no further.
    pub fn feedback(&self, request: FeedbackRequest) {
        let service = Arc::clone(&self.service);
        tokio::spawn(async move {
            match service.feedback(&request).await {
                Ok(()) => tracing::debug!(function = %request.function_name, "feedback sent"),
                Err(e) => tracing::warn!(error = %e, function = %request.function_name, "feedback failed"),
            }
        });
    }
}
