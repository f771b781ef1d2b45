//! Shared test helpers for `taskflow-core` integration tests.
//!
//! Each test file compiles its own copy, so not every helper is used
//! everywhere.
#![allow(dead_code)]

pub mod gateway;
pub mod tokens;
pub mod transport;

use std::sync::Arc;

use taskflow_common::time::MockClock;
use taskflow_core::{
    AuthenticatedTransport, ExpiryScheduler, MemoryCredentialStore, MemoryRefreshStore,
    RenewalCoordinator, SchedulePolicy, SessionController,
};
use taskflow_domain::SessionEvent;
use tokio::sync::broadcast;

pub use gateway::ScriptedGateway;
pub use tokens::{fresh_token, grant, jwt, member, NOW_MILLIS};
pub use transport::ScriptedServer;

/// Fully wired session over in-memory fakes.
pub struct Harness {
    pub gateway: Arc<ScriptedGateway>,
    pub server: Arc<ScriptedServer>,
    pub credentials: Arc<MemoryCredentialStore>,
    pub refresh: Arc<MemoryRefreshStore>,
    pub clock: Arc<MockClock>,
    pub coordinator: RenewalCoordinator,
    pub scheduler: Arc<ExpiryScheduler>,
    pub controller: SessionController,
    pub transport: Arc<AuthenticatedTransport>,
}

impl Harness {
    pub fn new(refresh: MemoryRefreshStore) -> Self {
        let gateway = Arc::new(ScriptedGateway::default());
        let server = Arc::new(ScriptedServer::default());
        let credentials = Arc::new(MemoryCredentialStore::new());
        let refresh = Arc::new(refresh);
        let clock = Arc::new(MockClock::at_epoch_millis(NOW_MILLIS));

        let coordinator = RenewalCoordinator::new(
            gateway.clone(),
            credentials.clone(),
            refresh.clone(),
            clock.clone(),
        );
        let scheduler = Arc::new(ExpiryScheduler::new(clock.clone(), SchedulePolicy::default()));
        let controller =
            SessionController::new(gateway.clone(), coordinator.clone(), scheduler.clone());
        let transport =
            Arc::new(AuthenticatedTransport::new(server.clone(), coordinator.clone()));

        Self {
            gateway,
            server,
            credentials,
            refresh,
            clock,
            coordinator,
            scheduler,
            controller,
            transport,
        }
    }

    /// Session whose refresh credential is a server-managed cookie.
    pub fn with_cookie() -> Self {
        Self::new(MemoryRefreshStore::with_cookie())
    }
}

/// Drain every event published so far.
pub fn drain(events: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}
