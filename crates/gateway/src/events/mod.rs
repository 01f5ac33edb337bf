//! Worker events and their dispatch table.
//!
//! Every event the gateway reacts to is routed through one `Dispatcher`,
//! a table from event kind to handler function built once at startup.
//! Handlers live in their own modules, one per operation.

pub mod activate;
pub mod fetch;
pub mod install;
pub mod notification;
pub mod push;
pub mod sync;

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::notify::Notification;

pub use fetch::{FetchRequest, GatewayResponse, Served};

/// The kinds of events the worker handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Sync,
    Push,
    NotificationClick,
}

impl EventKind {
    /// Every kind, in lifecycle order.
    pub const ALL: [EventKind; 6] = [
        EventKind::Install,
        EventKind::Activate,
        EventKind::Fetch,
        EventKind::Sync,
        EventKind::Push,
        EventKind::NotificationClick,
    ];
}

/// An event together with its payload.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Install,
    Activate,
    Fetch(FetchRequest),
    Sync { tag: String },
    Push { payload: Option<String> },
    NotificationClick { action: String },
}

impl WorkerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            WorkerEvent::Install => EventKind::Install,
            WorkerEvent::Activate => EventKind::Activate,
            WorkerEvent::Fetch(_) => EventKind::Fetch,
            WorkerEvent::Sync { .. } => EventKind::Sync,
            WorkerEvent::Push { .. } => EventKind::Push,
            WorkerEvent::NotificationClick { .. } => EventKind::NotificationClick,
        }
    }
}

/// What handling an event produced.
#[derive(Debug)]
pub enum EventOutcome {
    /// Install finished; the precache list was stored.
    Installed { precached: usize },
    /// Activation finished; stale generations were purged.
    Activated { purged: u64 },
    /// A proxied response, from cache, network, or fallback.
    Response(GatewayResponse),
    /// The sync tag was not recognized; nothing happened.
    SyncIgnored { tag: String },
    /// Queued location updates were submitted.
    Synced { submitted: usize },
    /// A notification was displayed.
    NotificationShown(Notification),
    /// Where a notification click navigates, if anywhere.
    Navigate(Option<String>),
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<EventOutcome, GatewayError>> + Send>>;
type Handler = Box<dyn Fn(Arc<Gateway>, WorkerEvent) -> HandlerFuture + Send + Sync>;

/// Table from event kind to handler function, constructed once at startup.
pub struct Dispatcher {
    handlers: HashMap<EventKind, Handler>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let mut handlers: HashMap<EventKind, Handler> = HashMap::new();

        handlers.insert(
            EventKind::Install,
            Box::new(|gateway, _event| Box::pin(async move { install::install_impl(&gateway).await })),
        );

        handlers.insert(
            EventKind::Activate,
            Box::new(|gateway, _event| Box::pin(async move { activate::activate_impl(&gateway).await })),
        );

        handlers.insert(
            EventKind::Fetch,
            Box::new(|gateway, event| {
                Box::pin(async move {
                    let WorkerEvent::Fetch(request) = event else {
                        return Err(mismatched(EventKind::Fetch));
                    };
                    fetch::fetch_impl(&gateway, request).await.map(EventOutcome::Response)
                })
            }),
        );

        handlers.insert(
            EventKind::Sync,
            Box::new(|gateway, event| {
                Box::pin(async move {
                    let WorkerEvent::Sync { tag } = event else {
                        return Err(mismatched(EventKind::Sync));
                    };
                    sync::sync_impl(&gateway, &tag).await
                })
            }),
        );

        handlers.insert(
            EventKind::Push,
            Box::new(|gateway, event| {
                Box::pin(async move {
                    let WorkerEvent::Push { payload } = event else {
                        return Err(mismatched(EventKind::Push));
                    };
                    push::push_impl(&gateway, payload).await
                })
            }),
        );

        handlers.insert(
            EventKind::NotificationClick,
            Box::new(|gateway, event| {
                Box::pin(async move {
                    let WorkerEvent::NotificationClick { action } = event else {
                        return Err(mismatched(EventKind::NotificationClick));
                    };
                    notification::click_impl(&gateway, &action).await
                })
            }),
        );

        Self { handlers }
    }

    /// Route an event to its registered handler.
    pub async fn dispatch(&self, gateway: Arc<Gateway>, event: WorkerEvent) -> Result<EventOutcome, GatewayError> {
        let kind = event.kind();
        let handler = self
            .handlers
            .get(&kind)
            .ok_or_else(|| GatewayError::InvalidRequest(format!("no handler registered for {kind:?}")))?;
        handler(gateway, event).await
    }
}

fn mismatched(kind: EventKind) -> GatewayError {
    GatewayError::InvalidRequest(format!("mismatched payload for {kind:?}"))
}
