//! Event System
//!
//! Callbacks for localization updates. The interception hook listens for
//! these to know cached lookups must be re-attempted.

use std::sync::Arc;

use parking_lot::RwLock;

/// Events emitted by the SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkEvent {
    /// A new artifact was installed.
    LocalizationUpdated {
        /// Release id of the installed artifact.
        artifact_id: String,
    },

    /// The installed artifact was removed (reset or app-version mismatch).
    ArtifactRemoved,
}

/// Event handler trait.
///
/// Implement this trait to receive SDK events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: SdkEvent);
}

/// Simple callback-based event handler.
pub struct CallbackHandler<F>
where
    F: Fn(SdkEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(SdkEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(SdkEvent) + Send + Sync,
{
    fn on_event(&self, event: SdkEvent) {
        (self.callback)(event);
    }
}

/// Fans events out to every registered handler.
///
/// Handlers can be added through a shared reference, so the dispatcher can
/// live inside an `Arc` next to the coordinator.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_handler(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.write().push(handler);
    }

    pub fn clear_handlers(&self) {
        self.handlers.write().clear();
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Dispatches an event to all handlers.
    pub fn dispatch(&self, event: SdkEvent) {
        // snapshot so a handler may register another handler
        let handlers = self.handlers.read().clone();
        for handler in &handlers {
            handler.on_event(event.clone());
        }
    }
}
