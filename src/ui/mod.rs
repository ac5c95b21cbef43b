//! Renderers and their shared plumbing.
//!
//! Each renderer subscribes a tiny observer that raises a [`RenderSignal`].
//! The signal coalesces: any number of notifications between two frames
//! produce one wake-up, and the renderer reads a fresh snapshot itself.

pub mod console;
pub mod leds;
pub mod touch;
pub mod view;

use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::app::store::StateStore;

/// "Something changed" flag for one renderer.
pub type RenderSignal = Signal<CriticalSectionRawMutex, ()>;

/// Register a renderer with the store and return its wake-up signal.
pub fn subscribe_renderer(store: &StateStore) -> Arc<RenderSignal> {
    let signal = Arc::new(RenderSignal::new());
    let raised = Arc::clone(&signal);
    store.subscribe(move || raised.signal(()));
    signal
}
