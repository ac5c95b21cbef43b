//! Named worker thread spawning.
//!
//! Every long-running loop (scheduler, wake monitor, valve worker,
//! renderers) gets its own named thread with an explicit stack size so
//! it shows up in `top -H` and panic messages.

use std::io;
use std::thread::{Builder, JoinHandle};

/// Spawn `f` on a named thread with a `stack_kb` KiB stack.
pub fn spawn_named<F>(name: &str, stack_kb: usize, f: F) -> io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    log::info!("Spawning '{}' (stack={}KB)", name, stack_kb);
    Builder::new()
        .name(name.to_string())
        .stack_size(stack_kb * 1024)
        .spawn(f)
}
