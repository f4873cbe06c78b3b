//! Named worker threads for blocking device I/O.
//!
//! The executor is single-threaded, so anything that can block for a
//! noticeable time (the 1-Wire probe conversion takes ~750 ms) runs on its
//! own OS thread and talks to the executor over `embassy-sync` channels.

use std::io;
use std::thread::JoinHandle;

/// Spawn a named thread with an explicit stack size.
pub fn spawn_worker(
    name: &'static str,
    stack_kb: usize,
    f: impl FnOnce() + Send + 'static,
) -> io::Result<JoinHandle<()>> {
    log::info!("Spawning '{}' (stack={}KB)", name, stack_kb);

    std::thread::Builder::new()
        .name(name.into())
        .stack_size(stack_kb * 1024)
        .spawn(f)
}
