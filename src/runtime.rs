// SPDX-License-Identifier: MPL-2.0

//! Shared async runtime for all network operations.
//!
//! The command-line front end is synchronous; every request it makes goes
//! through this single runtime instead of building one per call.

use once_cell::sync::Lazy;
use std::future::Future;
use tokio::runtime::Runtime;

/// Two workers are plenty for request/response traffic against one backend.
static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name("pollboard-async")
        .build()
        .expect("failed to create async runtime")
});

/// Execute a future on the shared runtime, blocking until completion.
pub fn block_on<F: Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}
