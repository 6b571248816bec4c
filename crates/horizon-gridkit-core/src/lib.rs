//! Core systems for Horizon GridKit.
//!
//! This crate provides the foundational pieces the grid helpers are built on:
//!
//! - **Signal/Slot System**: Type-safe change notification between a grid
//!   and the components observing it
//! - **Dispatch**: Marshaling UI mutations onto the thread that owns the UI
//! - **Invocation Queue**: FIFO delivery of closures to an owning thread
//! - **Async Runtime** (`tokio` feature): Cancellable tasks and spawners
//! - **Logging**: `tracing` targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_gridkit_core::Signal;
//!
//! let focused_row_changed = Signal::<i32>::new();
//!
//! let conn_id = focused_row_changed.connect(|row| {
//!     println!("Focused row: {}", row);
//! });
//!
//! focused_row_changed.emit(4);
//! focused_row_changed.disconnect(conn_id);
//! ```
//!
//! # Dispatch Example
//!
//! ```
//! use horizon_gridkit_core::{AffinityDispatcher, Dispatcher, InvocationQueue};
//!
//! // Created on the UI thread.
//! let queue = InvocationQueue::new();
//! let dispatcher = AffinityDispatcher::new(queue.clone());
//!
//! // On the UI thread this runs immediately; from a worker it is queued
//! // until the event loop calls `queue.process_pending()`.
//! dispatcher.dispatch(Box::new(|| println!("touching a widget")));
//! queue.process_pending();
//! ```

#[cfg(feature = "tokio")]
pub mod async_runtime;
pub mod dispatch;
mod error;
pub mod invocation;
pub mod logging;
pub mod signal;

#[cfg(feature = "tokio")]
pub use async_runtime::{
    AsyncCancellationToken, AsyncRuntime, AsyncRuntimeConfig, AsyncSpawner, AsyncTaskHandle,
    RuntimeType,
};
pub use dispatch::{AffinityDispatcher, DirectDispatcher, Dispatcher, QueuedDispatcher};
pub use error::{AsyncRuntimeError, Result};
pub use invocation::{InvocationQueue, QueuedInvocation};
pub use logging::PerfSpan;
pub use signal::{ConnectionId, Signal};
