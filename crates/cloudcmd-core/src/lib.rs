//! # cloudcmd-core – generic command invocation adapter
//!
//! One adapter shape shared by every remote operation: bind named arguments
//! into an immutable context, validate the declared parameter constraints,
//! gate destructive operations behind confirmation, construct the request,
//! issue exactly one service call, and select the output.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  CommandAdapter<O>  (adapter.rs)                 │
//! │  ├── bind + hooks → BoundContext (context.rs)    │
//! │  ├── required/kind checks (descriptor.rs)        │
//! │  ├── ConfirmGate (confirm.rs)                    │
//! │  └── O::call — exactly one invocation            │
//! ├──────────────────────────────────────────────────┤
//! │  OutputSelector<R>  (select.rs)                  │
//! │  └── whole response · field · input echo         │
//! ├──────────────────────────────────────────────────┤
//! │  InvokeError  (error.rs)                         │
//! │  └── configuration · unreachable · service       │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! This crate knows nothing about any particular cloud service; operations
//! plug in through the [`ServiceOperation`] trait and carry their own static
//! [`OperationDescriptor`]. No state is retained between invocations and the
//! client handle is injected by the caller on every invocation.

pub mod adapter;
pub mod confirm;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod select;

pub use adapter::{Arguments, CommandAdapter, ContextHook, ServiceOperation};
pub use confirm::{AlwaysProceed, ConfirmGate, ConfirmImpact};
pub use context::{BoundContext, ContextBuilder};
pub use descriptor::{OperationDescriptor, ParamKind, ParamSpec};
pub use error::{InvokeError, InvokeResult};
pub use select::OutputSelector;
