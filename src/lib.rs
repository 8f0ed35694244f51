//! coremon: a per-core CPU monitor.
//!
//! The sampling engine ([`sampler`], [`scheduler`], [`system`]) produces
//! immutable [`system::Snapshot`]s on a fixed cadence or on demand and hands
//! them to a [`sink::DisplaySink`]. The terminal UI ([`app`], [`ui`],
//! [`input`]) and the line printer ([`plain`]) are the two sinks shipped
//! with the binary.

pub mod app;
pub mod color_scheme;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod plain;
pub mod sampler;
pub mod scheduler;
pub mod sink;
pub mod system;
pub mod ui;

pub use error::{Error, Result, SampleFailure};
