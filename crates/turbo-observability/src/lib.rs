//! Structured logging for the TurboCommerce configurator.
//!
//! This crate provides:
//! - `OperationId` - Correlation id carried by every entry of one operation
//! - `StructuredLogger` - Leveled, structured logger passed in by the caller
//! - `LogSink` - Where entries go: stderr, `tracing`, or memory for tests
//!
//! There is no global logger. Services receive a `StructuredLogger` through
//! their constructors.

mod logging;
mod operation;
mod sink;

pub use logging::*;
pub use operation::OperationId;
pub use sink::*;
