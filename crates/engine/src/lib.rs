//! Dispatch engine: turns "send this notification to these recipients" into a delivery report.

pub mod dispatcher;

pub use dispatcher::Dispatcher;
