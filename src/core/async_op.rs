//! Unit of work carried by the async ring buffer

use super::{log_record::LogRecord, sink_manager::SinkManager};
use std::sync::Arc;

/// A record plus the sink manager that will dispatch it
///
/// The sink manager is reference counted because the producer that built
/// the envelope and the worker thread that consumes it have overlapping
/// lifetimes.
#[derive(Debug)]
pub struct AsyncOp {
    pub record: LogRecord,
    pub sink_manager: Arc<SinkManager>,
}

impl AsyncOp {
    pub fn new(record: LogRecord, sink_manager: Arc<SinkManager>) -> Self {
        Self {
            record,
            sink_manager,
        }
    }

    /// Hand the record to its sink manager
    pub fn execute(self) {
        let AsyncOp {
            record,
            sink_manager,
        } = self;
        sink_manager.dispatch(record);
    }
}
