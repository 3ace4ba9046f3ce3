//! Delivery channels for automatically emitted reports

use std::cell::RefCell;
use std::rc::Rc;

/// Fire-and-forget destination for a rendered report
pub trait ReportSink {
    fn deliver(&self, text: &str);
}

/// Prints reports to stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl ReportSink for StderrSink {
    fn deliver(&self, text: &str) {
        eprintln!("{}", text);
    }
}

/// Emits reports as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn deliver(&self, text: &str) {
        tracing::info!(target: "tickprof::report", "{}", text);
    }
}

/// Keeps delivered reports; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct MemorySink(Rc<RefCell<Vec<String>>>);

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl ReportSink for MemorySink {
    fn deliver(&self, text: &str) {
        self.0.borrow_mut().push(text.to_string());
    }
}
