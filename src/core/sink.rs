//! Report sinks: where each tick's StatusReport goes
//!
//! Renderers, the CSV logger and the live API hub all implement
//! `ReportSink`. `SinkSet` fans one report out to several sinks.

use std::collections::VecDeque;

use crate::types::{InputKey, StatusReport};

/// Consumer of status reports
pub trait ReportSink {
    /// Called once per tick with the fresh report
    fn publish(&mut self, report: &StatusReport);

    /// Screen navigation key (Up/Down/Left/Right)
    fn navigate(&mut self, _key: InputKey) {}

    /// Called once when the loop exits
    fn finish(&mut self) {}
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn publish(&mut self, report: &StatusReport) {
        (**self).publish(report)
    }
    fn navigate(&mut self, key: InputKey) {
        (**self).navigate(key)
    }
    fn finish(&mut self) {
        (**self).finish()
    }
}

/// Fan-out to several sinks, in insertion order
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn ReportSink + Send>>,
}

impl SinkSet {
    /// Create empty
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink
    pub fn push(&mut self, sink: impl ReportSink + Send + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Number of sinks
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ReportSink for SinkSet {
    fn publish(&mut self, report: &StatusReport) {
        for sink in &mut self.sinks {
            sink.publish(report);
        }
    }

    fn navigate(&mut self, key: InputKey) {
        for sink in &mut self.sinks {
            sink.navigate(key);
        }
    }

    fn finish(&mut self) {
        for sink in &mut self.sinks {
            sink.finish();
        }
    }
}

/// Keeps the most recent reports in memory
#[derive(Debug, Clone)]
pub struct MemorySink {
    reports: VecDeque<StatusReport>,
    keys: Vec<InputKey>,
    capacity: usize,
    finished: bool,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::with_capacity(usize::MAX)
    }
}

impl MemorySink {
    /// Unbounded sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink keeping at most `capacity` reports
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            reports: VecDeque::new(),
            keys: Vec::new(),
            capacity: capacity.max(1),
            finished: false,
        }
    }

    /// Stored reports, oldest first
    pub fn reports(&self) -> impl Iterator<Item = &StatusReport> {
        self.reports.iter()
    }

    /// Most recent report
    pub fn last(&self) -> Option<&StatusReport> {
        self.reports.back()
    }

    /// Stored report count
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Navigation keys received
    pub fn keys(&self) -> &[InputKey] {
        &self.keys
    }

    /// Was `finish` called?
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl ReportSink for MemorySink {
    fn publish(&mut self, report: &StatusReport) {
        if self.reports.len() == self.capacity {
            self.reports.pop_front();
        }
        self.reports.push_back(report.clone());
    }

    fn navigate(&mut self, key: InputKey) {
        self.keys.push(key);
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ClockSession;

    #[test]
    fn test_memory_sink_capacity() {
        let session = ClockSession::default();
        let report = session.current_report();
        let mut sink = MemorySink::with_capacity(2);
        for _ in 0..5 {
            sink.publish(&report);
        }
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_sink_set_fans_out() {
        let session = ClockSession::default();
        let report = session.current_report();
        let mut set = SinkSet::new();
        set.push(MemorySink::new());
        set.push(MemorySink::new());
        set.publish(&report);
        set.navigate(InputKey::Right);
        set.finish();
        assert_eq!(set.len(), 2);
    }
}
