use crate::checksum::ValidatedRecord;

/// Validated records in arrival order.
///
/// Unbounded: a capture session is expected to be of bounded duration.
/// Reading the records does not consume them.
#[derive(Debug, Default)]
pub struct RecordSink {
    records: Vec<ValidatedRecord>,
}

impl RecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: ValidatedRecord) {
        self.records.push(record);
    }

    /// Everything accumulated so far, oldest first.
    pub fn records(&self) -> &[ValidatedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consume the sink at teardown.
    pub fn into_records(self) -> Vec<ValidatedRecord> {
        self.records
    }
}
