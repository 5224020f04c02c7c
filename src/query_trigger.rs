//! QueryTrigger (C7): a predicate over incoming reports that may force an
//! early LM cycle (§4.5).
use crate::report::Report;

pub trait QueryTrigger {
    fn name(&self) -> &str;
    fn should_query_lms(&mut self, report: &Report) -> bool;
}

/// Always returns false.
pub struct NoOpQueryTrigger {
    name: String,
}

impl NoOpQueryTrigger {
    pub fn new(name: impl Into<String>) -> Self {
        NoOpQueryTrigger { name: name.into() }
    }
}

impl QueryTrigger for NoOpQueryTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_query_lms(&mut self, _report: &Report) -> bool {
        false
    }
}

/// Wraps a user-supplied predicate.
pub struct CustomQueryTrigger {
    name: String,
    predicate: Box<dyn FnMut(&Report) -> bool>,
}

impl CustomQueryTrigger {
    pub fn new(name: impl Into<String>, predicate: Box<dyn FnMut(&Report) -> bool>) -> Self {
        CustomQueryTrigger { name: name.into(), predicate }
    }
}

impl QueryTrigger for CustomQueryTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_query_lms(&mut self, report: &Report) -> bool {
        (self.predicate)(report)
    }
}
