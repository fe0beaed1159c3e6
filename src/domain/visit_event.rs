//! Visit event model for asynchronous visit counting.

/// A redirect that should be counted against a short link.
///
/// Created by the redirect handler and sent over a bounded channel to
/// [`crate::application::workers::run_visit_worker`], so the redirect response
/// never waits on the store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitEvent {
    pub code: String,
}

impl VisitEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}
