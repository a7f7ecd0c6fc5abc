//! Milestone progress seam
//!
//! The scripted-battle check reads story milestone completion from whatever
//! progress tracker the embedding agent maintains. The battle core only
//! ever reads; absence of data means "unknown" and classification proceeds
//! normally.

use std::collections::HashMap;

/// Read-only view of story milestone completion
pub trait MilestoneProgress {
    /// Whether the named milestone has been completed, or `None` when the
    /// tracker has no data for it
    fn is_complete(&self, milestone: &str) -> Option<bool>;
}

/// Progress source with no data; every battle classifies normally
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl MilestoneProgress for NoProgress {
    fn is_complete(&self, _milestone: &str) -> Option<bool> {
        None
    }
}

impl MilestoneProgress for HashMap<String, bool> {
    fn is_complete(&self, milestone: &str) -> Option<bool> {
        self.get(milestone).copied()
    }
}
