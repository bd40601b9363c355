use serde::Serialize;

use super::domain::{PatientRequest, Urgency};

/// Pending-queue counters for the dashboard KPI cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueSummary {
    pub pending: usize,
    pub high_urgency: usize,
    pub medium_urgency: usize,
    pub low_urgency: usize,
}

impl QueueSummary {
    pub fn from_requests(requests: &[PatientRequest]) -> Self {
        let mut summary = Self::default();
        for request in requests {
            summary.pending += 1;
            match request.urgency {
                Urgency::High => summary.high_urgency += 1,
                Urgency::Medium => summary.medium_urgency += 1,
                Urgency::Low => summary.low_urgency += 1,
            }
        }
        summary
    }
}
