// Lock metrics
// Counters published through the `metrics` facade; the host application installs the exporter

use metrics::{counter, describe_counter};

use crate::lock::{AcquireOutcome, ReleaseOutcome};

pub const ACQUIRE_TOTAL: &str = "kvlock_acquire_total";
pub const RELEASE_TOTAL: &str = "kvlock_release_total";

/// Register metric descriptions
/// Should be called once at application startup
pub fn describe_metrics() {
    describe_counter!(
        ACQUIRE_TOTAL,
        "Total number of lock acquisition attempts by outcome"
    );
    describe_counter!(RELEASE_TOTAL, "Total number of lock releases by outcome");
}

pub(crate) fn record_acquire(outcome: &AcquireOutcome) {
    counter!(ACQUIRE_TOTAL, "outcome" => outcome.as_label()).increment(1);
}

pub(crate) fn record_release(outcome: &ReleaseOutcome) {
    counter!(RELEASE_TOTAL, "outcome" => outcome.as_label()).increment(1);
}
