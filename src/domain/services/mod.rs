pub mod categorizer;
pub mod eligibility;

pub use categorizer::{bucket_for, bucket_for_record, outcome_for, DisplayBucket, OutcomeGroup};
pub use eligibility::{evaluate, CheckInEligibility};
