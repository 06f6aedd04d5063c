pub mod adapter;
pub mod kinds;

pub use adapter::LedgerView;
pub use kinds::{capabilities, KindCapabilities};
