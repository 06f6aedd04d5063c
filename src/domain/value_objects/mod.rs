pub mod activity_id;
pub mod check_in_round;
pub mod contract_address;
pub mod user_address;

pub use activity_id::ActivityId;
pub use check_in_round::{CheckInRound, ROUND_SENTINEL_MIN};
pub use contract_address::ContractAddress;
pub use user_address::UserAddress;
