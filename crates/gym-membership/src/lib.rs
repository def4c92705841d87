pub mod datetime;
pub mod validation;

pub mod members;
pub mod trainers;
pub mod payments;
pub mod attendance;
pub mod reports;
