pub mod aggregator;
pub mod attendance;
