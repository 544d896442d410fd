pub mod access;
pub mod attendance;
pub mod calculator;
pub mod flow;
pub mod production;
pub mod workflow;
