pub mod attendance;
pub mod flow;
pub mod production;
pub mod role;
pub mod window;
