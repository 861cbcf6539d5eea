pub mod config;
pub mod events;
pub mod next;
pub mod recap;
pub mod remind;
pub mod top;
