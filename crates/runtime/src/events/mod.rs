//! Broadcast of session log entries to observers.

mod bus;

pub use bus::EventBus;
