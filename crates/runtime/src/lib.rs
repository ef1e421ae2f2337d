//! Async host for werewolf sessions.
//!
//! This crate wires a [`werewolf_core::GameSession`] to the outside world.
//! Consumers embed [`Runtime`] to drive steps, plug in an [`InputProvider`]
//! for the controlled player, and subscribe to log entries through the
//! [`EventBus`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the broadcast bus for log entries
pub mod api;
pub mod events;
pub mod runtime;

pub use api::{
    Answer, ChannelInputProvider, InputChannel, InputProvider, InputRequest, PolicyInputProvider,
    Prompt, Result, RuntimeError, ScriptedInputProvider,
};
pub use events::EventBus;
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
