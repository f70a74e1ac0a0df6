//! Deferred command recording for a Vulkan translation layer.
//!
//! Commands are recorded into a [`CommandBuffer`](command::CommandBuffer) as
//! pooled objects and replayed later against a native
//! [`CommandEncoder`](command::CommandEncoder).

pub mod command;
pub mod error;
pub mod object;
pub mod pooled_vec;
pub mod types;

mod macros;

#[cfg(test)]
mod testing;

pub use error::{CommandError, CommandResult};
