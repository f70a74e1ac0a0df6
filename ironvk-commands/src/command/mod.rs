//! Deferred commands.
//!
//! A command captures its arguments when it is recorded ([`set_content`]) and
//! issues the equivalent calls on a [`CommandEncoder`] when the command
//! buffer it belongs to is replayed.
//!
//! [`set_content`]: render_pass::BeginRenderPass::set_content

pub mod buffer;
pub mod encoder;
pub mod execute;
pub mod pool;
pub mod render_pass;
pub mod state;

pub use buffer::*;
pub use encoder::*;
pub use execute::*;
pub use pool::*;
pub use render_pass::*;
pub use state::*;

use downcast_rs::{Downcast, impl_downcast};
use smallvec::SmallVec;

use crate::{
    object::{ObjectRegistry, ObjectStorage},
    types::CommandBufferLevel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    BeginRenderPass,
    NextSubpass,
    EndRenderPass,
    ExecuteCommands,
    SetViewport,
    SetScissor,
    SetLineWidth,
    SetDepthBias,
    SetBlendConstants,
    SetDepthBounds,
    SetStencilCompareMask,
    SetStencilWriteMask,
    SetStencilReference,
}

/// A recorded operation.
///
/// Commands are owned by their [`CommandPool`] while unused and by a
/// [`CommandBuffer`] while recorded. [`return_to_pool`](Command::return_to_pool)
/// hands them back when the command buffer is reset.
pub trait Command: Downcast + Send {
    fn kind(&self) -> CommandKind;

    /// Issues the captured operation on the encoder of `ctx`.
    fn encode(&self, ctx: &mut EncodeContext<'_>);

    /// Puts the command back on the free list of its type pool.
    fn return_to_pool(self: Box<Self>, pool: &mut CommandPool);
}

impl_downcast!(Command);

impl std::fmt::Debug for dyn Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.kind())
    }
}

/// What a command can see of its owning command buffer while it is recorded.
#[derive(Clone, Copy)]
pub struct RecordContext<'a> {
    pub objects: &'a ObjectRegistry,
    pub level: CommandBufferLevel,
}

impl<'a> RecordContext<'a> {
    pub fn new(objects: &'a ObjectRegistry, level: CommandBufferLevel) -> Self {
        Self { objects, level }
    }
}

/// The state shared by all commands during one replay.
pub struct EncodeContext<'a> {
    encoder: &'a mut dyn CommandEncoder,
    objects: &'a ObjectRegistry,
    command_buffers: &'a ObjectStorage<CommandBuffer>,
    /// Secondary command buffers currently being replayed, outermost first.
    executing: SmallVec<[CommandBufferId; 4]>,
}

impl<'a> EncodeContext<'a> {
    pub fn new(
        encoder: &'a mut dyn CommandEncoder,
        objects: &'a ObjectRegistry,
        command_buffers: &'a ObjectStorage<CommandBuffer>,
    ) -> Self {
        Self {
            encoder,
            objects,
            command_buffers,
            executing: SmallVec::new(),
        }
    }

    #[inline]
    pub fn encoder(&mut self) -> &mut dyn CommandEncoder {
        &mut *self.encoder
    }

    #[inline]
    pub fn objects(&self) -> &'a ObjectRegistry {
        self.objects
    }

    /// Replays a secondary command buffer against the same encoder.
    ///
    /// A command buffer that is already being replayed further up is skipped.
    pub fn execute_secondary(&mut self, id: CommandBufferId) {
        if self.executing.contains(&id) {
            log::error!("Command buffer {:?} executes itself, skipping", id);
            return;
        }

        let command_buffers = self.command_buffers;
        let Some(command_buffer) = command_buffers.get(id) else {
            log::error!("Command buffer {:?} was destroyed before it was executed", id);
            return;
        };

        if command_buffer.level() != CommandBufferLevel::Secondary {
            log::warn!("Executing primary command buffer {:?} as a secondary", id);
        }

        self.encoder.execute_secondary(id);
        self.executing.push(id);
        command_buffer.encode(self);
        self.executing.pop();
    }
}
