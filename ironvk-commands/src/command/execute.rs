use crate::{
    command::{
        Command, CommandBufferId, CommandKind, CommandPool, EncodeContext, PooledCommand,
        RecordContext,
    },
    error::CommandResult,
    pooled_vec::PooledVec,
    types::CommandBufferLevel,
};

/// Executes secondary command buffers from within a primary command buffer.
///
/// The referenced command buffers are replayed in order, each one in full,
/// when this command is encoded.
#[derive(Debug, Default)]
pub struct ExecuteCommands<const N: usize> {
    command_buffers: PooledVec<CommandBufferId, N>,
}

impl<const N: usize> ExecuteCommands<N> {
    pub const CAPACITY: usize = N;

    pub fn set_content(
        &mut self,
        cmd_buffer: &RecordContext<'_>,
        command_buffers: &[CommandBufferId],
    ) -> CommandResult {
        if cmd_buffer.level == CommandBufferLevel::Secondary {
            log::warn!("Secondary command buffers cannot execute other command buffers");
        }

        self.command_buffers.assign(command_buffers);
        Ok(())
    }

    #[inline]
    pub fn command_buffers(&self) -> &PooledVec<CommandBufferId, N> {
        &self.command_buffers
    }
}

impl<const N: usize> Command for ExecuteCommands<N>
where
    Self: PooledCommand,
{
    fn kind(&self) -> CommandKind {
        CommandKind::ExecuteCommands
    }

    fn encode(&self, ctx: &mut EncodeContext<'_>) {
        for &command_buffer in &self.command_buffers {
            ctx.execute_secondary(command_buffer);
        }
    }

    fn return_to_pool(self: Box<Self>, pool: &mut CommandPool) {
        Self::type_pool(pool).release(self);
    }
}
