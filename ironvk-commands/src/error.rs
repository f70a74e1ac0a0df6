use thiserror::Error;

/// Errors reported while recording commands.
///
/// Running out of memory while growing a pool or a payload is not an error
/// here, it aborts like any other allocation failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    #[error("a render pass is already active on this command buffer")]
    RenderPassAlreadyActive,
    #[error("no render pass is active on this command buffer")]
    NoActiveRenderPass,
    #[error("the referenced {kind} does not exist")]
    UnknownObject { kind: &'static str },
}

static_assertions::assert_impl_all!(CommandError: Send, Sync, std::error::Error);

pub type CommandResult<T = ()> = Result<T, CommandError>;
