use crate::{
    command::{
        ATTACHMENT_TIERS, BeginRenderPass1Multi, BeginRenderPass2Multi, BeginRenderPass10,
        BeginRenderPass11, BeginRenderPass12, BeginRenderPass20, BeginRenderPass21,
        BeginRenderPass22, BeginRenderPassMulti0, BeginRenderPassMulti1, BeginRenderPassMulti2,
        BeginRenderPassMultiMulti, CLEAR_VALUE_TIERS, Command, CommandPool, EXECUTE_COMMANDS_TIERS,
        EncodeContext, EndRenderPass, ExecuteCommands1, ExecuteCommands4, ExecuteCommandsMulti,
        NextSubpass, PooledCommand, RecordContext, RenderPassBeginInfo, RenderPassState,
        SetBlendConstants, SetDepthBias, SetDepthBounds, SetLineWidth, SetScissor1, SetScissor4,
        SetScissorMulti, SetStencilCompareMask, SetStencilReference, SetStencilWriteMask,
        SetViewport1, SetViewport4, SetViewportMulti, VIEWPORT_SCISSOR_TIERS, select_tier,
    },
    error::{CommandError, CommandResult},
    object::{ObjectId, ObjectRegistry},
    types::{
        CommandBufferLevel, Rect2D, StencilFaceFlags, SubpassBeginInfo, SubpassContents,
        SubpassEndInfo, Viewport,
    },
};

pub type CommandBufferId = ObjectId<CommandBuffer>;

/// An ordered list of recorded commands.
///
/// Commands are appended through a [`Recorder`] and replayed in the same
/// order by [`encode`](CommandBuffer::encode).
pub struct CommandBuffer {
    level: CommandBufferLevel,
    commands: Vec<Box<dyn Command>>,
    render_pass: RenderPassState,
    recording: bool,
}

static_assertions::assert_impl_all!(CommandBuffer: Send);

impl CommandBuffer {
    pub fn new(level: CommandBufferLevel) -> Self {
        Self {
            level,
            commands: Vec::new(),
            render_pass: RenderPassState::Closed,
            recording: false,
        }
    }

    #[inline]
    pub fn level(&self) -> CommandBufferLevel {
        self.level
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> impl ExactSizeIterator<Item = &dyn Command> + '_ {
        self.commands.iter().map(|command| &**command)
    }

    #[inline]
    pub fn render_pass_state(&self) -> RenderPassState {
        self.render_pass
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Starts recording. Previously recorded commands are released to `pool` first.
    pub fn record<'a>(
        &'a mut self,
        pool: &'a mut CommandPool,
        objects: &'a ObjectRegistry,
    ) -> Recorder<'a> {
        if !self.commands.is_empty() {
            self.reset(pool);
        }

        self.render_pass = RenderPassState::Closed;
        self.recording = true;
        Recorder {
            buffer: self,
            pool,
            objects,
        }
    }

    /// Replays every command, in recording order.
    pub fn encode(&self, ctx: &mut EncodeContext<'_>) {
        log::debug!(
            "Encoding {:?} command buffer with {} commands",
            self.level,
            self.commands.len()
        );
        for command in &self.commands {
            command.encode(ctx);
        }
    }

    /// Returns every command to its type pool and closes any open render pass.
    pub fn reset(&mut self, pool: &mut CommandPool) {
        log::debug!("Resetting command buffer with {} commands", self.commands.len());
        for command in self.commands.drain(..) {
            command.return_to_pool(pool);
        }
        self.render_pass = RenderPassState::Closed;
    }
}

/// Records commands into a [`CommandBuffer`].
///
/// Recording ends when the recorder is dropped or [`finish`](Recorder::finish)ed.
pub struct Recorder<'a> {
    buffer: &'a mut CommandBuffer,
    pool: &'a mut CommandPool,
    objects: &'a ObjectRegistry,
}

macro_rules! push_begin_render_pass {
    (
        $recorder:expr,
        $clear_value_tier:expr,
        $attachment_tier:expr,
        |$command:ident, $ctx:ident| $set_content:expr
    ) => {
        match ($clear_value_tier, $attachment_tier) {
            (0, 0) => $recorder
                .push_command(|$command: &mut BeginRenderPass10, $ctx| $set_content),
            (1, 0) => $recorder
                .push_command(|$command: &mut BeginRenderPass20, $ctx| $set_content),
            (_, 0) => $recorder
                .push_command(|$command: &mut BeginRenderPassMulti0, $ctx| $set_content),
            (0, 1) => $recorder
                .push_command(|$command: &mut BeginRenderPass11, $ctx| $set_content),
            (1, 1) => $recorder
                .push_command(|$command: &mut BeginRenderPass21, $ctx| $set_content),
            (_, 1) => $recorder
                .push_command(|$command: &mut BeginRenderPassMulti1, $ctx| $set_content),
            (0, 2) => $recorder
                .push_command(|$command: &mut BeginRenderPass12, $ctx| $set_content),
            (1, 2) => $recorder
                .push_command(|$command: &mut BeginRenderPass22, $ctx| $set_content),
            (_, 2) => $recorder
                .push_command(|$command: &mut BeginRenderPassMulti2, $ctx| $set_content),
            (0, _) => $recorder
                .push_command(|$command: &mut BeginRenderPass1Multi, $ctx| $set_content),
            (1, _) => $recorder
                .push_command(|$command: &mut BeginRenderPass2Multi, $ctx| $set_content),
            (_, _) => $recorder
                .push_command(|$command: &mut BeginRenderPassMultiMulti, $ctx| $set_content),
        }
    };
}

impl Recorder<'_> {
    #[inline]
    pub fn command_buffer(&self) -> &CommandBuffer {
        self.buffer
    }

    /// Acquires a `C` from the pool, fills it and appends it.
    ///
    /// On failure the command goes straight back to the pool and nothing is
    /// appended.
    fn push_command<C>(
        &mut self,
        set_content: impl FnOnce(&mut C, &RecordContext<'_>) -> CommandResult,
    ) -> CommandResult
    where
        C: PooledCommand + Command,
    {
        let ctx = RecordContext::new(self.objects, self.buffer.level);
        let mut command = self.pool.acquire::<C>();
        if let Err(error) = set_content(&mut *command, &ctx) {
            self.pool.release(command);
            return Err(error);
        }

        log::debug!("Recorded {:?}", command.kind());
        self.buffer.commands.push(command);
        Ok(())
    }

    fn begin_tiers(&self, info: &RenderPassBeginInfo<'_>) -> CommandResult<(usize, usize)> {
        if self.buffer.render_pass.is_active() {
            return Err(CommandError::RenderPassAlreadyActive);
        }

        let attachment_count = info.attachment_count(self.objects)?;
        Ok((
            select_tier(info.clear_values.len(), &CLEAR_VALUE_TIERS),
            select_tier(attachment_count, &ATTACHMENT_TIERS),
        ))
    }

    fn ensure_render_pass_active(&self) -> CommandResult {
        if self.buffer.render_pass.is_active() {
            Ok(())
        } else {
            Err(CommandError::NoActiveRenderPass)
        }
    }

    pub fn begin_render_pass(
        &mut self,
        info: &RenderPassBeginInfo<'_>,
        contents: SubpassContents,
    ) -> CommandResult {
        let (clear_value_tier, attachment_tier) = self.begin_tiers(info)?;
        push_begin_render_pass!(self, clear_value_tier, attachment_tier, |command, ctx| {
            command.set_content(ctx, info, contents)
        })?;
        self.buffer.render_pass.begin(info.render_pass, contents)
    }

    pub fn begin_render_pass2(
        &mut self,
        info: &RenderPassBeginInfo<'_>,
        subpass_begin_info: &SubpassBeginInfo,
    ) -> CommandResult {
        let (clear_value_tier, attachment_tier) = self.begin_tiers(info)?;
        push_begin_render_pass!(self, clear_value_tier, attachment_tier, |command, ctx| {
            command.set_content2(ctx, info, subpass_begin_info)
        })?;
        self.buffer
            .render_pass
            .begin(info.render_pass, subpass_begin_info.contents)
    }

    pub fn next_subpass(&mut self, contents: SubpassContents) -> CommandResult {
        self.ensure_render_pass_active()?;
        self.push_command(|command: &mut NextSubpass, ctx| command.set_content(ctx, contents))?;
        self.advance_subpass(contents)
    }

    pub fn next_subpass2(
        &mut self,
        subpass_begin_info: &SubpassBeginInfo,
        subpass_end_info: &SubpassEndInfo,
    ) -> CommandResult {
        self.ensure_render_pass_active()?;
        self.push_command(|command: &mut NextSubpass, ctx| {
            command.set_content2(ctx, subpass_begin_info, subpass_end_info)
        })?;
        self.advance_subpass(subpass_begin_info.contents)
    }

    fn advance_subpass(&mut self, contents: SubpassContents) -> CommandResult {
        let subpass = self.buffer.render_pass.next_subpass(contents)?;
        let render_pass = self
            .buffer
            .render_pass
            .render_pass()
            .and_then(|id| self.objects.render_passes.get(id));
        if let Some(render_pass) = render_pass {
            if subpass >= render_pass.subpass_count() {
                log::warn!(
                    "Advanced to subpass {} of a render pass with {} subpasses",
                    subpass,
                    render_pass.subpass_count()
                );
            }
        }
        Ok(())
    }

    pub fn end_render_pass(&mut self) -> CommandResult {
        self.ensure_render_pass_active()?;
        self.push_command(|command: &mut EndRenderPass, ctx| command.set_content(ctx))?;
        self.buffer.render_pass.end()
    }

    pub fn end_render_pass2(&mut self, subpass_end_info: &SubpassEndInfo) -> CommandResult {
        self.ensure_render_pass_active()?;
        self.push_command(|command: &mut EndRenderPass, ctx| {
            command.set_content2(ctx, subpass_end_info)
        })?;
        self.buffer.render_pass.end()
    }

    pub fn execute_commands(&mut self, command_buffers: &[CommandBufferId]) -> CommandResult {
        if self.buffer.render_pass.contents() == Some(SubpassContents::Inline) {
            log::warn!("Executing secondary command buffers inside an inline subpass");
        }

        match select_tier(command_buffers.len(), &EXECUTE_COMMANDS_TIERS) {
            0 => self.push_command(|command: &mut ExecuteCommands1, ctx| {
                command.set_content(ctx, command_buffers)
            }),
            1 => self.push_command(|command: &mut ExecuteCommands4, ctx| {
                command.set_content(ctx, command_buffers)
            }),
            _ => self.push_command(|command: &mut ExecuteCommandsMulti, ctx| {
                command.set_content(ctx, command_buffers)
            }),
        }
    }

    pub fn set_viewport(&mut self, first_viewport: u32, viewports: &[Viewport]) -> CommandResult {
        match select_tier(viewports.len(), &VIEWPORT_SCISSOR_TIERS) {
            0 => self.push_command(|command: &mut SetViewport1, ctx| {
                command.set_content(ctx, first_viewport, viewports)
            }),
            1 => self.push_command(|command: &mut SetViewport4, ctx| {
                command.set_content(ctx, first_viewport, viewports)
            }),
            _ => self.push_command(|command: &mut SetViewportMulti, ctx| {
                command.set_content(ctx, first_viewport, viewports)
            }),
        }
    }

    pub fn set_scissor(&mut self, first_scissor: u32, scissors: &[Rect2D]) -> CommandResult {
        match select_tier(scissors.len(), &VIEWPORT_SCISSOR_TIERS) {
            0 => self.push_command(|command: &mut SetScissor1, ctx| {
                command.set_content(ctx, first_scissor, scissors)
            }),
            1 => self.push_command(|command: &mut SetScissor4, ctx| {
                command.set_content(ctx, first_scissor, scissors)
            }),
            _ => self.push_command(|command: &mut SetScissorMulti, ctx| {
                command.set_content(ctx, first_scissor, scissors)
            }),
        }
    }

    pub fn set_line_width(&mut self, line_width: f32) -> CommandResult {
        self.push_command(|command: &mut SetLineWidth, ctx| command.set_content(ctx, line_width))
    }

    pub fn set_depth_bias(
        &mut self,
        constant_factor: f32,
        clamp: f32,
        slope_factor: f32,
    ) -> CommandResult {
        self.push_command(|command: &mut SetDepthBias, ctx| {
            command.set_content(ctx, constant_factor, clamp, slope_factor)
        })
    }

    pub fn set_blend_constants(&mut self, blend_constants: [f32; 4]) -> CommandResult {
        self.push_command(|command: &mut SetBlendConstants, ctx| {
            command.set_content(ctx, blend_constants)
        })
    }

    pub fn set_depth_bounds(
        &mut self,
        min_depth_bounds: f32,
        max_depth_bounds: f32,
    ) -> CommandResult {
        self.push_command(|command: &mut SetDepthBounds, ctx| {
            command.set_content(ctx, min_depth_bounds, max_depth_bounds)
        })
    }

    pub fn set_stencil_compare_mask(
        &mut self,
        face_mask: StencilFaceFlags,
        compare_mask: u32,
    ) -> CommandResult {
        self.push_command(|command: &mut SetStencilCompareMask, ctx| {
            command.set_content(ctx, face_mask, compare_mask)
        })
    }

    pub fn set_stencil_write_mask(
        &mut self,
        face_mask: StencilFaceFlags,
        write_mask: u32,
    ) -> CommandResult {
        self.push_command(|command: &mut SetStencilWriteMask, ctx| {
            command.set_content(ctx, face_mask, write_mask)
        })
    }

    pub fn set_stencil_reference(
        &mut self,
        face_mask: StencilFaceFlags,
        reference: u32,
    ) -> CommandResult {
        self.push_command(|command: &mut SetStencilReference, ctx| {
            command.set_content(ctx, face_mask, reference)
        })
    }

    /// Ends recording.
    pub fn finish(self) {
        log::debug!("Finished recording {} commands", self.buffer.len());
    }
}

impl Drop for Recorder<'_> {
    fn drop(&mut self) {
        self.buffer.recording = false;
        if self.buffer.render_pass.is_active() {
            log::warn!("Recording ended inside an active render pass");
        }
    }
}
