use ash::vk;

use crate::{
    command::{
        Command, CommandKind, CommandPool, EncodeContext, PooledCommand, RecordContext,
        RenderPassEncodeInfo,
    },
    error::{CommandError, CommandResult},
    object::{FramebufferId, ImageViewId, ObjectRegistry, RenderPassId},
    pooled_vec::PooledVec,
    types::{ClearValue, Rect2D, SubpassBeginInfo, SubpassContents, SubpassEndInfo},
};

/// An optional structure chained to a [`RenderPassBeginInfo`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderPassBeginExtension<'a> {
    /// The views to bind to the attachments of an imageless framebuffer.
    AttachmentBegin(&'a [ImageViewId]),
    DeviceGroup { device_mask: u32 },
    /// Any other structure. Ignored.
    Other(vk::StructureType),
}

impl RenderPassBeginExtension<'_> {
    pub fn structure_type(&self) -> vk::StructureType {
        match self {
            Self::AttachmentBegin(_) => vk::StructureType::RENDER_PASS_ATTACHMENT_BEGIN_INFO,
            Self::DeviceGroup { .. } => vk::StructureType::DEVICE_GROUP_RENDER_PASS_BEGIN_INFO,
            Self::Other(ty) => *ty,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderPassBeginInfo<'a> {
    pub render_pass: RenderPassId,
    pub framebuffer: FramebufferId,
    pub render_area: Rect2D,
    /// One clear value per attachment, indexed by attachment.
    pub clear_values: &'a [ClearValue],
    pub extensions: &'a [RenderPassBeginExtension<'a>],
}

impl<'a> RenderPassBeginInfo<'a> {
    pub fn new(render_pass: RenderPassId, framebuffer: FramebufferId, render_area: Rect2D) -> Self {
        Self {
            render_pass,
            framebuffer,
            render_area,
            clear_values: &[],
            extensions: &[],
        }
    }

    pub fn clear_values(mut self, clear_values: &'a [ClearValue]) -> Self {
        self.clear_values = clear_values;
        self
    }

    pub fn extensions(mut self, extensions: &'a [RenderPassBeginExtension<'a>]) -> Self {
        self.extensions = extensions;
        self
    }

    /// The views supplied for an imageless framebuffer, if any.
    ///
    /// Only the first attachment begin structure in the chain counts.
    pub fn explicit_attachments(&self) -> Option<&'a [ImageViewId]> {
        self.extensions.iter().find_map(|extension| match extension {
            RenderPassBeginExtension::AttachmentBegin(views) => Some(*views),
            _ => None,
        })
    }

    /// The number of attachment views the render pass will bind.
    pub fn attachment_count(&self, objects: &ObjectRegistry) -> CommandResult<usize> {
        if let Some(views) = self.explicit_attachments() {
            return Ok(views.len());
        }

        objects
            .framebuffers
            .get(self.framebuffer)
            .map(|framebuffer| framebuffer.attachment_count())
            .ok_or(CommandError::UnknownObject { kind: "framebuffer" })
    }
}

/// Begins a render pass.
///
/// `N_CV` and `N_A` are the inline capacities for clear values and attachment
/// views. See [`CLEAR_VALUE_TIERS`](super::CLEAR_VALUE_TIERS) and
/// [`ATTACHMENT_TIERS`](super::ATTACHMENT_TIERS) for the variants in use.
#[derive(Debug, Default)]
pub struct BeginRenderPass<const N_CV: usize, const N_A: usize> {
    render_pass: RenderPassId,
    framebuffer: FramebufferId,
    render_area: Rect2D,
    contents: SubpassContents,
    clear_values: PooledVec<ClearValue, N_CV>,
    attachments: PooledVec<ImageViewId, N_A>,
}

impl<const N_CV: usize, const N_A: usize> BeginRenderPass<N_CV, N_A> {
    pub const CLEAR_VALUE_CAPACITY: usize = N_CV;
    pub const ATTACHMENT_CAPACITY: usize = N_A;

    pub fn set_content(
        &mut self,
        cmd_buffer: &RecordContext<'_>,
        info: &RenderPassBeginInfo<'_>,
        contents: SubpassContents,
    ) -> CommandResult {
        let objects = cmd_buffer.objects;
        let framebuffer = objects
            .framebuffers
            .get(info.framebuffer)
            .ok_or(CommandError::UnknownObject { kind: "framebuffer" })?;
        if !objects.render_passes.contains(info.render_pass) {
            return Err(CommandError::UnknownObject { kind: "render pass" });
        }

        self.render_pass = info.render_pass;
        self.framebuffer = info.framebuffer;
        self.render_area = info.render_area;
        self.contents = contents;
        self.clear_values.assign(info.clear_values);

        for extension in info.extensions {
            if !matches!(extension, RenderPassBeginExtension::AttachmentBegin(_)) {
                log::debug!(
                    "Ignoring render pass begin extension {:?}",
                    extension.structure_type()
                );
            }
        }

        // Attachments come either from the begin info or from the framebuffer, never both.
        match info.explicit_attachments() {
            Some(views) => self.attachments.assign(views),
            None => self.attachments.assign(framebuffer.attachments()),
        }

        Ok(())
    }

    pub fn set_content2(
        &mut self,
        cmd_buffer: &RecordContext<'_>,
        info: &RenderPassBeginInfo<'_>,
        subpass_begin_info: &SubpassBeginInfo,
    ) -> CommandResult {
        self.set_content(cmd_buffer, info, subpass_begin_info.contents)
    }

    #[inline]
    pub fn render_pass(&self) -> RenderPassId {
        self.render_pass
    }

    #[inline]
    pub fn framebuffer(&self) -> FramebufferId {
        self.framebuffer
    }

    #[inline]
    pub fn render_area(&self) -> Rect2D {
        self.render_area
    }

    #[inline]
    pub fn contents(&self) -> SubpassContents {
        self.contents
    }

    #[inline]
    pub fn clear_values(&self) -> &PooledVec<ClearValue, N_CV> {
        &self.clear_values
    }

    #[inline]
    pub fn attachments(&self) -> &PooledVec<ImageViewId, N_A> {
        &self.attachments
    }
}

impl<const N_CV: usize, const N_A: usize> Command for BeginRenderPass<N_CV, N_A>
where
    Self: PooledCommand,
{
    fn kind(&self) -> CommandKind {
        CommandKind::BeginRenderPass
    }

    fn encode(&self, ctx: &mut EncodeContext<'_>) {
        let Some(framebuffer) = ctx.objects().framebuffers.get(self.framebuffer) else {
            log::error!(
                "Framebuffer {:?} was destroyed before its render pass was encoded",
                self.framebuffer
            );
            return;
        };

        ctx.encoder().begin_render_pass(&RenderPassEncodeInfo {
            render_pass: self.render_pass,
            framebuffer: self.framebuffer,
            contents: self.contents,
            framebuffer_extent: framebuffer.extent(),
            layer_count: framebuffer.layer_count(),
            render_area: self.render_area,
            clear_values: self.clear_values.contents(),
            attachments: self.attachments.contents(),
        });
    }

    fn return_to_pool(self: Box<Self>, pool: &mut CommandPool) {
        Self::type_pool(pool).release(self);
    }
}

/// Advances to the next subpass of the active render pass.
#[derive(Debug, Default)]
pub struct NextSubpass {
    contents: SubpassContents,
}

impl NextSubpass {
    pub fn set_content(
        &mut self,
        _cmd_buffer: &RecordContext<'_>,
        contents: SubpassContents,
    ) -> CommandResult {
        self.contents = contents;
        Ok(())
    }

    pub fn set_content2(
        &mut self,
        cmd_buffer: &RecordContext<'_>,
        subpass_begin_info: &SubpassBeginInfo,
        _subpass_end_info: &SubpassEndInfo,
    ) -> CommandResult {
        self.set_content(cmd_buffer, subpass_begin_info.contents)
    }

    #[inline]
    pub fn contents(&self) -> SubpassContents {
        self.contents
    }
}

impl Command for NextSubpass {
    fn kind(&self) -> CommandKind {
        CommandKind::NextSubpass
    }

    fn encode(&self, ctx: &mut EncodeContext<'_>) {
        ctx.encoder().next_subpass(self.contents);
    }

    fn return_to_pool(self: Box<Self>, pool: &mut CommandPool) {
        Self::type_pool(pool).release(self);
    }
}

/// Ends the active render pass.
#[derive(Debug, Default)]
pub struct EndRenderPass;

impl EndRenderPass {
    pub fn set_content(&mut self, _cmd_buffer: &RecordContext<'_>) -> CommandResult {
        Ok(())
    }

    pub fn set_content2(
        &mut self,
        cmd_buffer: &RecordContext<'_>,
        _subpass_end_info: &SubpassEndInfo,
    ) -> CommandResult {
        self.set_content(cmd_buffer)
    }
}

impl Command for EndRenderPass {
    fn kind(&self) -> CommandKind {
        CommandKind::EndRenderPass
    }

    fn encode(&self, ctx: &mut EncodeContext<'_>) {
        ctx.encoder().end_render_pass();
    }

    fn return_to_pool(self: Box<Self>, pool: &mut CommandPool) {
        Self::type_pool(pool).release(self);
    }
}

/// Tracks the render pass of a command buffer while it is recorded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RenderPassState {
    #[default]
    Closed,
    Active {
        render_pass: RenderPassId,
        /// Index of the current subpass, `0` right after the pass began.
        subpass: u32,
        /// Contents of the current subpass.
        contents: SubpassContents,
    },
}

impl RenderPassState {
    pub fn begin(&mut self, render_pass: RenderPassId, contents: SubpassContents) -> CommandResult {
        if self.is_active() {
            return Err(CommandError::RenderPassAlreadyActive);
        }

        *self = Self::Active {
            render_pass,
            subpass: 0,
            contents,
        };
        Ok(())
    }

    /// Moves to the next subpass and returns its index.
    pub fn next_subpass(&mut self, next_contents: SubpassContents) -> CommandResult<u32> {
        match self {
            Self::Active { subpass, contents, .. } => {
                *subpass += 1;
                *contents = next_contents;
                Ok(*subpass)
            }
            Self::Closed => Err(CommandError::NoActiveRenderPass),
        }
    }

    pub fn end(&mut self) -> CommandResult {
        if !self.is_active() {
            return Err(CommandError::NoActiveRenderPass);
        }

        *self = Self::Closed;
        Ok(())
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn render_pass(&self) -> Option<RenderPassId> {
        match self {
            Self::Active { render_pass, .. } => Some(*render_pass),
            Self::Closed => None,
        }
    }

    pub fn subpass_index(&self) -> Option<u32> {
        match self {
            Self::Active { subpass, .. } => Some(*subpass),
            Self::Closed => None,
        }
    }

    pub fn contents(&self) -> Option<SubpassContents> {
        match self {
            Self::Active { contents, .. } => Some(*contents),
            Self::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        command::{
            BeginRenderPass2Multi, BeginRenderPassMulti0, BeginRenderPassMulti2,
            BeginRenderPassMultiMulti,
        },
        object::ObjectStorage,
        testing::{Call, CallLog, Fixture, clear_values},
        types::CommandBufferLevel,
    };

    fn context(fixture: &Fixture) -> RecordContext<'_> {
        RecordContext::new(&fixture.objects, CommandBufferLevel::Primary)
    }

    #[test]
    fn test_attachments_come_from_framebuffer_by_default() {
        let fixture = Fixture::new(3, 1);
        let values = clear_values(3);
        let mut command = BeginRenderPassMultiMulti::default();

        command
            .set_content(&context(&fixture), &fixture.begin_info(&values), SubpassContents::Inline)
            .unwrap();

        assert_eq!(command.attachments().contents(), fixture.views.as_slice());
        assert_eq!(command.clear_values().contents(), values.as_slice());
    }

    #[test]
    fn test_explicit_attachments_replace_framebuffer_attachments() {
        let mut fixture = Fixture::new(3, 1);
        let explicit = fixture.extra_views(2);
        let extensions = [RenderPassBeginExtension::AttachmentBegin(&explicit)];
        let info = fixture.begin_info(&[]).extensions(&extensions);
        let mut command = BeginRenderPassMulti2::default();

        command
            .set_content(&context(&fixture), &info, SubpassContents::Inline)
            .unwrap();

        assert_eq!(command.attachments().contents(), explicit.as_slice());
    }

    #[test]
    fn test_imageless_framebuffer_uses_explicit_attachments() {
        let mut fixture = Fixture::new(0, 1);
        let framebuffer = fixture.imageless_framebuffer();
        let explicit = fixture.extra_views(3);
        let extensions = [
            RenderPassBeginExtension::DeviceGroup { device_mask: 1 },
            RenderPassBeginExtension::AttachmentBegin(&explicit),
        ];
        let mut info = fixture.begin_info(&[]).extensions(&extensions);
        info.framebuffer = framebuffer;

        assert_eq!(info.attachment_count(&fixture.objects), Ok(3));

        let mut command = BeginRenderPass2Multi::default();
        command
            .set_content(&context(&fixture), &info, SubpassContents::Inline)
            .unwrap();
        assert_eq!(command.attachments().contents(), explicit.as_slice());
    }

    #[test]
    fn test_unrecognized_extensions_are_ignored() {
        let fixture = Fixture::new(2, 1);
        let extensions = [
            RenderPassBeginExtension::DeviceGroup { device_mask: 3 },
            RenderPassBeginExtension::Other(
                vk::StructureType::RENDER_PASS_SAMPLE_LOCATIONS_BEGIN_INFO_EXT,
            ),
        ];
        let info = fixture.begin_info(&[]).extensions(&extensions);
        let mut command = BeginRenderPassMulti2::default();

        command
            .set_content(&context(&fixture), &info, SubpassContents::Inline)
            .unwrap();

        assert_eq!(info.explicit_attachments(), None);
        assert_eq!(command.attachments().contents(), fixture.views.as_slice());
        assert_eq!(
            extensions[0].structure_type(),
            vk::StructureType::DEVICE_GROUP_RENDER_PASS_BEGIN_INFO
        );
        assert_eq!(
            extensions[1].structure_type(),
            vk::StructureType::RENDER_PASS_SAMPLE_LOCATIONS_BEGIN_INFO_EXT
        );
        assert_eq!(
            RenderPassBeginExtension::AttachmentBegin(&[]).structure_type(),
            vk::StructureType::RENDER_PASS_ATTACHMENT_BEGIN_INFO
        );
    }

    #[test]
    fn test_reused_command_drops_previous_content() {
        let mut fixture = Fixture::new(2, 1);
        let mut command = BeginRenderPassMulti2::default();
        let first = clear_values(5);
        command
            .set_content(&context(&fixture), &fixture.begin_info(&first), SubpassContents::Inline)
            .unwrap();

        let explicit = fixture.extra_views(1);
        let extensions = [RenderPassBeginExtension::AttachmentBegin(&explicit)];
        let second = clear_values(2);
        let info = fixture.begin_info(&second).extensions(&extensions);
        command
            .set_content(&context(&fixture), &info, SubpassContents::SecondaryCommandBuffers)
            .unwrap();

        assert_eq!(command.clear_values().contents(), second.as_slice());
        assert_eq!(command.attachments().contents(), explicit.as_slice());
        assert_eq!(command.contents(), SubpassContents::SecondaryCommandBuffers);
    }

    #[test]
    fn test_clear_values_spill_only_past_overflow_capacity() {
        let fixture = Fixture::new(0, 1);
        let mut command = BeginRenderPassMulti0::default();

        let fitting = clear_values(9);
        command
            .set_content(&context(&fixture), &fixture.begin_info(&fitting), SubpassContents::Inline)
            .unwrap();
        assert!(!command.clear_values().spilled());

        let overflowing = clear_values(12);
        command
            .set_content(
                &context(&fixture),
                &fixture.begin_info(&overflowing),
                SubpassContents::Inline,
            )
            .unwrap();
        assert!(command.clear_values().spilled());
        assert_eq!(command.clear_values().len(), 12);
    }

    #[test]
    fn test_unknown_framebuffer_is_rejected() {
        let fixture = Fixture::new(1, 1);
        let mut info = fixture.begin_info(&[]);
        info.framebuffer = FramebufferId::null();

        let result = BeginRenderPassMulti0::default().set_content(
            &context(&fixture),
            &info,
            SubpassContents::Inline,
        );
        assert_eq!(result, Err(CommandError::UnknownObject { kind: "framebuffer" }));
        assert_eq!(
            info.attachment_count(&fixture.objects),
            Err(CommandError::UnknownObject { kind: "framebuffer" })
        );
    }

    #[test]
    fn test_unknown_render_pass_is_rejected() {
        let fixture = Fixture::new(1, 1);
        let mut info = fixture.begin_info(&[]);
        info.render_pass = RenderPassId::null();

        let result = BeginRenderPassMulti0::default().set_content(
            &context(&fixture),
            &info,
            SubpassContents::Inline,
        );
        assert_eq!(result, Err(CommandError::UnknownObject { kind: "render pass" }));
    }

    #[test]
    fn test_both_begin_overloads_capture_the_same_state() {
        let fixture = Fixture::new(2, 1);
        let values = clear_values(2);
        let info = fixture.begin_info(&values);

        let mut legacy = BeginRenderPass2Multi::default();
        legacy
            .set_content(&context(&fixture), &info, SubpassContents::SecondaryCommandBuffers)
            .unwrap();
        let mut extended = BeginRenderPass2Multi::default();
        extended
            .set_content2(
                &context(&fixture),
                &info,
                &SubpassBeginInfo::new(SubpassContents::SecondaryCommandBuffers),
            )
            .unwrap();

        assert_eq!(legacy.contents(), extended.contents());
        assert_eq!(legacy.render_area(), extended.render_area());
        assert_eq!(legacy.clear_values().contents(), extended.clear_values().contents());
        assert_eq!(legacy.attachments().contents(), extended.attachments().contents());
    }

    #[test]
    fn test_begin_encodes_framebuffer_extent_and_layers() {
        let fixture = Fixture::new(1, 1);
        let values = clear_values(1);
        let mut command = BeginRenderPass2Multi::default();
        command
            .set_content(&context(&fixture), &fixture.begin_info(&values), SubpassContents::Inline)
            .unwrap();

        let mut log = CallLog::default();
        let command_buffers = ObjectStorage::new();
        command.encode(&mut EncodeContext::new(&mut log, &fixture.objects, &command_buffers));

        assert_eq!(
            log.calls,
            vec![Call::BeginRenderPass {
                render_pass: fixture.render_pass,
                framebuffer: fixture.framebuffer,
                contents: SubpassContents::Inline,
                framebuffer_extent: Fixture::EXTENT,
                layer_count: Fixture::LAYERS,
                render_area: Fixture::render_area(),
                clear_values: values,
                attachments: fixture.views.clone(),
            }]
        );
    }

    #[test]
    fn test_next_subpass_and_end_overloads() {
        let fixture = Fixture::new(0, 2);
        let mut next = NextSubpass::default();
        next.set_content2(
            &context(&fixture),
            &SubpassBeginInfo::new(SubpassContents::SecondaryCommandBuffers),
            &SubpassEndInfo,
        )
        .unwrap();
        let mut end = EndRenderPass;
        end.set_content2(&context(&fixture), &SubpassEndInfo).unwrap();

        let mut log = CallLog::default();
        let command_buffers = ObjectStorage::new();
        let mut ctx = EncodeContext::new(&mut log, &fixture.objects, &command_buffers);
        next.encode(&mut ctx);
        end.encode(&mut ctx);

        assert_eq!(
            log.calls,
            vec![
                Call::NextSubpass(SubpassContents::SecondaryCommandBuffers),
                Call::EndRenderPass,
            ]
        );
    }

    #[test]
    fn test_state_machine_counts_subpasses() {
        let render_pass = Fixture::new(0, 3).render_pass;
        let mut state = RenderPassState::default();
        assert!(!state.is_active());

        state.begin(render_pass, SubpassContents::Inline).unwrap();
        assert_eq!(state.subpass_index(), Some(0));
        assert_eq!(state.next_subpass(SubpassContents::SecondaryCommandBuffers), Ok(1));
        assert_eq!(state.next_subpass(SubpassContents::Inline), Ok(2));
        assert_eq!(state.contents(), Some(SubpassContents::Inline));
        assert_eq!(state.render_pass(), Some(render_pass));

        state.end().unwrap();
        assert_eq!(state, RenderPassState::Closed);

        state.begin(render_pass, SubpassContents::Inline).unwrap();
        assert_eq!(state.subpass_index(), Some(0));
    }

    #[test]
    fn test_state_machine_rejects_illegal_transitions() {
        let render_pass = Fixture::new(0, 1).render_pass;
        let mut state = RenderPassState::default();

        assert_eq!(
            state.next_subpass(SubpassContents::Inline),
            Err(CommandError::NoActiveRenderPass)
        );
        assert_eq!(state.end(), Err(CommandError::NoActiveRenderPass));

        state.begin(render_pass, SubpassContents::Inline).unwrap();
        assert_eq!(
            state.begin(render_pass, SubpassContents::Inline),
            Err(CommandError::RenderPassAlreadyActive)
        );
        assert_eq!(state.subpass_index(), Some(0));
    }
}
