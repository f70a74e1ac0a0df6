//! Helpers shared by the unit tests.

use ash::vk;

use crate::{
    command::{CommandBufferId, CommandEncoder, RenderPassBeginInfo, RenderPassEncodeInfo},
    object::{
        Framebuffer, FramebufferId, ImageView, ImageViewId, ObjectRegistry, RenderPass,
        RenderPassId,
    },
    types::{ClearValue, Extent2D, Rect2D, StencilFaceFlags, SubpassContents, Viewport},
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One call made on a [`CallLog`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BeginRenderPass {
        render_pass: RenderPassId,
        framebuffer: FramebufferId,
        contents: SubpassContents,
        framebuffer_extent: Extent2D,
        layer_count: u32,
        render_area: Rect2D,
        clear_values: Vec<ClearValue>,
        attachments: Vec<ImageViewId>,
    },
    NextSubpass(SubpassContents),
    EndRenderPass,
    ExecuteSecondary(CommandBufferId),
    SetViewport(u32, Vec<Viewport>),
    SetScissor(u32, Vec<Rect2D>),
    SetLineWidth(f32),
    SetDepthBias(f32, f32, f32),
    SetBlendConstants([f32; 4]),
    SetDepthBounds(f32, f32),
    SetStencilCompareMask(StencilFaceFlags, u32),
    SetStencilWriteMask(StencilFaceFlags, u32),
    SetStencilReference(StencilFaceFlags, u32),
}

/// An encoder that records every call it receives.
#[derive(Debug, Default)]
pub struct CallLog {
    pub calls: Vec<Call>,
}

impl CommandEncoder for CallLog {
    fn begin_render_pass(&mut self, info: &RenderPassEncodeInfo<'_>) {
        self.calls.push(Call::BeginRenderPass {
            render_pass: info.render_pass,
            framebuffer: info.framebuffer,
            contents: info.contents,
            framebuffer_extent: info.framebuffer_extent,
            layer_count: info.layer_count,
            render_area: info.render_area,
            clear_values: info.clear_values.to_vec(),
            attachments: info.attachments.to_vec(),
        });
    }

    fn next_subpass(&mut self, contents: SubpassContents) {
        self.calls.push(Call::NextSubpass(contents));
    }

    fn end_render_pass(&mut self) {
        self.calls.push(Call::EndRenderPass);
    }

    fn execute_secondary(&mut self, command_buffer: CommandBufferId) {
        self.calls.push(Call::ExecuteSecondary(command_buffer));
    }

    fn set_viewport(&mut self, first_viewport: u32, viewports: &[Viewport]) {
        self.calls.push(Call::SetViewport(first_viewport, viewports.to_vec()));
    }

    fn set_scissor(&mut self, first_scissor: u32, scissors: &[Rect2D]) {
        self.calls.push(Call::SetScissor(first_scissor, scissors.to_vec()));
    }

    fn set_line_width(&mut self, line_width: f32) {
        self.calls.push(Call::SetLineWidth(line_width));
    }

    fn set_depth_bias(&mut self, constant_factor: f32, clamp: f32, slope_factor: f32) {
        self.calls.push(Call::SetDepthBias(constant_factor, clamp, slope_factor));
    }

    fn set_blend_constants(&mut self, blend_constants: [f32; 4]) {
        self.calls.push(Call::SetBlendConstants(blend_constants));
    }

    fn set_depth_bounds(&mut self, min_depth_bounds: f32, max_depth_bounds: f32) {
        self.calls.push(Call::SetDepthBounds(min_depth_bounds, max_depth_bounds));
    }

    fn set_stencil_compare_mask(&mut self, face_mask: StencilFaceFlags, compare_mask: u32) {
        self.calls.push(Call::SetStencilCompareMask(face_mask, compare_mask));
    }

    fn set_stencil_write_mask(&mut self, face_mask: StencilFaceFlags, write_mask: u32) {
        self.calls.push(Call::SetStencilWriteMask(face_mask, write_mask));
    }

    fn set_stencil_reference(&mut self, face_mask: StencilFaceFlags, reference: u32) {
        self.calls.push(Call::SetStencilReference(face_mask, reference));
    }
}

/// A registry holding one render pass and one framebuffer with its views.
pub struct Fixture {
    pub objects: ObjectRegistry,
    pub render_pass: RenderPassId,
    pub framebuffer: FramebufferId,
    pub views: Vec<ImageViewId>,
}

impl Fixture {
    pub const EXTENT: Extent2D = Extent2D::new(1280, 720);
    pub const LAYERS: u32 = 1;

    pub fn new(attachment_count: usize, subpass_count: u32) -> Self {
        init_logging();

        let mut objects = ObjectRegistry::new();
        let render_pass = objects.render_passes.insert(RenderPass::new(subpass_count));
        let views: Vec<_> = (0..attachment_count)
            .map(|_| {
                objects
                    .image_views
                    .insert(ImageView::new(vk::Format::R8G8B8A8_UNORM, Self::EXTENT))
            })
            .collect();
        let framebuffer = objects
            .framebuffers
            .insert(Framebuffer::new(Self::EXTENT, Self::LAYERS, views.iter().copied()));

        Self {
            objects,
            render_pass,
            framebuffer,
            views,
        }
    }

    pub fn render_area() -> Rect2D {
        Rect2D::new([0, 0], Self::EXTENT)
    }

    /// Creates views that no framebuffer refers to.
    pub fn extra_views(&mut self, count: usize) -> Vec<ImageViewId> {
        (0..count)
            .map(|_| {
                self.objects
                    .image_views
                    .insert(ImageView::new(vk::Format::D32_SFLOAT, Self::EXTENT))
            })
            .collect()
    }

    pub fn imageless_framebuffer(&mut self) -> FramebufferId {
        self.objects
            .framebuffers
            .insert(Framebuffer::imageless(Self::EXTENT, Self::LAYERS))
    }

    pub fn begin_info<'a>(&self, clear_values: &'a [ClearValue]) -> RenderPassBeginInfo<'a> {
        RenderPassBeginInfo::new(self.render_pass, self.framebuffer, Self::render_area())
            .clear_values(clear_values)
    }
}

/// Distinct clear values, one per attachment.
pub fn clear_values(count: usize) -> Vec<ClearValue> {
    (0..count)
        .map(|i| ClearValue::Color([i as f32, 0.0, 0.0, 1.0]))
        .collect()
}
