use crate::{
    command::CommandBufferId,
    object::{FramebufferId, ImageViewId, RenderPassId},
    types::{ClearValue, Extent2D, Rect2D, StencilFaceFlags, SubpassContents, Viewport},
};

/// Everything the encoder needs to open a render pass.
#[derive(Debug, Clone, Copy)]
pub struct RenderPassEncodeInfo<'a> {
    pub render_pass: RenderPassId,
    pub framebuffer: FramebufferId,
    pub contents: SubpassContents,
    pub framebuffer_extent: Extent2D,
    pub layer_count: u32,
    pub render_area: Rect2D,
    /// One clear value per attachment, in attachment order.
    pub clear_values: &'a [ClearValue],
    /// The image views bound to the attachments, in attachment order.
    pub attachments: &'a [ImageViewId],
}

/// The native encoder replayed commands are translated into.
///
/// Subpasses are sequenced through [`next_subpass`](Self::next_subpass); how
/// a backend without subpasses maps them is up to the implementation.
pub trait CommandEncoder {
    fn begin_render_pass(&mut self, info: &RenderPassEncodeInfo<'_>);

    fn next_subpass(&mut self, contents: SubpassContents);

    fn end_render_pass(&mut self);

    /// Called right before the commands of a secondary command buffer are replayed.
    fn execute_secondary(&mut self, command_buffer: CommandBufferId) {
        let _ = command_buffer;
    }

    fn set_viewport(&mut self, first_viewport: u32, viewports: &[Viewport]);

    fn set_scissor(&mut self, first_scissor: u32, scissors: &[Rect2D]);

    fn set_line_width(&mut self, line_width: f32);

    fn set_depth_bias(&mut self, constant_factor: f32, clamp: f32, slope_factor: f32);

    fn set_blend_constants(&mut self, blend_constants: [f32; 4]);

    fn set_depth_bounds(&mut self, min_depth_bounds: f32, max_depth_bounds: f32);

    fn set_stencil_compare_mask(&mut self, face_mask: StencilFaceFlags, compare_mask: u32);

    fn set_stencil_write_mask(&mut self, face_mask: StencilFaceFlags, write_mask: u32);

    fn set_stencil_reference(&mut self, face_mask: StencilFaceFlags, reference: u32);
}

/// An encoder that logs every call at trace level before forwarding it.
pub struct TraceEncoder<E> {
    inner: E,
}

impl<E: CommandEncoder> TraceEncoder<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    #[inline]
    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: CommandEncoder> CommandEncoder for TraceEncoder<E> {
    fn begin_render_pass(&mut self, info: &RenderPassEncodeInfo<'_>) {
        log::trace!(
            "begin_render_pass({:?}, {:?}, area: {:?}, {} clear values, {} attachments)",
            info.render_pass,
            info.contents,
            info.render_area,
            info.clear_values.len(),
            info.attachments.len(),
        );
        self.inner.begin_render_pass(info);
    }

    fn next_subpass(&mut self, contents: SubpassContents) {
        log::trace!("next_subpass({:?})", contents);
        self.inner.next_subpass(contents);
    }

    fn end_render_pass(&mut self) {
        log::trace!("end_render_pass()");
        self.inner.end_render_pass();
    }

    fn execute_secondary(&mut self, command_buffer: CommandBufferId) {
        log::trace!("execute_secondary({:?})", command_buffer);
        self.inner.execute_secondary(command_buffer);
    }

    fn set_viewport(&mut self, first_viewport: u32, viewports: &[Viewport]) {
        log::trace!("set_viewport({}, {:?})", first_viewport, viewports);
        self.inner.set_viewport(first_viewport, viewports);
    }

    fn set_scissor(&mut self, first_scissor: u32, scissors: &[Rect2D]) {
        log::trace!("set_scissor({}, {:?})", first_scissor, scissors);
        self.inner.set_scissor(first_scissor, scissors);
    }

    fn set_line_width(&mut self, line_width: f32) {
        log::trace!("set_line_width({})", line_width);
        self.inner.set_line_width(line_width);
    }

    fn set_depth_bias(&mut self, constant_factor: f32, clamp: f32, slope_factor: f32) {
        log::trace!("set_depth_bias({}, {}, {})", constant_factor, clamp, slope_factor);
        self.inner.set_depth_bias(constant_factor, clamp, slope_factor);
    }

    fn set_blend_constants(&mut self, blend_constants: [f32; 4]) {
        log::trace!("set_blend_constants({:?})", blend_constants);
        self.inner.set_blend_constants(blend_constants);
    }

    fn set_depth_bounds(&mut self, min_depth_bounds: f32, max_depth_bounds: f32) {
        log::trace!("set_depth_bounds({}, {})", min_depth_bounds, max_depth_bounds);
        self.inner.set_depth_bounds(min_depth_bounds, max_depth_bounds);
    }

    fn set_stencil_compare_mask(&mut self, face_mask: StencilFaceFlags, compare_mask: u32) {
        log::trace!("set_stencil_compare_mask({:?}, {:#x})", face_mask, compare_mask);
        self.inner.set_stencil_compare_mask(face_mask, compare_mask);
    }

    fn set_stencil_write_mask(&mut self, face_mask: StencilFaceFlags, write_mask: u32) {
        log::trace!("set_stencil_write_mask({:?}, {:#x})", face_mask, write_mask);
        self.inner.set_stencil_write_mask(face_mask, write_mask);
    }

    fn set_stencil_reference(&mut self, face_mask: StencilFaceFlags, reference: u32) {
        log::trace!("set_stencil_reference({:?}, {})", face_mask, reference);
        self.inner.set_stencil_reference(face_mask, reference);
    }
}
