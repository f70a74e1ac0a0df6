//! Dynamic pipeline state commands.

use crate::{
    command::{Command, CommandKind, CommandPool, EncodeContext, PooledCommand, RecordContext},
    error::CommandResult,
    pooled_vec::PooledVec,
    types::{Rect2D, StencilFaceFlags, Viewport},
};

#[derive(Debug, Default)]
pub struct SetViewport<const N: usize> {
    first_viewport: u32,
    viewports: PooledVec<Viewport, N>,
}

impl<const N: usize> SetViewport<N> {
    pub const CAPACITY: usize = N;

    pub fn set_content(
        &mut self,
        _cmd_buffer: &RecordContext<'_>,
        first_viewport: u32,
        viewports: &[Viewport],
    ) -> CommandResult {
        self.first_viewport = first_viewport;
        self.viewports.assign(viewports);
        Ok(())
    }

    #[inline]
    pub fn first_viewport(&self) -> u32 {
        self.first_viewport
    }

    #[inline]
    pub fn viewports(&self) -> &PooledVec<Viewport, N> {
        &self.viewports
    }
}

impl<const N: usize> Command for SetViewport<N>
where
    Self: PooledCommand,
{
    fn kind(&self) -> CommandKind {
        CommandKind::SetViewport
    }

    fn encode(&self, ctx: &mut EncodeContext<'_>) {
        ctx.encoder()
            .set_viewport(self.first_viewport, self.viewports.contents());
    }

    fn return_to_pool(self: Box<Self>, pool: &mut CommandPool) {
        Self::type_pool(pool).release(self);
    }
}

#[derive(Debug, Default)]
pub struct SetScissor<const N: usize> {
    first_scissor: u32,
    scissors: PooledVec<Rect2D, N>,
}

impl<const N: usize> SetScissor<N> {
    pub const CAPACITY: usize = N;

    pub fn set_content(
        &mut self,
        _cmd_buffer: &RecordContext<'_>,
        first_scissor: u32,
        scissors: &[Rect2D],
    ) -> CommandResult {
        self.first_scissor = first_scissor;
        self.scissors.assign(scissors);
        Ok(())
    }

    #[inline]
    pub fn first_scissor(&self) -> u32 {
        self.first_scissor
    }

    #[inline]
    pub fn scissors(&self) -> &PooledVec<Rect2D, N> {
        &self.scissors
    }
}

impl<const N: usize> Command for SetScissor<N>
where
    Self: PooledCommand,
{
    fn kind(&self) -> CommandKind {
        CommandKind::SetScissor
    }

    fn encode(&self, ctx: &mut EncodeContext<'_>) {
        ctx.encoder()
            .set_scissor(self.first_scissor, self.scissors.contents());
    }

    fn return_to_pool(self: Box<Self>, pool: &mut CommandPool) {
        Self::type_pool(pool).release(self);
    }
}

#[derive(Debug, Default)]
pub struct SetLineWidth {
    line_width: f32,
}

impl SetLineWidth {
    pub fn set_content(
        &mut self,
        _cmd_buffer: &RecordContext<'_>,
        line_width: f32,
    ) -> CommandResult {
        self.line_width = line_width;
        Ok(())
    }

    #[inline]
    pub fn line_width(&self) -> f32 {
        self.line_width
    }
}

impl Command for SetLineWidth {
    fn kind(&self) -> CommandKind {
        CommandKind::SetLineWidth
    }

    fn encode(&self, ctx: &mut EncodeContext<'_>) {
        ctx.encoder().set_line_width(self.line_width);
    }

    fn return_to_pool(self: Box<Self>, pool: &mut CommandPool) {
        Self::type_pool(pool).release(self);
    }
}

#[derive(Debug, Default)]
pub struct SetDepthBias {
    constant_factor: f32,
    clamp: f32,
    slope_factor: f32,
}

impl SetDepthBias {
    pub fn set_content(
        &mut self,
        _cmd_buffer: &RecordContext<'_>,
        constant_factor: f32,
        clamp: f32,
        slope_factor: f32,
    ) -> CommandResult {
        self.constant_factor = constant_factor;
        self.clamp = clamp;
        self.slope_factor = slope_factor;
        Ok(())
    }
}

impl Command for SetDepthBias {
    fn kind(&self) -> CommandKind {
        CommandKind::SetDepthBias
    }

    fn encode(&self, ctx: &mut EncodeContext<'_>) {
        ctx.encoder()
            .set_depth_bias(self.constant_factor, self.clamp, self.slope_factor);
    }

    fn return_to_pool(self: Box<Self>, pool: &mut CommandPool) {
        Self::type_pool(pool).release(self);
    }
}

#[derive(Debug, Default)]
pub struct SetBlendConstants {
    blend_constants: [f32; 4],
}

impl SetBlendConstants {
    /// Captures the RGBA blend constants.
    pub fn set_content(
        &mut self,
        _cmd_buffer: &RecordContext<'_>,
        blend_constants: [f32; 4],
    ) -> CommandResult {
        self.blend_constants = blend_constants;
        Ok(())
    }
}

impl Command for SetBlendConstants {
    fn kind(&self) -> CommandKind {
        CommandKind::SetBlendConstants
    }

    fn encode(&self, ctx: &mut EncodeContext<'_>) {
        ctx.encoder().set_blend_constants(self.blend_constants);
    }

    fn return_to_pool(self: Box<Self>, pool: &mut CommandPool) {
        Self::type_pool(pool).release(self);
    }
}

#[derive(Debug, Default)]
pub struct SetDepthBounds {
    min_depth_bounds: f32,
    max_depth_bounds: f32,
}

impl SetDepthBounds {
    pub fn set_content(
        &mut self,
        _cmd_buffer: &RecordContext<'_>,
        min_depth_bounds: f32,
        max_depth_bounds: f32,
    ) -> CommandResult {
        if min_depth_bounds > max_depth_bounds {
            log::warn!(
                "Depth bounds minimum {} is greater than maximum {}",
                min_depth_bounds,
                max_depth_bounds
            );
        }

        self.min_depth_bounds = min_depth_bounds;
        self.max_depth_bounds = max_depth_bounds;
        Ok(())
    }
}

impl Command for SetDepthBounds {
    fn kind(&self) -> CommandKind {
        CommandKind::SetDepthBounds
    }

    fn encode(&self, ctx: &mut EncodeContext<'_>) {
        ctx.encoder()
            .set_depth_bounds(self.min_depth_bounds, self.max_depth_bounds);
    }

    fn return_to_pool(self: Box<Self>, pool: &mut CommandPool) {
        Self::type_pool(pool).release(self);
    }
}

// The three stencil commands share their shape: a face selection and a value.
macro_rules! stencil_command {
    ($(#[$meta:meta])* $ident:ident, $kind:ident, $value:ident, $encode:ident) => {
        $(#[$meta])*
        #[derive(Debug, Default)]
        pub struct $ident {
            face_mask: StencilFaceFlags,
            $value: u32,
        }

        impl $ident {
            pub fn set_content(
                &mut self,
                _cmd_buffer: &RecordContext<'_>,
                face_mask: StencilFaceFlags,
                $value: u32,
            ) -> CommandResult {
                self.face_mask = face_mask;
                self.$value = $value;
                Ok(())
            }

            #[inline]
            pub fn face_mask(&self) -> StencilFaceFlags {
                self.face_mask
            }

            #[inline]
            pub fn $value(&self) -> u32 {
                self.$value
            }
        }

        impl Command for $ident {
            fn kind(&self) -> CommandKind {
                CommandKind::$kind
            }

            fn encode(&self, ctx: &mut EncodeContext<'_>) {
                ctx.encoder().$encode(self.face_mask, self.$value);
            }

            fn return_to_pool(self: Box<Self>, pool: &mut CommandPool) {
                Self::type_pool(pool).release(self);
            }
        }
    };
}

stencil_command!(
    SetStencilCompareMask,
    SetStencilCompareMask,
    compare_mask,
    set_stencil_compare_mask
);
stencil_command!(SetStencilWriteMask, SetStencilWriteMask, write_mask, set_stencil_write_mask);
stencil_command!(
    /// Sets the stencil reference value of the selected faces.
    SetStencilReference,
    SetStencilReference,
    reference,
    set_stencil_reference
);
