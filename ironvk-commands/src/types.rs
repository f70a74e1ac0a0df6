use ash::vk;

use crate::{vk_enum, vk_enum_flags};

vk_enum! {
    /// How the commands of a subpass are provided.
    #[derive(Default)]
    pub enum SubpassContents: vk::SubpassContents {
        /// Commands are recorded directly into the primary command buffer.
        #[default]
        Inline => INLINE,
        /// Commands are provided by executing secondary command buffers.
        SecondaryCommandBuffers => SECONDARY_COMMAND_BUFFERS,
    }
}

vk_enum! {
    #[derive(Default)]
    pub enum CommandBufferLevel: vk::CommandBufferLevel {
        #[default]
        Primary => PRIMARY,
        Secondary => SECONDARY,
    }
}

vk_enum_flags! {
    /// Selects the stencil faces a stencil state command applies to.
    pub struct StencilFaceFlags: vk::StencilFaceFlags {
        FRONT => FRONT,
        BACK => BACK,
        FRONT_AND_BACK => FRONT_AND_BACK,
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn to_vk(self) -> vk::Extent2D {
        vk::Extent2D {
            width: self.width,
            height: self.height,
        }
    }

    #[inline]
    pub const fn from_vk(extent: vk::Extent2D) -> Self {
        Self {
            width: extent.width,
            height: extent.height,
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect2D {
    pub offset: [i32; 2],
    pub extent: Extent2D,
}

impl Rect2D {
    pub const fn new(offset: [i32; 2], extent: Extent2D) -> Self {
        Self { offset, extent }
    }

    pub fn from_vk(rect: vk::Rect2D) -> Self {
        Self {
            offset: [rect.offset.x, rect.offset.y],
            extent: Extent2D::from_vk(rect.extent),
        }
    }

    pub fn to_vk(self) -> vk::Rect2D {
        vk::Rect2D {
            offset: vk::Offset2D {
                x: self.offset[0],
                y: self.offset[1],
            },
            extent: self.extent.to_vk(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// A viewport covering `extent` with the full `[0, 1]` depth range.
    pub fn from_extent(extent: Extent2D) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }

    pub fn from_vk(viewport: vk::Viewport) -> Self {
        Self {
            x: viewport.x,
            y: viewport.y,
            width: viewport.width,
            height: viewport.height,
            min_depth: viewport.min_depth,
            max_depth: viewport.max_depth,
        }
    }

    pub fn to_vk(self) -> vk::Viewport {
        vk::Viewport {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
        }
    }
}

/// The clear value of a single attachment.
///
/// Unlike [`vk::ClearValue`] this knows which member is active, so it can be
/// compared and printed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    Color([f32; 4]),
    ColorInt([i32; 4]),
    ColorUint([u32; 4]),
    DepthStencil { depth: f32, stencil: u32 },
}

impl Default for ClearValue {
    fn default() -> Self {
        Self::Color([0.0; 4])
    }
}

impl ClearValue {
    pub fn to_vk(self) -> vk::ClearValue {
        match self {
            Self::Color(float32) => vk::ClearValue {
                color: vk::ClearColorValue { float32 },
            },
            Self::ColorInt(int32) => vk::ClearValue {
                color: vk::ClearColorValue { int32 },
            },
            Self::ColorUint(uint32) => vk::ClearValue {
                color: vk::ClearColorValue { uint32 },
            },
            Self::DepthStencil { depth, stencil } => vk::ClearValue {
                depth_stencil: vk::ClearDepthStencilValue { depth, stencil },
            },
        }
    }
}

/// Arguments that accompany the start of a subpass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubpassBeginInfo {
    pub contents: SubpassContents,
}

impl SubpassBeginInfo {
    pub const fn new(contents: SubpassContents) -> Self {
        Self { contents }
    }

    /// Returns `None` if the contents are not a value this crate models.
    pub fn from_vk(info: &vk::SubpassBeginInfo<'_>) -> Option<Self> {
        SubpassContents::from_vk(info.contents).map(Self::new)
    }

    pub fn to_vk(self) -> vk::SubpassBeginInfo<'static> {
        vk::SubpassBeginInfo::default().contents(self.contents.to_vk())
    }
}

/// Arguments that accompany the end of a subpass.
///
/// Carries no data that recording or replay consumes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubpassEndInfo;

impl SubpassEndInfo {
    pub fn to_vk(self) -> vk::SubpassEndInfo<'static> {
        vk::SubpassEndInfo::default()
    }
}
