//! The objects commands refer to without owning them.
//!
//! Render passes, framebuffers and image views are created and destroyed by
//! the rest of the driver. Commands only keep an [`ObjectId`] to them, and the
//! caller keeps the object alive from recording until replay has finished.

use std::{hash::{Hash, Hasher}, marker::PhantomData};

use ash::vk;
use slotmap::{DefaultKey, Key, SlotMap};
use smallvec::SmallVec;

use crate::types::Extent2D;

/// A non-owning reference to an object stored in an [`ObjectStorage`].
pub struct ObjectId<T> {
    key: DefaultKey,
    phantom: PhantomData<fn() -> T>,
}

impl<T> ObjectId<T> {
    #[inline]
    fn new(key: DefaultKey) -> Self {
        Self { key, phantom: PhantomData }
    }

    /// An id that never resolves to an object.
    #[inline]
    pub fn null() -> Self {
        Self::new(DefaultKey::null())
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.key.is_null()
    }
}

impl<T> Default for ObjectId<T> {
    #[inline]
    fn default() -> Self {
        Self::null()
    }
}

impl<T> std::fmt::Debug for ObjectId<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = std::any::type_name::<T>().rsplit("::").next().unwrap_or("?");
        write!(f, "ObjectId<{}>({:?})", name, self.key)
    }
}

impl<T> Copy for ObjectId<T> {}

impl<T> Clone for ObjectId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for ObjectId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for ObjectId<T> {}

impl<T> Hash for ObjectId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// A table of objects addressed by [`ObjectId`].
pub struct ObjectStorage<T> {
    objects: SlotMap<DefaultKey, T>,
}

impl<T> Default for ObjectStorage<T> {
    #[inline]
    fn default() -> Self {
        Self { objects: SlotMap::new() }
    }
}

impl<T> ObjectStorage<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new object into the storage.
    pub fn insert(&mut self, object: T) -> ObjectId<T> {
        ObjectId::new(self.objects.insert(object))
    }

    /// Removes an object from the storage.
    pub fn remove(&mut self, id: ObjectId<T>) -> Option<T> {
        self.objects.remove(id.key)
    }

    pub fn get(&self, id: ObjectId<T>) -> Option<&T> {
        self.objects.get(id.key)
    }

    pub fn get_mut(&mut self, id: ObjectId<T>) -> Option<&mut T> {
        self.objects.get_mut(id.key)
    }

    pub fn contains(&self, id: ObjectId<T>) -> bool {
        self.objects.contains_key(id.key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates over the ids of all stored objects.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = ObjectId<T>> + '_ {
        self.objects.keys().map(ObjectId::new)
    }
}

pub type RenderPassId = ObjectId<RenderPass>;
pub type FramebufferId = ObjectId<Framebuffer>;
pub type ImageViewId = ObjectId<ImageView>;

/// The parts of a render pass descriptor the command stream cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderPass {
    subpass_count: u32,
}

impl RenderPass {
    pub fn new(subpass_count: u32) -> Self {
        Self { subpass_count: subpass_count.max(1) }
    }

    #[inline]
    pub fn subpass_count(&self) -> u32 {
        self.subpass_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageView {
    pub format: vk::Format,
    pub extent: Extent2D,
}

impl ImageView {
    pub fn new(format: vk::Format, extent: Extent2D) -> Self {
        Self { format, extent }
    }
}

/// A framebuffer and its declared attachments.
///
/// An imageless framebuffer declares no attachments. Its views are supplied
/// when a render pass begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    extent: Extent2D,
    layers: u32,
    attachments: SmallVec<[ImageViewId; 8]>,
}

impl Framebuffer {
    pub fn new(
        extent: Extent2D,
        layers: u32,
        attachments: impl IntoIterator<Item = ImageViewId>,
    ) -> Self {
        Self {
            extent,
            layers,
            attachments: attachments.into_iter().collect(),
        }
    }

    pub fn imageless(extent: Extent2D, layers: u32) -> Self {
        Self::new(extent, layers, [])
    }

    #[inline]
    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    #[inline]
    pub fn layer_count(&self) -> u32 {
        self.layers
    }

    #[inline]
    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }

    #[inline]
    pub fn attachment(&self, index: usize) -> Option<ImageViewId> {
        self.attachments.get(index).copied()
    }

    #[inline]
    pub fn attachments(&self) -> &[ImageViewId] {
        &self.attachments
    }
}

/// The tables of externally owned objects, shared by recording and replay.
#[derive(Default)]
pub struct ObjectRegistry {
    pub render_passes: ObjectStorage<RenderPass>,
    pub framebuffers: ObjectStorage<Framebuffer>,
    pub image_views: ObjectStorage<ImageView>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}
