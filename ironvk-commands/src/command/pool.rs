use crate::command::{
    BeginRenderPass, EndRenderPass, ExecuteCommands, NextSubpass, SetBlendConstants,
    SetDepthBias, SetDepthBounds, SetLineWidth, SetScissor, SetStencilCompareMask,
    SetStencilReference, SetStencilWriteMask, SetViewport,
};

/// Inline clear value capacities of the [`BeginRenderPass`] variants.
pub const CLEAR_VALUE_TIERS: [usize; 3] = [1, 2, 9];
/// Inline attachment capacities of the [`BeginRenderPass`] variants.
pub const ATTACHMENT_TIERS: [usize; 4] = [0, 1, 2, 9];
/// Inline capacities of the [`ExecuteCommands`] variants.
pub const EXECUTE_COMMANDS_TIERS: [usize; 3] = [1, 4, 16];
/// Inline capacities of the [`SetViewport`] and [`SetScissor`] variants.
pub const VIEWPORT_SCISSOR_TIERS: [usize; 3] = [1, 4, 16];

/// Returns the index of the first tier that holds `count` elements.
///
/// The last tier is the fallback for every count that no earlier tier
/// holds. Its elements spill to the heap past its inline capacity.
pub const fn select_tier(count: usize, tiers: &[usize]) -> usize {
    let last = tiers.len() - 1;
    let mut index = 0;
    while index < last {
        if count <= tiers[index] {
            return index;
        }
        index += 1;
    }
    last
}

/// Environment variable that turns command pooling on or off.
pub const COMMAND_POOLING_ENV: &str = "IRONVK_COMMAND_POOLING";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandPoolCreateInfo {
    /// Keep released commands for reuse instead of dropping them.
    pub pooling: bool,
}

impl Default for CommandPoolCreateInfo {
    fn default() -> Self {
        Self { pooling: true }
    }
}

impl CommandPoolCreateInfo {
    /// Reads the configuration from the environment, using the defaults for
    /// anything that is not set.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(COMMAND_POOLING_ENV).ok().as_deref())
    }

    /// Builds the configuration from the value of [`COMMAND_POOLING_ENV`], if set.
    fn from_value(pooling: Option<&str>) -> Self {
        let mut info = Self::default();
        if let Some(value) = pooling {
            match parse_bool(value) {
                Some(pooling) => info.pooling = pooling,
                None => log::warn!(
                    "Ignoring {}={:?}, expected a boolean",
                    COMMAND_POOLING_ENV,
                    value
                ),
            }
        }
        info
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// The free list of one concrete command type.
pub struct TypePool<C> {
    free: Vec<Box<C>>,
    pooling: bool,
}

impl<C: Default> TypePool<C> {
    fn new(pooling: bool) -> Self {
        Self {
            free: Vec::new(),
            pooling,
        }
    }

    /// Takes a command from the free list, or allocates a new one.
    pub fn acquire(&mut self) -> Box<C> {
        self.free.pop().unwrap_or_else(Box::default)
    }

    /// Hands a command back. It is dropped if pooling is disabled.
    pub fn release(&mut self, command: Box<C>) {
        if self.pooling {
            self.free.push(command);
        }
    }

    /// Drops every command on the free list.
    pub fn trim(&mut self) {
        self.free = Vec::new();
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }
}

/// A command type that is allocated from a [`CommandPool`].
///
/// Implemented for every concrete [`Command`](crate::command::Command) variant.
pub trait PooledCommand: Default + Sized + Send + 'static {
    /// Returns the free list this command type is kept in.
    fn type_pool(pool: &mut CommandPool) -> &mut TypePool<Self>;
}

pub type BeginRenderPass10 = BeginRenderPass<1, 0>;
pub type BeginRenderPass20 = BeginRenderPass<2, 0>;
pub type BeginRenderPassMulti0 = BeginRenderPass<9, 0>;
pub type BeginRenderPass11 = BeginRenderPass<1, 1>;
pub type BeginRenderPass21 = BeginRenderPass<2, 1>;
pub type BeginRenderPassMulti1 = BeginRenderPass<9, 1>;
pub type BeginRenderPass12 = BeginRenderPass<1, 2>;
pub type BeginRenderPass22 = BeginRenderPass<2, 2>;
pub type BeginRenderPassMulti2 = BeginRenderPass<9, 2>;
pub type BeginRenderPass1Multi = BeginRenderPass<1, 9>;
pub type BeginRenderPass2Multi = BeginRenderPass<2, 9>;
pub type BeginRenderPassMultiMulti = BeginRenderPass<9, 9>;

pub type ExecuteCommands1 = ExecuteCommands<1>;
pub type ExecuteCommands4 = ExecuteCommands<4>;
pub type ExecuteCommandsMulti = ExecuteCommands<16>;

pub type SetViewport1 = SetViewport<1>;
pub type SetViewport4 = SetViewport<4>;
pub type SetViewportMulti = SetViewport<16>;

pub type SetScissor1 = SetScissor<1>;
pub type SetScissor4 = SetScissor<4>;
pub type SetScissorMulti = SetScissor<16>;

macro_rules! command_type_pools {
    ($($field:ident: $ty:ty,)*) => {
        struct CommandTypePools {
            $($field: TypePool<$ty>,)*
        }

        impl CommandTypePools {
            fn new(pooling: bool) -> Self {
                Self {
                    $($field: TypePool::new(pooling),)*
                }
            }

            fn trim(&mut self) {
                $(self.$field.trim();)*
            }

            fn free_count(&self) -> usize {
                0 $(+ self.$field.free_count())*
            }
        }

        $(
            impl PooledCommand for $ty {
                #[inline]
                fn type_pool(pool: &mut CommandPool) -> &mut TypePool<Self> {
                    &mut pool.types.$field
                }
            }
        )*
    };
}

command_type_pools! {
    begin_render_pass_10: BeginRenderPass10,
    begin_render_pass_20: BeginRenderPass20,
    begin_render_pass_multi_0: BeginRenderPassMulti0,
    begin_render_pass_11: BeginRenderPass11,
    begin_render_pass_21: BeginRenderPass21,
    begin_render_pass_multi_1: BeginRenderPassMulti1,
    begin_render_pass_12: BeginRenderPass12,
    begin_render_pass_22: BeginRenderPass22,
    begin_render_pass_multi_2: BeginRenderPassMulti2,
    begin_render_pass_1_multi: BeginRenderPass1Multi,
    begin_render_pass_2_multi: BeginRenderPass2Multi,
    begin_render_pass_multi_multi: BeginRenderPassMultiMulti,
    next_subpass: NextSubpass,
    end_render_pass: EndRenderPass,
    execute_commands_1: ExecuteCommands1,
    execute_commands_4: ExecuteCommands4,
    execute_commands_multi: ExecuteCommandsMulti,
    set_viewport_1: SetViewport1,
    set_viewport_4: SetViewport4,
    set_viewport_multi: SetViewportMulti,
    set_scissor_1: SetScissor1,
    set_scissor_4: SetScissor4,
    set_scissor_multi: SetScissorMulti,
    set_line_width: SetLineWidth,
    set_depth_bias: SetDepthBias,
    set_blend_constants: SetBlendConstants,
    set_depth_bounds: SetDepthBounds,
    set_stencil_compare_mask: SetStencilCompareMask,
    set_stencil_write_mask: SetStencilWriteMask,
    set_stencil_reference: SetStencilReference,
}

/// Keeps released commands of every type for reuse.
///
/// A pool is not synchronized. Command buffers that record on different
/// threads need their own pools.
pub struct CommandPool {
    types: CommandTypePools,
    pooling: bool,
}

static_assertions::assert_impl_all!(CommandPool: Send);

impl Default for CommandPool {
    fn default() -> Self {
        Self::new(CommandPoolCreateInfo::default())
    }
}

impl CommandPool {
    pub fn new(create_info: CommandPoolCreateInfo) -> Self {
        log::debug!("Creating command pool (pooling: {})", create_info.pooling);
        Self {
            types: CommandTypePools::new(create_info.pooling),
            pooling: create_info.pooling,
        }
    }

    #[inline]
    pub fn is_pooling(&self) -> bool {
        self.pooling
    }

    /// Takes a command of type `C` from its free list, or allocates a new one.
    #[inline]
    pub fn acquire<C: PooledCommand>(&mut self) -> Box<C> {
        C::type_pool(self).acquire()
    }

    #[inline]
    pub fn release<C: PooledCommand>(&mut self, command: Box<C>) {
        C::type_pool(self).release(command);
    }

    /// Frees every command that is not currently recorded.
    pub fn trim(&mut self) {
        log::debug!("Trimming command pool ({} free commands)", self.free_count());
        self.types.trim();
    }

    /// The number of commands waiting for reuse, over all types.
    pub fn free_count(&self) -> usize {
        self.types.free_count()
    }

    /// The number of commands of type `C` waiting for reuse.
    pub fn free_count_of<C: PooledCommand>(&mut self) -> usize {
        C::type_pool(self).free_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_tier_picks_first_tier_that_fits() {
        assert_eq!(select_tier(0, &CLEAR_VALUE_TIERS), 0);
        assert_eq!(select_tier(1, &CLEAR_VALUE_TIERS), 0);
        assert_eq!(select_tier(2, &CLEAR_VALUE_TIERS), 1);
        assert_eq!(select_tier(3, &CLEAR_VALUE_TIERS), 2);
        assert_eq!(select_tier(9, &CLEAR_VALUE_TIERS), 2);
    }

    #[test]
    fn test_select_tier_falls_back_to_last_tier() {
        assert_eq!(select_tier(10, &CLEAR_VALUE_TIERS), 2);
        assert_eq!(select_tier(1000, &EXECUTE_COMMANDS_TIERS), 2);
        assert_eq!(select_tier(0, &ATTACHMENT_TIERS), 0);
        assert_eq!(select_tier(5, &EXECUTE_COMMANDS_TIERS), 2);
    }

    #[test]
    fn test_select_tier_is_deterministic() {
        for count in 0..40 {
            assert_eq!(
                select_tier(count, &VIEWPORT_SCISSOR_TIERS),
                select_tier(count, &VIEWPORT_SCISSOR_TIERS)
            );
        }
    }

    #[test]
    fn test_tiers_match_variant_capacities() {
        assert_eq!(BeginRenderPass10::CLEAR_VALUE_CAPACITY, CLEAR_VALUE_TIERS[0]);
        assert_eq!(ExecuteCommandsMulti::CAPACITY, EXECUTE_COMMANDS_TIERS[2]);
        assert_eq!(ExecuteCommands4::CAPACITY, EXECUTE_COMMANDS_TIERS[1]);
        assert_eq!(SetViewportMulti::CAPACITY, VIEWPORT_SCISSOR_TIERS[2]);
        assert_eq!(SetScissor1::CAPACITY, VIEWPORT_SCISSOR_TIERS[0]);
        assert_eq!(BeginRenderPassMultiMulti::CLEAR_VALUE_CAPACITY, CLEAR_VALUE_TIERS[2]);
        assert_eq!(BeginRenderPass2Multi::ATTACHMENT_CAPACITY, ATTACHMENT_TIERS[3]);
        assert_eq!(BeginRenderPass10::ATTACHMENT_CAPACITY, ATTACHMENT_TIERS[0]);
    }

    #[test]
    fn test_released_commands_are_reused() {
        let mut pool = CommandPool::default();
        let command = pool.acquire::<SetLineWidth>();
        let address = &*command as *const SetLineWidth;

        pool.release(command);
        assert_eq!(pool.free_count_of::<SetLineWidth>(), 1);

        let command = pool.acquire::<SetLineWidth>();
        assert_eq!(&*command as *const SetLineWidth, address);
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_pools_are_kept_per_type() {
        let mut pool = CommandPool::default();
        let small = pool.acquire::<ExecuteCommands1>();
        pool.release(small);

        assert_eq!(pool.free_count_of::<ExecuteCommands1>(), 1);
        assert_eq!(pool.free_count_of::<ExecuteCommandsMulti>(), 0);
    }

    #[test]
    fn test_without_pooling_released_commands_are_dropped() {
        let mut pool = CommandPool::new(CommandPoolCreateInfo { pooling: false });
        let command = pool.acquire::<EndRenderPass>();
        pool.release(command);

        assert!(!pool.is_pooling());
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_trim_empties_all_free_lists() {
        let mut pool = CommandPool::default();
        let a = pool.acquire::<NextSubpass>();
        let b = pool.acquire::<SetViewport4>();
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.free_count(), 2);

        pool.trim();
        assert_eq!(pool.free_count(), 0);
    }

    #[test]
    fn test_pooling_defaults_to_enabled_when_unset() {
        assert!(CommandPoolCreateInfo::from_value(None).pooling);
    }

    #[test]
    fn test_pooling_can_be_disabled_from_environment_value() {
        assert!(!CommandPoolCreateInfo::from_value(Some("0")).pooling);
        assert!(!CommandPoolCreateInfo::from_value(Some("off")).pooling);
        assert!(!CommandPoolCreateInfo::from_value(Some("FALSE")).pooling);
        assert!(CommandPoolCreateInfo::from_value(Some("1")).pooling);
    }

    #[test]
    fn test_invalid_pooling_value_falls_back_to_default() {
        assert_eq!(
            CommandPoolCreateInfo::from_value(Some("sometimes")),
            CommandPoolCreateInfo::default()
        );
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool(" Off "), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("maybe"), None);
    }
}
