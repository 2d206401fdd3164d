pub mod actor;
pub mod registry;

pub use actor::{DEFAULT_AUTHOR, DEFAULT_CHANNEL, ForumHandle};
pub use registry::ForumRegistry;

/// Logical name of the single production forum instance. All API
/// traffic funnels through the actor spawned under this name.
pub const FORUM_INSTANCE: &str = "curations-forum";
