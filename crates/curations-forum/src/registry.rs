use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use curations_kv::KvStore;

use crate::actor::{self, ForumHandle};

/// Resolves logical forum names to running actors, spawning each on
/// first use. Callers asking for the same name always reach the same
/// task, so per-name serialization holds across the whole process.
pub struct ForumRegistry {
    store: Arc<KvStore>,
    actors: Mutex<HashMap<String, ForumHandle>>,
}

impl ForumRegistry {
    pub fn new(store: Arc<KvStore>) -> Self {
        Self {
            store,
            actors: Mutex::new(HashMap::new()),
        }
    }

    /// Handle for the named instance. Each name owns a private
    /// `forum:<name>` namespace, so instances never share state.
    pub fn get_or_spawn(&self, name: &str) -> ForumHandle {
        let mut actors = self.actors.lock().unwrap_or_else(|e| e.into_inner());
        actors
            .entry(name.to_string())
            .or_insert_with(|| actor::spawn(self.store.namespace(format!("forum:{name}"))))
            .clone()
    }
}
