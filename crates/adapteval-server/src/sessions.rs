use adapteval_core::session::Session;
use moka::sync::Cache;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const SESSION_ID_LEN: usize = 16;

/// Per-session request-scoped state, keyed by an opaque session id.
/// Idle sessions expire; the front end simply opens a new one.
pub struct SessionRegistry {
    inner: Cache<String, Arc<Mutex<Session>>>,
}

impl SessionRegistry {
    pub fn new(capacity: u64, idle: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_idle(idle)
                .build(),
        }
    }

    pub fn open(&self) -> String {
        let mut rng = rand::thread_rng();
        let id: String = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LEN)
            .map(char::from)
            .collect();
        self.inner
            .insert(id.clone(), Arc::new(Mutex::new(Session::new())));
        id
    }

    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Session>>> {
        self.inner.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_get_roundtrips() {
        let registry = SessionRegistry::new(8, Duration::from_secs(60));
        let id = registry.open();
        assert_eq!(id.len(), SESSION_ID_LEN);
        assert!(registry.get(&id).is_some());
        assert!(registry.get("unknown").is_none());
    }
}
