use std::env;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub timeout_ms: u64,
    pub max_msg_bytes: usize,
    pub session_capacity: u64,
    pub session_idle_secs: u64,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_msg_bytes: 1_000_000,
            session_capacity: 1024,
            session_idle_secs: 3600,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = env::var("ADAPTEVAL_TIMEOUT_MS") {
            if let Ok(n) = v.parse() {
                cfg.timeout_ms = n;
            }
        }
        if let Ok(v) = env::var("ADAPTEVAL_MAX_BYTES") {
            if let Ok(n) = v.parse() {
                cfg.max_msg_bytes = n;
            }
        }
        if let Ok(v) = env::var("ADAPTEVAL_SESSION_CAPACITY") {
            if let Ok(n) = v.parse() {
                cfg.session_capacity = n;
            }
        }
        if let Ok(v) = env::var("ADAPTEVAL_SESSION_IDLE_SECS") {
            if let Ok(n) = v.parse() {
                cfg.session_idle_secs = n;
            }
        }
        if let Ok(v) = env::var("ADAPTEVAL_LOG") {
            cfg.log_level = v;
        }
        cfg
    }
}
