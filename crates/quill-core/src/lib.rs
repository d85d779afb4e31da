// Configuration types shared across all Quill crates
pub mod config;

// Re-export commonly used config types for convenience
pub use config::{
    AuditConfig, ConfigError, ConnectionPoolConfig, QuillConfig, SinkBackend, SinkConfig,
    UpstreamConfig,
};
