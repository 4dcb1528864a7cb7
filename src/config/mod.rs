pub mod session_config;
pub mod session_options;

pub use session_config::SessionConfig;
pub use session_options::SessionOptions;
