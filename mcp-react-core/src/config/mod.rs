pub mod app;
pub mod error;
pub mod loader;
pub mod provider;
pub mod server;

pub use app::AppConfig;
pub use error::ConfigError;
pub use provider::{ProviderConfig, ProviderOptions};
pub use server::{AuthConfig, ServerAddress, ServerDescriptor, auth_headers};
