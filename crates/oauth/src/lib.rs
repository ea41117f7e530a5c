mod config_dir;
pub mod storage;
pub mod types;

pub use {
    storage::{FileTokenStore, MemoryTokenStore, TokenStorage},
    types::{OAuthClientInfo, OAuthTokens, serialize_option_secret, serialize_secret},
};
