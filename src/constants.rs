/// Application constants

// Signed update message, wallet is appended verbatim
pub const UPDATE_MESSAGE_PREFIX: &str = "Update request for wallet: ";

// Defaults for a wallet with no stored row
pub const DEFAULT_PENDING_TBT: &str = "0";

// Database limits
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_DATABASE_ACQUIRE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DATABASE_QUERY_TIMEOUT_SECS: u64 = 10;

// Allowed browser origins of the game frontends
pub const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "https://api.chaigergame.com,https://chaigergame.com,https://www.chaigergame.com,https://www.chaiger.xyz,https://chaiger.xyz,http://localhost:3000";

// API version
pub const API_VERSION: &str = "v1";
