/// Constants shared across the reqcap crates
use std::time::Duration;

// Cache defaults
pub const DEFAULT_RESULT_TTL: Duration = Duration::from_secs(60);

// HTTP status the server keeps answering while a handshake is in flight
pub const CHALLENGING_STATUS: u16 = 401;

// Hard cap on combined username+password+domain length. Guards a known
// lower-layer buffer issue in token generation, not a real protocol limit.
pub const MAX_COMBINED_CREDENTIAL_LEN: usize = 527;
