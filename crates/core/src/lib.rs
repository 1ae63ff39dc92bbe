//! Core domain types, errors, and constants for `reqcap`.
//!
//! This crate establishes the foundational building blocks shared by the
//! cache, classification, and authentication crates.
//!
//! ## Key Components
//!
//! - **`errors`**: the primary `Error` enum and `Result` type alias,
//!   centralizing all failure modes. Refusals and cache misses are `Option`s,
//!   never errors.
//! - **`clock`**: the `Clock` seam used for TTL bookkeeping, so tests can
//!   drive time deterministically.
//! - **`request`**: the `RequestAttributes` accessor trait through which all
//!   request attribute (header/server-variable) reads flow.
//! - **`credentials`**: credential material with zeroize-on-drop hygiene.
//! - **`constants`**: shared protocol and cache defaults.

pub mod clock;
pub mod constants;
pub mod credentials;
pub mod errors;
pub mod request;

pub use self::{
    clock::{Clock, ManualClock, SystemClock},
    constants::*,
    credentials::Credentials,
    errors::{Error, Result},
    request::{AttributeMap, RequestAttributes},
};
