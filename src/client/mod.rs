//! JSON API client
//!
//! [`QuickBase`] binds the operation registry to the HTTP transport. Each
//! call goes through the same steps:
//!
//! - marshal the flat params into path, query and body
//! - resolve the resource id and pick the credential (temporary tokens are
//!   fetched and cached per resource)
//! - send, map non-2xx responses to `Error::Api`
//! - revive ISO-8601 strings into date-times when `convert_dates` is on

mod pending;
mod quickbase;

pub use pending::PendingCall;
pub use quickbase::QuickBase;
