//! Authentication state shared between the API clients and their callers.

mod context;
mod store;
pub(crate) mod token;

pub use context::{Session, SessionReader, SessionWriter, User, channel};
pub use store::{SessionStore, StoreError};
pub use token::{AccessToken, Claims, TokenError};
