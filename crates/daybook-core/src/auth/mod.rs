//! Authentication module for managing the session credential.
//!
//! This module provides:
//! - `TokenStore`: bearer token persistence with a 24 hour local expiry
//! - `Navigator`: the injected "return to login" action
//! - `Clock`: the time source used for expiry checks
//!
//! Sessions end on logout, on local expiry, or when the server answers 401.

pub mod clock;
pub mod navigator;
pub mod token_store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use navigator::{NavigationHandle, Navigator, NoopNavigator};
pub use token_store::{Credential, TokenStore, EXPIRY_KEY, TOKEN_KEY};
pub(crate) use token_store::TokenLookup;
