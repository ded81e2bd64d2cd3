//! Client credentials and the token state they refresh.

pub mod credentials;
pub mod token;

pub use credentials::*;
pub use token::{secret::*, state::*};
