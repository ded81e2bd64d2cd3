//! Token secrets and the rotating token state owned by the client.

pub mod secret;
pub mod state;
