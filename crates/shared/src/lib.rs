//! Types shared between the game client crates: identifiers, screens, and
//! the JSON contract spoken with the remote game server.

pub mod domain;
pub mod error;
pub mod protocol;
