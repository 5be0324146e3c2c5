//! Protocol module containing the wire token codec.

pub mod wire;

pub use wire::{decode_token, encode_token, Direction, WireError, WireToken};
