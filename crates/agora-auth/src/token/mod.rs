//! Signed token issuance and verification.

pub mod claims;
pub mod codec;

pub use claims::{AccessClaims, RefreshClaims};
pub use codec::TokenCodec;
