//! JWT issuance, verification and revocation.

pub mod blocklist;
pub mod claims;
pub mod decoder;
pub mod encoder;

pub use blocklist::TokenBlocklist;
pub use claims::Claims;
pub use decoder::JwtDecoder;
pub use encoder::{IssuedToken, JwtEncoder};
