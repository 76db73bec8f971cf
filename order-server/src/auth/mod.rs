//! Authentication
//!
//! Token issuance belongs to the upstream auth layer; this module only
//! validates bearer tokens and exposes the authenticated identity as
//! [`CurrentUser`], both for HTTP handlers (via extractor) and for the
//! WebSocket handshake.

mod extractor;
mod jwt;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
