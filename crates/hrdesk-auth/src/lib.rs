//! # hrdesk-auth
//!
//! Authentication and authorization for HRDesk.
//!
//! - [`password`]: PBKDF2 hashing and password policy
//! - [`jwt`]: session token issuance, verification and revocation
//! - [`role`]: role resolution from the `admin` and `company_user` tables
//! - [`reset`]: one-time reset tokens and their e-mails
//! - [`policy`]: the typed mirror of the row-level security policies
//! - [`manager`]: the server-side auth flows
//! - [`client`]: the client-side session provider

pub mod client;
pub mod jwt;
pub mod manager;
pub mod password;
pub mod policy;
pub mod reset;
pub mod role;
pub mod store;

pub use client::{AuthSession, SessionState};
pub use manager::{AuthManager, SignUp, SignedIn, VerifiedSession};
pub use policy::{Action, PolicyEnforcer, RowScope, Table};
pub use role::RoleResolver;
