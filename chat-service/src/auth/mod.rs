//! Password hashing and access token generation
//!
//! # Example
//!
//! ```rust,ignore
//! use chat_service::auth::{JwtIssuer, PasswordHasher, TokenGenerator};
//! use chat_service::middleware::Claims;
//!
//! let hasher = PasswordHasher::new(&config.password)?;
//! let hash = hasher.hash("my_secure_password")?;
//! assert!(hasher.verify("my_secure_password", &hash)?);
//!
//! let issuer = JwtIssuer::new(&config.jwt)?;
//! let token = issuer.generate_token(&Claims::new(user.id, &user.role, user.organization_id))?;
//! ```

pub mod password;
pub mod tokens;

pub use password::PasswordHasher;
pub use tokens::{JwtIssuer, TokenGenerator};
