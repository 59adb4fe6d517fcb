mod claims;
pub mod jwt;
pub mod password;

pub use jwt::{JwtKeys, TokenError};
pub use password::hash_password;
