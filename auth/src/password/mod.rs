pub mod argon2;
pub mod errors;
pub mod hasher;
pub mod hmac;

pub use errors::PasswordError;
pub use hasher::HashAlgorithm;
pub use hasher::PasswordHasher;
