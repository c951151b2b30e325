use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;
use uuid::Uuid;

/// Length of generated replacement passwords.
pub const GENERATED_PASSWORD_LENGTH: usize = 32;

/// Fresh per-user password salt.
pub fn generate_salt() -> String {
    Uuid::new_v4().to_string()
}

/// Fresh refresh-token rotation identifier.
pub fn generate_rotation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Random alphanumeric password drawn from the OS RNG.
pub fn generate_password(length: usize) -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}
