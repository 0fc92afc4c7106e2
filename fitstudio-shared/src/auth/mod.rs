/// Account credential utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation

pub mod password;
