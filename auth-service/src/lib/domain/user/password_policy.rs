const MIN_LENGTH: usize = 8;
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Whether `password` satisfies the account password policy.
///
/// Requires at least eight characters with one uppercase letter, one
/// lowercase letter, one digit and one symbol from `SYMBOLS`.
pub fn is_password_secure(password: &str) -> bool {
    password.chars().count() >= MIN_LENGTH
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_numeric())
        && password.chars().any(|c| SYMBOLS.contains(c))
}
