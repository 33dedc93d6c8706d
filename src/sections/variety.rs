//! Character variety sections - lowercase, uppercase, digits, symbols.

use crate::config::CriteriaPolicy;
use secrecy::{ExposeSecret, SecretString};

/// At least one lowercase letter (ASCII unless `unicode_case` is set).
pub fn lowercase_section(password: &SecretString, policy: &CriteriaPolicy) -> bool {
    let pwd = password.expose_secret();
    if policy.unicode_case {
        pwd.chars().any(char::is_lowercase)
    } else {
        pwd.chars().any(|c| c.is_ascii_lowercase())
    }
}

/// At least one uppercase letter (ASCII unless `unicode_case` is set).
pub fn uppercase_section(password: &SecretString, policy: &CriteriaPolicy) -> bool {
    let pwd = password.expose_secret();
    if policy.unicode_case {
        pwd.chars().any(char::is_uppercase)
    } else {
        pwd.chars().any(|c| c.is_ascii_uppercase())
    }
}

/// At least one of `0-9`.
pub fn digit_section(password: &SecretString, _policy: &CriteriaPolicy) -> bool {
    password.expose_secret().chars().any(|c| c.is_ascii_digit())
}

/// At least one character from the configured symbol set.
pub fn symbol_section(password: &SecretString, policy: &CriteriaPolicy) -> bool {
    password
        .expose_secret()
        .chars()
        .any(|c| policy.symbols.contains(c))
}
