//! SQL identifier validation.
//!
//! Table and column names are interpolated into statement text; values are
//! always bound. Anything that is not a bare identifier is rejected before
//! SQL assembly.

/// A name that cannot be used as a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid SQL identifier: '{0}'")]
pub struct IdentifierError(pub String);

/// Accepts `[A-Za-z_][A-Za-z0-9_]*`, returning the input on success.
pub fn validate_identifier(name: &str) -> Result<&str, IdentifierError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(name)
    } else {
        Err(IdentifierError(name.to_owned()))
    }
}
