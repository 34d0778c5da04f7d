//! Local form validation. Nothing here talks to a gateway.

use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

/// Checks a registration form: mismatch first, then length, then blank fields.
pub fn validate_registration(
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    if email.trim().is_empty() {
        return Err(ValidationError::MissingCredentials);
    }
    Ok(())
}

/// Returns the trimmed pair to store.
pub fn validate_new_word(french: &str, english: &str) -> Result<(String, String), ValidationError> {
    let french = french.trim();
    if french.is_empty() {
        return Err(ValidationError::MissingFrenchWord);
    }
    Ok((french.to_string(), english.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        assert_eq!(
            validate_login("", "secret"),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(
            validate_login("a@b.c", ""),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(
            validate_login("a@b.c", "   "),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(validate_login("a@b.c", "secret"), Ok(()));
    }

    #[test]
    fn test_short_matching_password_is_too_short() {
        assert_eq!(
            validate_registration("a@b.c", "abc", "abc"),
            Err(ValidationError::PasswordTooShort { min: 6 })
        );
    }

    #[test]
    fn test_mismatch_reported_before_length() {
        assert_eq!(
            validate_registration("a@b.c", "abcdef", "xyzxyz"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_registration("a@b.c", "ab", "xy"),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_registration_requires_email() {
        assert_eq!(
            validate_registration("  ", "abcdef", "abcdef"),
            Err(ValidationError::MissingCredentials)
        );
        assert_eq!(validate_registration("a@b.c", "abcdef", "abcdef"), Ok(()));
    }

    #[test]
    fn test_password_length_counts_chars() {
        assert_eq!(validate_registration("a@b.c", "éééééé", "éééééé"), Ok(()));
    }

    #[test]
    fn test_new_word_is_trimmed() {
        assert_eq!(
            validate_new_word("  chien ", " dog"),
            Ok(("chien".to_string(), "dog".to_string()))
        );
        assert_eq!(
            validate_new_word(" ", "dog"),
            Err(ValidationError::MissingFrenchWord)
        );
    }
}
