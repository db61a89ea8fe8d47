//! Input rules shared by the interactive prompts.

use thiserror::Error;

pub const CEP_DIGITS: usize = 8;
pub const MIN_SEARCH_CHARS: usize = 3;

/// User-facing validation messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("O CEP deve ter exatamente 8 dígitos.")]
    CepLength,

    #[error("Por favor, digite pelo menos {0} caracteres")]
    TooShort(usize),
}

/// Strip everything but digits and require exactly eight of them.
///
/// `"01001-000"` becomes `"01001000"`.
pub fn normalize_cep(input: &str) -> Result<String, ValidationError> {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();

    if digits.len() != CEP_DIGITS {
        return Err(ValidationError::CepLength);
    }

    Ok(digits)
}

pub fn require_min_chars(input: &str, min: usize) -> Result<(), ValidationError> {
    if input.trim().chars().count() < min {
        return Err(ValidationError::TooShort(min));
    }

    Ok(())
}

/// `"01001000"` → `"01001-000"`; anything else is returned as is.
pub fn format_cep(cep: &str) -> String {
    match normalize_cep(cep) {
        Ok(digits) => format!("{}-{}", &digits[..5], &digits[5..]),
        Err(_) => cep.to_owned(),
    }
}
