//! Utilidades de validación
//!
//! Funciones helper de validación compartidas por los DTOs.

use validator::ValidationError;

/// Validar que un string no esté vacío (ni solo espacios)
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que una cantidad sea no negativa
pub fn validate_non_negative(value: i32) -> Result<(), ValidationError> {
    if value < 0 {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_empty() {
        assert!(validate_not_empty("cliente cerrado").is_ok());
        assert!(validate_not_empty("").is_err());
        assert!(validate_not_empty("   ").is_err());
    }

    #[test]
    fn test_non_negative() {
        assert!(validate_non_negative(0).is_ok());
        assert!(validate_non_negative(10).is_ok());
        assert!(validate_non_negative(-1).is_err());
    }
}
