// src/common/validation.rs

use validator::ValidationError;

/// Recusa textos só com espaços; `length(min = 1)` deixa passar "   ".
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Este campo não pode ficar em branco.".into());
        Err(err)
    } else {
        Ok(())
    }
}
