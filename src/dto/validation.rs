//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::dto::competition::CreateCompetitionRequest;

/// Rejects names made only of whitespace.
///
/// # Examples
///
/// ```ignore
/// validate_not_blank("Team A") // Ok
/// validate_not_blank("   ")    // Err
/// ```
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Ensures a competition does not end before it starts.
pub fn validate_date_range(request: &CreateCompetitionRequest) -> Result<(), ValidationError> {
    if request.start_date > request.end_date {
        let mut err = ValidationError::new("date_range");
        err.message = Some(
            format!(
                "start date {} must not be after end date {}",
                request.start_date, request.end_date
            )
            .into(),
        );
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank("Team A").is_ok());
        assert!(validate_not_blank(" x ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank(" \t ").is_err());
    }
}
