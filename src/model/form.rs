use validator::{Validate, ValidationError};

/// A submission with every field defaulted: strings to `""`, consent to `false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct SignupForm {
    #[validate(custom(function = "not_blank"))]
    pub first_name: String,
    #[validate(custom(function = "not_blank"))]
    pub last_name: String,
    #[validate(custom(function = "not_blank"))]
    pub email: String,
    pub phone: String,
    pub role: String,
    pub location: String,
    pub message: String,
    #[validate(custom(function = "is_true"))]
    pub consent: bool,
    pub source: String,
    pub user_agent: String,
}

/// Rule violations in the order they are reported to the client.
const VIOLATIONS: [(&str, &str); 4] = [
    ("email", "email is required"),
    ("first_name", "firstName is required"),
    ("last_name", "lastName is required"),
    ("consent", "consent must be true"),
];

impl SignupForm {
    /// Checks every rule and returns all violations at once, so the client can fix them in one go.
    pub fn validate_fields(&self) -> Result<(), Vec<String>> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };

        let field_errors = errors.field_errors();
        let violations = VIOLATIONS
            .iter()
            .filter(|(field, _)| field_errors.contains_key(*field))
            .map(|(_, msg)| msg.to_string())
            .collect();

        Err(violations)
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn is_true(value: &bool) -> Result<(), ValidationError> {
    if !*value {
        return Err(ValidationError::new("consent_required"));
    }
    Ok(())
}
