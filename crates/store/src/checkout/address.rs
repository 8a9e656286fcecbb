//! Shipping addresses

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which address field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressField {
    /// Recipient name.
    FullName,

    /// Contact phone number.
    Phone,

    /// Street address, first line.
    Line1,

    /// City.
    City,

    /// State or region.
    State,

    /// Postal code.
    PostalCode,
}

impl Display for AddressField {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::FullName => "full name",
            Self::Phone => "phone",
            Self::Line1 => "address line 1",
            Self::City => "city",
            Self::State => "state",
            Self::PostalCode => "postal code",
        };

        f.write_str(name)
    }
}

/// One field-level validation failure, ready for inline display next to the
/// field.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct AddressError {
    /// The field that failed.
    pub field: AddressField,

    /// What the buyer needs to fix.
    pub message: &'static str,
}

/// The address form as the buyer typed it.
///
/// Validation runs on every submission attempt, so correcting a field and
/// resubmitting re-checks everything; there is no stale error state to
/// clear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressForm {
    /// Recipient name.
    pub full_name: String,

    /// Contact phone number; exactly ten digits.
    pub phone: String,

    /// Street address, first line.
    pub line1: String,

    /// Street address, second line; optional.
    pub line2: String,

    /// City.
    pub city: String,

    /// State or region.
    pub state: String,

    /// Postal code; exactly six digits.
    pub postal_code: String,
}

/// A validated shipping address, as denormalized into orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Recipient name.
    pub full_name: String,

    /// Ten-digit contact phone number.
    pub phone: String,

    /// Street address, first line.
    pub line1: String,

    /// Street address, second line, when given.
    pub line2: Option<String>,

    /// City.
    pub city: String,

    /// State or region.
    pub state: String,

    /// Six-digit postal code.
    pub postal_code: String,
}

impl AddressForm {
    /// Validates the form into a shippable address.
    ///
    /// Fields are trimmed before checking; a validated address never carries
    /// stray whitespace.
    ///
    /// # Errors
    ///
    /// One [`AddressError`] per failing field, all reported together so the
    /// form can mark every problem at once.
    pub fn validate(&self) -> Result<Address, Vec<AddressError>> {
        let mut errors = Vec::new();

        let full_name = self.full_name.trim();
        let phone = self.phone.trim();
        let line1 = self.line1.trim();
        let line2 = self.line2.trim();
        let city = self.city.trim();
        let state = self.state.trim();
        let postal_code = self.postal_code.trim();

        if full_name.is_empty() {
            errors.push(AddressError {
                field: AddressField::FullName,
                message: "full name is required",
            });
        }

        if !is_exactly_digits(phone, 10) {
            errors.push(AddressError {
                field: AddressField::Phone,
                message: "phone must be exactly 10 digits",
            });
        }

        if line1.is_empty() {
            errors.push(AddressError {
                field: AddressField::Line1,
                message: "address line 1 is required",
            });
        }

        if city.is_empty() {
            errors.push(AddressError {
                field: AddressField::City,
                message: "city is required",
            });
        }

        if state.is_empty() {
            errors.push(AddressError {
                field: AddressField::State,
                message: "state is required",
            });
        }

        if !is_exactly_digits(postal_code, 6) {
            errors.push(AddressError {
                field: AddressField::PostalCode,
                message: "postal code must be exactly 6 digits",
            });
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Address {
            full_name: full_name.to_string(),
            phone: phone.to_string(),
            line1: line1.to_string(),
            line2: (!line2.is_empty()).then(|| line2.to_string()),
            city: city.to_string(),
            state: state.to_string(),
            postal_code: postal_code.to_string(),
        })
    }
}

fn is_exactly_digits(value: &str, count: usize) -> bool {
    value.len() == count && value.bytes().all(|byte| byte.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn filled_form() -> AddressForm {
        AddressForm {
            full_name: "Priya Sharma".to_string(),
            phone: "9876543210".to_string(),
            line1: "14 Lakeview Road".to_string(),
            line2: String::new(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            postal_code: "411001".to_string(),
        }
    }

    #[test]
    fn test_a_complete_form_validates() -> TestResult {
        let address = filled_form().validate().map_err(|e| format!("{e:?}"))?;

        assert_eq!(address.full_name, "Priya Sharma");
        assert_eq!(address.line2, None);

        Ok(())
    }

    #[test]
    fn test_fields_are_trimmed() -> TestResult {
        let form = AddressForm {
            full_name: "  Priya Sharma ".to_string(),
            phone: " 9876543210 ".to_string(),
            ..filled_form()
        };

        let address = form.validate().map_err(|e| format!("{e:?}"))?;

        assert_eq!(address.full_name, "Priya Sharma");
        assert_eq!(address.phone, "9876543210");

        Ok(())
    }

    #[test]
    fn test_phone_must_be_exactly_ten_digits() {
        for phone in ["987654321", "98765432100", "98765A4321", ""] {
            let form = AddressForm {
                phone: phone.to_string(),
                ..filled_form()
            };

            let errors = form.validate().expect_err("phone should fail");

            assert_eq!(errors.len(), 1);
            assert_eq!(
                errors.first().map(|e| e.field),
                Some(AddressField::Phone),
                "{phone:?} should fail on the phone field"
            );
        }
    }

    #[test]
    fn test_postal_code_must_be_exactly_six_digits() {
        let form = AddressForm {
            postal_code: "4110".to_string(),
            ..filled_form()
        };

        let errors = form.validate().expect_err("postal code should fail");

        assert_eq!(errors.first().map(|e| e.field), Some(AddressField::PostalCode));
    }

    #[test]
    fn test_every_failing_field_is_reported_together() {
        let errors = AddressForm::default()
            .validate()
            .expect_err("empty form should fail");

        let fields: Vec<AddressField> = errors.iter().map(|e| e.field).collect();

        assert_eq!(
            fields,
            vec![
                AddressField::FullName,
                AddressField::Phone,
                AddressField::Line1,
                AddressField::City,
                AddressField::State,
                AddressField::PostalCode,
            ]
        );
    }

    #[test]
    fn test_second_address_line_is_optional_but_kept() -> TestResult {
        let form = AddressForm {
            line2: "Flat 4B".to_string(),
            ..filled_form()
        };

        let address = form.validate().map_err(|e| format!("{e:?}"))?;

        assert_eq!(address.line2.as_deref(), Some("Flat 4B"));

        Ok(())
    }
}
