//! Shipping form validation.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;
use serde::Deserialize;

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.+-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,})+$").expect("valid email pattern")
});

/// Customer details collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShippingForm {
    /// Full name.
    pub name: String,

    /// Contact email.
    pub email: String,

    /// 10-digit phone number.
    pub phone: String,

    /// 10-digit WhatsApp number.
    pub whatsapp: String,

    /// Street address.
    pub address: String,

    /// 6-digit postal code.
    pub pincode: String,

    /// City.
    pub city: String,

    /// State.
    pub state: String,

    /// Optional delivery notes.
    pub notes: String,
}

impl ShippingForm {
    /// Copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            whatsapp: self.whatsapp.trim().to_string(),
            address: self.address.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            notes: self.notes.trim().to_string(),
        }
    }

    /// `address, city, state - pincode`
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} - {}",
            self.address, self.city, self.state, self.pincode
        )
    }
}

/// A validated form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    /// [`ShippingForm::name`]
    Name,
    /// [`ShippingForm::email`]
    Email,
    /// [`ShippingForm::phone`]
    Phone,
    /// [`ShippingForm::whatsapp`]
    Whatsapp,
    /// [`ShippingForm::address`]
    Address,
    /// [`ShippingForm::pincode`]
    Pincode,
    /// [`ShippingForm::city`]
    City,
    /// [`ShippingForm::state`]
    State,
}

impl FormField {
    /// Field name as used by the form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Whatsapp => "whatsapp",
            Self::Address => "address",
            Self::Pincode => "pincode",
            Self::City => "city",
            Self::State => "state",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every violation found in a form, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<FormField, &'static str>);

impl FormErrors {
    fn insert(&mut self, field: FormField, message: &'static str) {
        self.0.insert(field, message);
    }

    /// Message for a field, if it failed.
    pub fn get(&self, field: FormField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Failing fields in form order.
    pub fn iter(&self) -> impl Iterator<Item = (FormField, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (field, message)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }

            write!(f, "{field}: {message}")?;
        }

        Ok(())
    }
}

/// Validate a shipping form, collecting every violation.
///
/// Values are checked after trimming.
///
/// # Errors
///
/// Returns the [`FormErrors`] map if any field is invalid.
pub fn validate_form(form: &ShippingForm) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    let required = [
        (FormField::Name, &form.name, "Name is required"),
        (FormField::Address, &form.address, "Address is required"),
        (FormField::City, &form.city, "City is required"),
        (FormField::State, &form.state, "State is required"),
    ];

    for (field, value, message) in required {
        if value.trim().is_empty() {
            errors.insert(field, message);
        }
    }

    let email = form.email.trim();
    if email.is_empty() {
        errors.insert(FormField::Email, "Email is required");
    } else if !EMAIL.is_match(email) {
        errors.insert(FormField::Email, "Please enter a valid email");
    }

    let numbers = [
        (
            FormField::Phone,
            &form.phone,
            10,
            "Phone number is required",
            "Please enter a valid 10-digit phone number",
        ),
        (
            FormField::Whatsapp,
            &form.whatsapp,
            10,
            "WhatsApp number is required",
            "Please enter a valid 10-digit WhatsApp number",
        ),
        (
            FormField::Pincode,
            &form.pincode,
            6,
            "Pincode is required",
            "Please enter a valid 6-digit pincode",
        ),
    ];

    for (field, value, digits, missing, invalid) in numbers {
        let value = value.trim();

        if value.is_empty() {
            errors.insert(field, missing);
        } else if !is_digits(value, digits) {
            errors.insert(field, invalid);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_digits(value: &str, count: usize) -> bool {
    value.chars().count() == count && value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ShippingForm {
        ShippingForm {
            name: "Asha Rao".to_string(),
            email: "asha.rao@example.in".to_string(),
            phone: "9876543210".to_string(),
            whatsapp: "9876543210".to_string(),
            address: "12 MG Road".to_string(),
            pincode: "411001".to_string(),
            city: "Pune".to_string(),
            state: "Maharashtra".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn valid_form_passes() {
        assert_eq!(validate_form(&valid_form()), Ok(()));
    }

    #[test]
    fn empty_form_reports_every_field() {
        let Err(errors) = validate_form(&ShippingForm::default()) else {
            unreachable!("empty form must not validate");
        };

        assert_eq!(errors.len(), 8);
        assert_eq!(errors.get(FormField::Name), Some("Name is required"));
        assert_eq!(errors.get(FormField::Email), Some("Email is required"));
        assert_eq!(errors.get(FormField::Pincode), Some("Pincode is required"));
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let form = ShippingForm {
            city: "   ".to_string(),
            ..valid_form()
        };

        let errors = validate_form(&form).err().unwrap_or_default();

        assert_eq!(errors.get(FormField::City), Some("City is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn nine_digit_phone_is_rejected() {
        let form = ShippingForm {
            phone: "987654321".to_string(),
            ..valid_form()
        };

        let errors = validate_form(&form).err().unwrap_or_default();

        assert_eq!(
            errors.get(FormField::Phone),
            Some("Please enter a valid 10-digit phone number")
        );
    }

    #[test]
    fn non_digit_whatsapp_and_short_pincode_are_both_reported() {
        let form = ShippingForm {
            whatsapp: "98765-4321".to_string(),
            pincode: "4110".to_string(),
            ..valid_form()
        };

        let errors = validate_form(&form).err().unwrap_or_default();

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.get(FormField::Whatsapp),
            Some("Please enter a valid 10-digit WhatsApp number")
        );
        assert_eq!(errors.get(FormField::Pincode), Some("Please enter a valid 6-digit pincode"));
    }

    #[test]
    fn email_shapes() {
        for good in ["a@b.co", "first.last@mail.example.com", "user+tag@shop.in"] {
            assert!(EMAIL.is_match(good), "{good} should be accepted");
        }

        for bad in ["plainaddress", "no-at.example.com", "a@b", "a@b.c", "@example.com"] {
            assert!(!EMAIL.is_match(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn padded_values_are_accepted() {
        let form = ShippingForm {
            email: "  asha@example.in ".to_string(),
            pincode: " 411001".to_string(),
            ..valid_form()
        };

        assert_eq!(validate_form(&form), Ok(()));
    }

    #[test]
    fn full_address_format() {
        assert_eq!(valid_form().full_address(), "12 MG Road, Pune, Maharashtra - 411001");
    }

    #[test]
    fn errors_display_lists_fields() {
        let form = ShippingForm {
            name: String::new(),
            state: String::new(),
            ..valid_form()
        };

        let errors = validate_form(&form).err().unwrap_or_default();

        assert_eq!(errors.to_string(), "name: Name is required; state: State is required");
    }
}
