use std::{collections::BTreeMap, fmt};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"));

/// The fixed set of fields on the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactField {
    Name,
    Phone,
    Email,
    Comment,
}

impl ContactField {
    pub const ALL: [ContactField; 4] = [
        ContactField::Name,
        ContactField::Phone,
        ContactField::Email,
        ContactField::Comment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContactField::Name => "Ваше имя",
            ContactField::Phone => "Телефон",
            ContactField::Email => "Email",
            ContactField::Comment => "Комментарий",
        }
    }

    pub fn is_required(self) -> bool {
        !matches!(self, ContactField::Comment)
    }

    /// Field asked after this one, `None` after the last.
    pub fn next(self) -> Option<ContactField> {
        match self {
            ContactField::Name => Some(ContactField::Phone),
            ContactField::Phone => Some(ContactField::Email),
            ContactField::Email => Some(ContactField::Comment),
            ContactField::Comment => None,
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Обязательное поле")]
    Required,
    #[error("Неверный формат")]
    InvalidFormat,
}

pub type ContactErrors = BTreeMap<ContactField, ValidationError>;

/// Contact form contents together with the errors from the last submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactInfo {
    name: String,
    phone: String,
    email: String,
    comment: String,
    errors: ContactErrors,
}

impl ContactInfo {
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Phone => &self.phone,
            ContactField::Email => &self.email,
            ContactField::Comment => &self.comment,
        }
    }

    /// Overwrites a field and drops its stale error. Errors are only
    /// recomputed on submit.
    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        let slot = match field {
            ContactField::Name => &mut self.name,
            ContactField::Phone => &mut self.phone,
            ContactField::Email => &mut self.email,
            ContactField::Comment => &mut self.comment,
        };
        *slot = value.into();
        self.errors.remove(&field);
    }

    pub fn errors(&self) -> &ContactErrors {
        &self.errors
    }

    pub fn error(&self, field: ContactField) -> Option<ValidationError> {
        self.errors.get(&field).copied()
    }

    pub(crate) fn set_errors(&mut self, errors: ContactErrors) {
        self.errors = errors;
    }
}

/// Checks the required fields and the email shape. The comment is free text.
pub fn validate_contact(contact: &ContactInfo) -> ContactErrors {
    let mut errors = ContactErrors::new();

    for field in ContactField::ALL.into_iter().filter(|f| f.is_required()) {
        if contact.get(field).trim().is_empty() {
            errors.insert(field, ValidationError::Required);
        }
    }

    let email = contact.email().trim();
    if !email.is_empty() && !EMAIL_PATTERN.is_match(email) {
        errors.insert(ContactField::Email, ValidationError::InvalidFormat);
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_form_yields_three_required_errors() {
        let errors = validate_contact(&ContactInfo::default());

        assert_eq!(errors.len(), 3);
        assert_eq!(errors[&ContactField::Name], ValidationError::Required);
        assert_eq!(errors[&ContactField::Phone], ValidationError::Required);
        assert_eq!(errors[&ContactField::Email], ValidationError::Required);
        assert!(!errors.contains_key(&ContactField::Comment));
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let errors = validate_contact(&ContactInfo::new("   ", "\t", " "));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn malformed_email_is_the_only_error() {
        let errors = validate_contact(&ContactInfo::new("A", "123", "not-an-email"));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&ContactField::Email], ValidationError::InvalidFormat);
    }

    #[test]
    fn email_shapes() {
        for bad in ["a@b", "@b.co", "a@.co", "a b@c.d", "a@b.", "ab.co"] {
            let errors = validate_contact(&ContactInfo::new("Ann", "1", bad));
            assert_eq!(
                errors.get(&ContactField::Email),
                Some(&ValidationError::InvalidFormat),
                "{bad}"
            );
        }

        let errors = validate_contact(&ContactInfo::new("Ann", "1", "  a@b.co  "));
        assert!(errors.is_empty());
    }

    #[test]
    fn valid_contact_passes_with_or_without_comment() {
        let contact = ContactInfo::new("Ann", "+70001112233", "a@b.co");
        assert!(validate_contact(&contact).is_empty());
        assert!(validate_contact(&contact.with_comment("позвоните вечером")).is_empty());
    }

    #[test]
    fn set_clears_only_that_fields_error() {
        let mut contact = ContactInfo::default();
        let errors = validate_contact(&contact);
        contact.set_errors(errors);

        contact.set(ContactField::Name, "Ann");

        assert_eq!(contact.name(), "Ann");
        assert_eq!(contact.error(ContactField::Name), None);
        assert_eq!(contact.error(ContactField::Phone), Some(ValidationError::Required));
        assert_eq!(contact.error(ContactField::Email), Some(ValidationError::Required));
    }

    #[test]
    fn fields_are_asked_in_form_order() {
        let mut order = vec![ContactField::Name];
        while let Some(next) = order.last().and_then(|f| f.next()) {
            order.push(next);
        }
        assert_eq!(order, ContactField::ALL);
    }
}
