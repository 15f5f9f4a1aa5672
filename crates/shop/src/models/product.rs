//! Product catalog models and admin form validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tamarind_core::{Price, ProductId, UserId};

/// A catalog product.
///
/// Owned by exactly one admin user; only the owner may edit or delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub description: String,
    /// Path of the image asset in the asset store.
    pub image_path: String,
    pub owner_id: UserId,
}

/// A validated product ready for insertion (no id yet).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub price: Price,
    pub description: String,
    pub image_path: String,
    pub owner_id: UserId,
}

/// Raw admin form input for creating or editing a product.
///
/// Fields are kept as submitted strings so a failed validation can echo the
/// user's input back verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub title: String,
    pub price: String,
    pub description: String,
}

impl ProductDraft {
    /// Validate the draft's text fields.
    ///
    /// Checks: non-empty title, numeric non-negative price, non-empty
    /// description. The image requirement is checked by the admin service,
    /// which also knows whether this is a create or an edit.
    ///
    /// # Errors
    ///
    /// Returns one [`FieldError`] per failing field.
    pub fn validate(&self) -> Result<(String, Price, String), Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FieldError::new("title", "Title must not be empty"));
        }

        let price = match Price::parse(&self.price) {
            Ok(price) => Some(price),
            Err(err) => {
                errors.push(FieldError::new("price", err.to_string()));
                None
            }
        };

        let description = self.description.trim();
        if description.is_empty() {
            errors.push(FieldError::new(
                "description",
                "Description must not be empty",
            ));
        }

        match price {
            Some(price) if errors.is_empty() => {
                Ok((title.to_owned(), price, description.to_owned()))
            }
            _ => Err(errors),
        }
    }
}

/// A single field's validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// A rejected form submission: the echoed input plus per-field messages.
///
/// The display message is the first field failure, matching what a form
/// renders above the fields.
#[derive(Debug, Clone, Error)]
#[error("{}", self.message())]
pub struct ValidationError {
    pub draft: ProductDraft,
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    #[must_use]
    pub const fn new(draft: ProductDraft, errors: Vec<FieldError>) -> Self {
        Self { draft, errors }
    }

    /// The leading human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        self.errors
            .first()
            .map_or("invalid input", |e| e.message.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn draft(title: &str, price: &str, description: &str) -> ProductDraft {
        ProductDraft {
            title: title.to_owned(),
            price: price.to_owned(),
            description: description.to_owned(),
        }
    }

    #[test]
    fn test_valid_draft() {
        let (title, price, description) =
            draft("Book", "12.99", "A good read").validate().unwrap();
        assert_eq!(title, "Book");
        assert_eq!(price.amount(), Decimal::new(1299, 2));
        assert_eq!(description, "A good read");
    }

    #[test]
    fn test_fields_are_trimmed() {
        let (title, _, description) = draft("  Book ", "1", " text ").validate().unwrap();
        assert_eq!(title, "Book");
        assert_eq!(description, "text");
    }

    #[test]
    fn test_empty_title_rejected() {
        let errors = draft("", "1", "text").validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.first().unwrap().field, "title");
    }

    #[test]
    fn test_bad_price_rejected() {
        let errors = draft("Book", "cheap", "text").validate().unwrap_err();
        assert_eq!(errors.first().unwrap().field, "price");

        let errors = draft("Book", "-5", "text").validate().unwrap_err();
        assert_eq!(errors.first().unwrap().field, "price");
    }

    #[test]
    fn test_collects_all_failures() {
        let errors = draft("", "x", " ").validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_validation_error_echoes_draft() {
        let submitted = draft("", "x", "desc");
        let errors = submitted.validate().unwrap_err();
        let err = ValidationError::new(submitted.clone(), errors);
        assert_eq!(err.draft, submitted);
        assert!(!err.message().is_empty());
    }
}
