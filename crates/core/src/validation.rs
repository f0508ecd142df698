//! Input validation for mutations.
//!
//! Validators collect every violated field instead of stopping at the first,
//! so callers can report the whole list at once.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::types::{CategoryId, Email};

/// Product images must be absolute http(s) URLs or paths under `/uploads/`.
static IMAGE_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://|/uploads/.+)").expect("Invalid regex"));

/// Minimum password length at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Inclusive review rating bounds.
pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

/// One violated field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Default)]
struct Violations(Vec<FieldError>);

impl Violations {
    fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.0.push(FieldError::new(field, message));
        }
    }

    fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self.0)
        }
    }
}

/// Whether `value` is an acceptable product image reference.
#[must_use]
pub fn is_image_ref(value: &str) -> bool {
    IMAGE_REF_RE.is_match(value)
}

/// Fields of a product creation request.
#[derive(Debug, Clone, Copy)]
pub struct ProductDraft<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub quantity: i32,
    pub category_id: &'a str,
    pub images: &'a [String],
}

/// Fields of a product update request. `None` leaves a field untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductPatchDraft<'a> {
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub category_id: Option<&'a str>,
    pub images: Option<&'a [String]>,
}

fn check_name(v: &mut Violations, name: &str) {
    v.check(!name.trim().is_empty(), "name", "name is a required field");
}

fn check_description(v: &mut Violations, description: &str) {
    v.check(
        !description.trim().is_empty(),
        "description",
        "description is a required field",
    );
}

fn check_price(v: &mut Violations, price: f64) {
    v.check(
        price.is_finite() && price > 0.0,
        "price",
        "price must be a positive number",
    );
}

fn check_quantity(v: &mut Violations, quantity: i32) {
    v.check(
        quantity >= 0,
        "quantity",
        "quantity must be greater than or equal to 0",
    );
}

fn check_category(v: &mut Violations, category_id: &str) {
    v.check(
        category_id.parse::<CategoryId>().is_ok(),
        "categoryId",
        "categoryId must be a valid category id",
    );
}

fn check_images(v: &mut Violations, images: &[String]) {
    for (i, image) in images.iter().enumerate() {
        v.check(
            is_image_ref(image),
            &format!("images[{i}]"),
            "Image must be a valid URL or relative path",
        );
    }
}

/// Validate a product creation request.
///
/// # Errors
///
/// Every violated field.
pub fn validate_product(draft: &ProductDraft<'_>) -> Result<(), Vec<FieldError>> {
    let mut v = Violations::default();
    check_name(&mut v, draft.name);
    check_description(&mut v, draft.description);
    check_price(&mut v, draft.price);
    check_quantity(&mut v, draft.quantity);
    check_category(&mut v, draft.category_id);
    check_images(&mut v, draft.images);
    v.finish()
}

/// Validate the fields present in a product update.
///
/// # Errors
///
/// Every violated field.
pub fn validate_product_patch(patch: &ProductPatchDraft<'_>) -> Result<(), Vec<FieldError>> {
    let mut v = Violations::default();
    if let Some(name) = patch.name {
        check_name(&mut v, name);
    }
    if let Some(description) = patch.description {
        check_description(&mut v, description);
    }
    if let Some(price) = patch.price {
        check_price(&mut v, price);
    }
    if let Some(quantity) = patch.quantity {
        check_quantity(&mut v, quantity);
    }
    if let Some(category_id) = patch.category_id {
        check_category(&mut v, category_id);
    }
    if let Some(images) = patch.images {
        check_images(&mut v, images);
    }
    v.finish()
}

/// Fields of a registration request.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationDraft<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub profile_image: Option<&'a str>,
}

/// Validate a registration request and return the normalized email.
///
/// # Errors
///
/// Every violated field.
pub fn validate_registration(draft: &RegistrationDraft<'_>) -> Result<Email, Vec<FieldError>> {
    let mut v = Violations::default();
    v.check(!draft.name.trim().is_empty(), "name", "Name is required.");

    let email = Email::parse(draft.email);
    v.check(email.is_ok(), "email", "You must enter a valid email.");

    v.check(
        draft.password.chars().count() >= MIN_PASSWORD_LENGTH,
        "password",
        "Password must be at least 8 characters long.",
    );

    if let Some(image) = draft.profile_image {
        v.check(
            url::Url::parse(image).is_ok(),
            "profileImage",
            "Profile image must be a valid URL.",
        );
    }

    v.finish()?;
    email.map_err(|_| vec![FieldError::new("email", "You must enter a valid email.")])
}

/// Validate and trim a category name.
///
/// # Errors
///
/// The `name` field when blank.
pub fn validate_category_name(name: &str) -> Result<String, FieldError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FieldError::new("name", "name is a required field"));
    }
    Ok(trimmed.to_owned())
}

/// Validate a review rating.
///
/// # Errors
///
/// The `rating` field when out of range.
pub fn validate_rating(rating: i32) -> Result<(), FieldError> {
    if RATING_RANGE.contains(&rating) {
        Ok(())
    } else {
        Err(FieldError::new("rating", "Rating must be between 1 and 5."))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_image_refs() {
        assert!(is_image_ref("https://cdn.example.com/a.png"));
        assert!(is_image_ref("http://example.com/a.png"));
        assert!(is_image_ref("/uploads/image-1-2.png"));
        assert!(!is_image_ref("/uploads/"));
        assert!(!is_image_ref("/img/1.png"));
        assert!(!is_image_ref("ftp://example.com/a.png"));
    }

    #[test]
    fn test_valid_product() {
        let images = vec!["/uploads/basket.png".to_owned()];
        let draft = ProductDraft {
            name: "Handwoven Basket",
            description: "Beautiful handmade basket from local reeds",
            price: 45.99,
            quantity: 10,
            category_id: "1",
            images: &images,
        };
        assert!(validate_product(&draft).is_ok());
    }

    #[test]
    fn test_product_reports_every_field() {
        let images = vec!["ok".to_owned(), "https://fine.example.com/x.png".to_owned()];
        let draft = ProductDraft {
            name: " ",
            description: "",
            price: 0.0,
            quantity: -1,
            category_id: "abc",
            images: &images,
        };
        let errors = validate_product(&draft).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["name", "description", "price", "quantity", "categoryId", "images[0]"]
        );
    }

    #[test]
    fn test_patch_checks_only_present_fields() {
        assert!(validate_product_patch(&ProductPatchDraft::default()).is_ok());

        let patch = ProductPatchDraft {
            price: Some(-3.0),
            ..ProductPatchDraft::default()
        };
        let errors = validate_product_patch(&patch).unwrap_err();
        assert_eq!(fields(&errors), vec!["price"]);
    }

    #[test]
    fn test_registration_normalizes_email() {
        let draft = RegistrationDraft {
            name: "Amir Khan",
            email: " Amir@Example.com ",
            password: "password123",
            profile_image: Some("https://example.com/me.png"),
        };
        assert_eq!(
            validate_registration(&draft).unwrap().as_str(),
            "amir@example.com"
        );
    }

    #[test]
    fn test_registration_reports_every_field() {
        let draft = RegistrationDraft {
            name: "",
            email: "nope",
            password: "short",
            profile_image: Some("/relative.png"),
        };
        let errors = validate_registration(&draft).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec!["name", "email", "password", "profileImage"]
        );
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_category_name_trimmed() {
        assert_eq!(validate_category_name("  Home Decor ").unwrap(), "Home Decor");
        assert!(validate_category_name("   ").is_err());
    }
}
