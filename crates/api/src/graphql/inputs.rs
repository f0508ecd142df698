//! GraphQL input objects and their conversion into service requests.
//!
//! IDs arrive as strings. Conversion parses them, and an unparseable ID is
//! reported as a bad request naming the field.

use std::str::FromStr;

use async_graphql::{ID, InputObject};

use craftcart_core::order::RequestedLine;
use craftcart_core::{ProductId, Role, money};

use crate::error::AppError;
use crate::models::ProductFilter;
use crate::services::{
    CategoryInput as NewCategoryRequest, CategoryUpdate, ProductInput as NewProductRequest,
    ProductUpdate, Registration, ReviewInput as NewReviewRequest,
};

/// Parse a GraphQL ID into a typed id.
///
/// # Errors
///
/// `BadRequest` when the ID is not numeric.
pub fn parse_id<T: FromStr>(id: &ID, field: &str) -> Result<T, AppError> {
    id.parse::<T>()
        .map_err(|_| AppError::BadRequest(format!("Invalid {field}: '{}'.", id.as_str())))
}

#[derive(Debug, InputObject)]
pub struct RegisterInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
    pub profile_image: Option<String>,
}

impl From<RegisterInput> for Registration {
    fn from(input: RegisterInput) -> Self {
        Self {
            name: input.name,
            email: input.email,
            password: input.password,
            role: input.role,
            profile_image: input.profile_image,
        }
    }
}

#[derive(Debug, InputObject)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, InputObject)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

impl From<CategoryInput> for NewCategoryRequest {
    fn from(input: CategoryInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
        }
    }
}

#[derive(Debug, InputObject)]
pub struct CategoryUpdateInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl From<CategoryUpdateInput> for CategoryUpdate {
    fn from(input: CategoryUpdateInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
        }
    }
}

/// New product. `categoryId` is checked by the catalog validator, so it is
/// passed through as submitted.
#[derive(Debug, InputObject)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub category_id: ID,
    #[graphql(default)]
    pub images: Vec<String>,
}

impl From<ProductInput> for NewProductRequest {
    fn from(input: ProductInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            category_id: input.category_id.0,
            images: input.images,
        }
    }
}

#[derive(Debug, InputObject)]
pub struct ProductUpdateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub category_id: Option<ID>,
    pub images: Option<Vec<String>>,
}

impl From<ProductUpdateInput> for ProductUpdate {
    fn from(input: ProductUpdateInput) -> Self {
        Self {
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            category_id: input.category_id.map(|id| id.0),
            images: input.images,
        }
    }
}

/// Conjunctive product filter. Absent fields impose no constraint.
#[derive(Debug, Default, InputObject)]
#[graphql(name = "ProductFilter")]
pub struct ProductFilterInput {
    pub category_id: Option<ID>,
    pub artisan_id: Option<ID>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search_query: Option<String>,
}

impl TryFrom<ProductFilterInput> for ProductFilter {
    type Error = AppError;

    fn try_from(input: ProductFilterInput) -> Result<Self, Self::Error> {
        let price = |value: Option<f64>, field: &str| {
            value
                .map(|v| {
                    money::from_f64(v)
                        .ok_or_else(|| AppError::BadRequest(format!("Invalid {field}.")))
                })
                .transpose()
        };

        Ok(Self {
            category_id: input
                .category_id
                .as_ref()
                .map(|id| parse_id(id, "categoryId"))
                .transpose()?,
            artisan_id: input
                .artisan_id
                .as_ref()
                .map(|id| parse_id(id, "artisanId"))
                .transpose()?,
            min_price: price(input.min_price, "minPrice")?,
            max_price: price(input.max_price, "maxPrice")?,
            search: input.search_query,
        })
    }
}

#[derive(Debug, InputObject)]
pub struct OrderItemInput {
    pub product: ID,
    pub quantity: i32,
}

impl TryFrom<OrderItemInput> for RequestedLine {
    type Error = AppError;

    fn try_from(input: OrderItemInput) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: parse_id::<ProductId>(&input.product, "product")?,
            quantity: input.quantity,
        })
    }
}

#[derive(Debug, InputObject)]
pub struct ReviewInput {
    pub product_id: ID,
    pub rating: i32,
    pub comment: String,
}

impl TryFrom<ReviewInput> for NewReviewRequest {
    type Error = AppError;

    fn try_from(input: ReviewInput) -> Result<Self, Self::Error> {
        Ok(Self {
            product_id: parse_id(&input.product_id, "productId")?,
            rating: input.rating,
            comment: input.comment,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use craftcart_core::CategoryId;

    use super::*;

    #[test]
    fn test_parse_id() {
        let id: ProductId = parse_id(&ID::from("42"), "id").unwrap();
        assert_eq!(id, ProductId::new(42));

        let err = parse_id::<ProductId>(&ID::from("abc"), "id").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m == "Invalid id: 'abc'."));
    }

    #[test]
    fn test_filter_conversion() {
        let filter = ProductFilter::try_from(ProductFilterInput {
            category_id: Some(ID::from("3")),
            min_price: Some(10.0),
            search_query: Some("basket".to_string()),
            ..ProductFilterInput::default()
        })
        .unwrap();

        assert_eq!(filter.category_id, Some(CategoryId::new(3)));
        assert_eq!(filter.min_price, Some(Decimal::new(1000, 2)));
        assert_eq!(filter.max_price, None);
        assert_eq!(filter.search.as_deref(), Some("basket"));
    }

    #[test]
    fn test_filter_rejects_bad_ids_and_prices() {
        assert!(
            ProductFilter::try_from(ProductFilterInput {
                artisan_id: Some(ID::from("x")),
                ..ProductFilterInput::default()
            })
            .is_err()
        );
        assert!(
            ProductFilter::try_from(ProductFilterInput {
                max_price: Some(f64::NAN),
                ..ProductFilterInput::default()
            })
            .is_err()
        );
    }
}
