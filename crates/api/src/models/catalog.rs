//! Category and product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use craftcart_core::{CategoryId, ProductId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// Partial category update. `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CategoryPatch {
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(name) = &self.name {
            category.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            category.description = Some(description.clone());
        }
    }
}

/// A listed product.
///
/// `category_id` is a plain reference: the category may have been deleted
/// since, in which case the product simply has no resolvable category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub images: Vec<String>,
    pub category_id: CategoryId,
    pub artisan_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub images: Vec<String>,
    pub category_id: CategoryId,
    pub artisan_id: UserId,
}

/// Partial product update. `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
    pub images: Option<Vec<String>>,
    pub category_id: Option<CategoryId>,
}

impl ProductPatch {
    /// Apply the present fields to `product`.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            product.description.clone_from(description);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(images) = &self.images {
            product.images.clone_from(images);
        }
        if let Some(category_id) = self.category_id {
            product.category_id = category_id;
        }
    }
}

/// Conjunctive product listing filter. Absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub artisan_id: Option<UserId>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Free text matched against name and description. Any term may match.
    pub search: Option<String>,
}

impl ProductFilter {
    #[must_use]
    pub fn by_category(category_id: CategoryId) -> Self {
        Self {
            category_id: Some(category_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn by_artisan(artisan_id: UserId) -> Self {
        Self {
            artisan_id: Some(artisan_id),
            ..Self::default()
        }
    }

    /// Lower-cased search terms, empty when there is no usable search text.
    #[must_use]
    pub fn search_terms(&self) -> Vec<String> {
        self.search
            .as_deref()
            .map(tokenize)
            .unwrap_or_default()
    }

    /// Search text when it contains at least one term.
    #[must_use]
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .filter(|s| s.chars().any(char::is_alphanumeric))
    }

    /// In-process evaluation of the filter.
    ///
    /// Search matches whole lower-cased words, without the stemming or
    /// stopword removal `PostgreSQL` full-text search applies.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.category_id.is_some_and(|id| id != product.category_id) {
            return false;
        }
        if self.artisan_id.is_some_and(|id| id != product.artisan_id) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }

        let terms = self.search_terms();
        if terms.is_empty() {
            return true;
        }
        let mut words = tokenize(&product.name);
        words.extend(tokenize(&product.description));
        terms.iter().any(|term| words.contains(term))
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn product(price: &str) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(1),
            name: "Handwoven Basket".to_owned(),
            description: "Beautiful handmade basket from local reeds".to_owned(),
            price: Decimal::from_str(price).unwrap(),
            quantity: 10,
            images: vec![],
            category_id: CategoryId::new(3),
            artisan_id: UserId::new(7),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(ProductFilter::default().matches(&product("45.99")));
    }

    #[test]
    fn test_category_and_artisan() {
        let p = product("45.99");
        assert!(ProductFilter::by_category(CategoryId::new(3)).matches(&p));
        assert!(!ProductFilter::by_category(CategoryId::new(4)).matches(&p));
        assert!(ProductFilter::by_artisan(UserId::new(7)).matches(&p));
        assert!(!ProductFilter::by_artisan(UserId::new(8)).matches(&p));
    }

    #[test]
    fn test_price_bounds_are_inclusive() {
        let p = product("45.99");
        let filter = ProductFilter {
            min_price: Some(Decimal::from_str("45.99").unwrap()),
            max_price: Some(Decimal::from_str("45.99").unwrap()),
            ..ProductFilter::default()
        };
        assert!(filter.matches(&p));

        let filter = ProductFilter {
            max_price: Some(Decimal::from_str("45.98").unwrap()),
            ..ProductFilter::default()
        };
        assert!(!filter.matches(&p));
    }

    #[test]
    fn test_search_any_term() {
        let p = product("45.99");
        let hit = ProductFilter {
            search: Some("ceramic REEDS".to_owned()),
            ..ProductFilter::default()
        };
        let miss = ProductFilter {
            search: Some("ceramic mug".to_owned()),
            ..ProductFilter::default()
        };
        assert!(hit.matches(&p));
        assert!(!miss.matches(&p));
    }

    #[test]
    fn test_search_matches_whole_words_without_stemming() {
        let p = product("45.99");
        let plural = ProductFilter {
            search: Some("baskets".to_owned()),
            ..ProductFilter::default()
        };
        let prefix = ProductFilter {
            search: Some("hand".to_owned()),
            ..ProductFilter::default()
        };
        assert!(!plural.matches(&p));
        assert!(!prefix.matches(&p));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = ProductFilter {
            search: Some("  ".to_owned()),
            ..ProductFilter::default()
        };
        assert!(filter.search_text().is_none());
        assert!(filter.matches(&product("1.00")));
    }

    #[test]
    fn test_patch_applies_present_fields() {
        let mut p = product("45.99");
        ProductPatch {
            price: Some(Decimal::from_str("39.00").unwrap()),
            quantity: Some(4),
            ..ProductPatch::default()
        }
        .apply_to(&mut p);
        assert_eq!(p.price, Decimal::from_str("39.00").unwrap());
        assert_eq!(p.quantity, 4);
        assert_eq!(p.name, "Handwoven Basket");
    }
}
