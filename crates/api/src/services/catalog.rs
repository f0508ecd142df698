//! Categories and products.
//!
//! Category mutations are administrator-only. Products are created by
//! artisans and edited or removed by their artisan or an administrator;
//! administrator edits land in the audit log.

use rust_decimal::Decimal;
use tracing::instrument;

use craftcart_core::validation::{
    FieldError, ProductDraft, ProductPatchDraft, validate_category_name, validate_product,
    validate_product_patch,
};
use craftcart_core::{CategoryId, Operation, Principal, ProductId, money};

use crate::db::{RepositoryError, Store};
use crate::error::{AppError, Result};
use crate::models::{
    Category, CategoryPatch, NewCategory, NewProduct, Product, ProductFilter, ProductPatch,
};
use crate::services::audit;

/// Number of products `featuredProducts` returns when no limit is given.
pub const DEFAULT_FEATURED_LIMIT: i32 = 5;

const CREATE_FAILED: &str = "Failed to create product due to validation errors.";
const UPDATE_FAILED: &str = "Failed to update product due to validation errors.";

/// Category creation request.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

/// Category update request. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Product creation request, as submitted.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub category_id: String,
    pub images: Vec<String>,
}

/// Product update request. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub category_id: Option<String>,
    pub images: Option<Vec<String>>,
}

pub struct CatalogService<'a> {
    store: &'a dyn Store,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// # Errors
    ///
    /// Storage failures only.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.store.list_categories().await?)
    }

    /// # Errors
    ///
    /// Storage failures only.
    pub async fn category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.store.category_by_id(id).await?)
    }

    /// # Errors
    ///
    /// `Forbidden` for non-administrators, `Validation` for a blank name,
    /// `Conflict` when the name is taken.
    #[instrument(skip_all)]
    pub async fn create_category(
        &self,
        caller: Option<&Principal>,
        input: CategoryInput,
    ) -> Result<Category> {
        Operation::CreateCategory.require(caller)?;

        let name = validate_category_name(&input.name).map_err(|e| {
            AppError::validation("Failed to create category due to validation errors.", vec![e])
        })?;
        self.ensure_name_free(&name, None).await?;

        let category = self
            .store
            .insert_category(NewCategory {
                name,
                description: input.description,
            })
            .await
            .map_err(name_conflict)?;

        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    /// # Errors
    ///
    /// `Forbidden` for non-administrators, `NotFound` for an unknown id,
    /// `Conflict` when renaming onto a taken name.
    #[instrument(skip(self, caller, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        caller: Option<&Principal>,
        id: CategoryId,
        input: CategoryUpdate,
    ) -> Result<Category> {
        Operation::UpdateCategory.require(caller)?;

        let name = input
            .name
            .as_deref()
            .map(validate_category_name)
            .transpose()
            .map_err(|e| {
                AppError::validation("Failed to update category due to validation errors.", vec![e])
            })?;

        if self.store.category_by_id(id).await?.is_none() {
            return Err(category_not_found(id));
        }
        if let Some(name) = &name {
            self.ensure_name_free(name, Some(id)).await?;
        }

        self.store
            .update_category(
                id,
                CategoryPatch {
                    name,
                    description: input.description,
                },
            )
            .await
            .map_err(name_conflict)?
            .ok_or_else(|| category_not_found(id))
    }

    /// Delete a category. Its products stay and simply lose their category.
    ///
    /// # Errors
    ///
    /// `Forbidden` for non-administrators, `NotFound` for an unknown id.
    #[instrument(skip(self, caller), fields(category_id = %id))]
    pub async fn delete_category(&self, caller: Option<&Principal>, id: CategoryId) -> Result<bool> {
        Operation::DeleteCategory.require(caller)?;

        if !self.store.delete_category(id).await? {
            return Err(category_not_found(id));
        }
        tracing::info!("Category deleted");
        Ok(true)
    }

    async fn ensure_name_free(&self, name: &str, except: Option<CategoryId>) -> Result<()> {
        match self.store.category_by_name(name).await? {
            Some(existing) if Some(existing.id) != except => Err(AppError::Conflict(format!(
                "A category named '{name}' already exists."
            ))),
            _ => Ok(()),
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Every product matching `filter`.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        Ok(self.store.list_products(filter).await?)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn product(&self, id: ProductId) -> Result<Product> {
        self.store
            .product_by_id(id)
            .await?
            .ok_or_else(|| product_not_found(id))
    }

    /// The newest products, newest first.
    ///
    /// # Errors
    ///
    /// Storage failures only.
    pub async fn featured_products(&self, limit: Option<i32>) -> Result<Vec<Product>> {
        let limit = limit.unwrap_or(DEFAULT_FEATURED_LIMIT).max(0);
        Ok(self.store.newest_products(i64::from(limit)).await?)
    }

    /// List a new product under the calling artisan.
    ///
    /// # Errors
    ///
    /// `Forbidden` unless the caller is an artisan, `Validation` listing every
    /// bad field, `NotFound` when the category does not exist.
    #[instrument(skip_all)]
    pub async fn create_product(
        &self,
        caller: Option<&Principal>,
        input: ProductInput,
    ) -> Result<Product> {
        let caller = Operation::CreateProduct.require(caller)?;

        validate_product(&ProductDraft {
            name: &input.name,
            description: &input.description,
            price: input.price,
            quantity: input.quantity,
            category_id: &input.category_id,
            images: &input.images,
        })
        .map_err(|fields| AppError::validation(CREATE_FAILED, fields))?;

        let category_id = self.existing_category(&input.category_id, CREATE_FAILED).await?;
        let price = parse_price(input.price, CREATE_FAILED)?;

        let product = self
            .store
            .insert_product(NewProduct {
                name: input.name.trim().to_owned(),
                description: input.description.trim().to_owned(),
                price,
                quantity: input.quantity,
                images: input.images,
                category_id,
                artisan_id: caller.id,
            })
            .await?;

        tracing::info!(product_id = %product.id, artisan_id = %caller.id, "Product created");
        Ok(product)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown product or category, `Forbidden` unless the
    /// caller owns the product or is an administrator, `Validation` listing
    /// every bad field.
    #[instrument(skip(self, caller, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        caller: Option<&Principal>,
        id: ProductId,
        input: ProductUpdate,
    ) -> Result<Product> {
        let caller = Operation::UpdateProduct.require(caller)?;
        let existing = self.product(id).await?;
        Operation::UpdateProduct.check_owner(caller, existing.artisan_id)?;

        validate_product_patch(&ProductPatchDraft {
            name: input.name.as_deref(),
            description: input.description.as_deref(),
            price: input.price,
            quantity: input.quantity,
            category_id: input.category_id.as_deref(),
            images: input.images.as_deref(),
        })
        .map_err(|fields| AppError::validation(UPDATE_FAILED, fields))?;

        let category_id = match &input.category_id {
            Some(raw) => Some(self.existing_category(raw, UPDATE_FAILED).await?),
            None => None,
        };
        let price = input.price.map(|p| parse_price(p, UPDATE_FAILED)).transpose()?;

        let updated = self
            .store
            .update_product(
                id,
                ProductPatch {
                    name: input.name.map(|s| s.trim().to_owned()),
                    description: input.description.map(|s| s.trim().to_owned()),
                    price,
                    quantity: input.quantity,
                    images: input.images,
                    category_id,
                },
            )
            .await?
            .ok_or_else(|| product_not_found(id))?;

        if caller.is_admin() {
            audit::record(
                self.store,
                caller,
                format!("Updated product: {} (ID: {id})", updated.name),
            )
            .await;
        }

        Ok(updated)
    }

    /// Hard delete. Orders keep their price snapshots.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Forbidden` unless the caller owns the
    /// product or is an administrator.
    #[instrument(skip(self, caller), fields(product_id = %id))]
    pub async fn delete_product(&self, caller: Option<&Principal>, id: ProductId) -> Result<bool> {
        let caller = Operation::DeleteProduct.require(caller)?;
        let existing = self.product(id).await?;
        Operation::DeleteProduct.check_owner(caller, existing.artisan_id)?;

        if !self.store.delete_product(id).await? {
            return Err(product_not_found(id));
        }

        if caller.is_admin() {
            audit::record(
                self.store,
                caller,
                format!("Deleted product: {} (ID: {id})", existing.name),
            )
            .await;
        }

        Ok(true)
    }

    /// Parse a submitted category id and check the category exists.
    async fn existing_category(&self, raw: &str, failed: &str) -> Result<CategoryId> {
        let id: CategoryId = raw.parse().map_err(|_| {
            AppError::validation(
                failed,
                vec![FieldError::new(
                    "categoryId",
                    "categoryId must be a valid category id",
                )],
            )
        })?;
        if self.store.category_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "The category with ID '{raw}' does not exist."
            )));
        }
        Ok(id)
    }
}

fn parse_price(price: f64, failed: &str) -> Result<Decimal> {
    money::from_f64(price).ok_or_else(|| {
        AppError::validation(
            failed,
            vec![FieldError::new("price", "price must be a positive number")],
        )
    })
}

fn category_not_found(id: CategoryId) -> AppError {
    AppError::NotFound(format!("Category with ID '{id}' not found."))
}

fn product_not_found(id: ProductId) -> AppError {
    AppError::NotFound(format!("Product with ID '{id}' not found."))
}

fn name_conflict(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::Conflict(_) => {
            AppError::Conflict("A category with this name already exists.".to_string())
        }
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use craftcart_core::{Email, Role};

    use super::*;
    use crate::db::MemoryStore;
    use crate::models::NewUser;

    async fn seed_user(store: &MemoryStore, email: &str, role: Role) -> Principal {
        store
            .insert_user(NewUser {
                name: email.to_string(),
                email: Email::parse(email).unwrap(),
                password_hash: "x".to_string(),
                role,
                profile_image: None,
            })
            .await
            .unwrap()
            .principal()
    }

    fn input(category_id: CategoryId) -> ProductInput {
        ProductInput {
            name: "Handwoven Basket".to_string(),
            description: "Beautiful handmade basket".to_string(),
            price: 45.99,
            quantity: 10,
            category_id: category_id.to_string(),
            images: vec!["/uploads/image-1.png".to_string()],
        }
    }

    struct Fixture {
        store: MemoryStore,
        admin: Principal,
        artisan: Principal,
        category: Category,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let admin = seed_user(&store, "admin@craftcart.test", Role::Admin).await;
        let artisan = seed_user(&store, "maria@craftcart.test", Role::Artisan).await;
        let category = CatalogService::new(&store)
            .create_category(
                Some(&admin),
                CategoryInput {
                    name: "Home Decor".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        Fixture {
            store,
            admin,
            artisan,
            category,
        }
    }

    #[tokio::test]
    async fn test_category_mutations_are_admin_only() {
        let f = fixture().await;
        let catalog = CatalogService::new(&f.store);

        let result = catalog
            .create_category(
                Some(&f.artisan),
                CategoryInput {
                    name: "Jewelry".to_string(),
                    description: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));

        let result = catalog.delete_category(None, f.category.id).await;
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_duplicate_category_name_conflicts() {
        let f = fixture().await;
        let result = CatalogService::new(&f.store)
            .create_category(
                Some(&f.admin),
                CategoryInput {
                    name: " Home Decor ".to_string(),
                    description: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_category() {
        let f = fixture().await;
        let catalog = CatalogService::new(&f.store);
        let missing = CategoryId::new(999);

        let result = catalog
            .update_category(Some(&f.admin), missing, CategoryUpdate::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = catalog.delete_category(Some(&f.admin), missing).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let renamed = catalog
            .update_category(
                Some(&f.admin),
                f.category.id,
                CategoryUpdate {
                    name: Some("Decor".to_string()),
                    description: Some("For the home".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.name, "Decor");
        assert_eq!(renamed.description.as_deref(), Some("For the home"));
    }

    #[tokio::test]
    async fn test_create_product_requires_artisan() {
        let f = fixture().await;
        let catalog = CatalogService::new(&f.store);

        let result = catalog
            .create_product(Some(&f.admin), input(f.category.id))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));

        let product = catalog
            .create_product(Some(&f.artisan), input(f.category.id))
            .await
            .unwrap();
        assert_eq!(product.artisan_id, f.artisan.id);
        assert_eq!(product.price, Decimal::from_str("45.99").unwrap());
    }

    #[tokio::test]
    async fn test_create_product_reports_every_field() {
        let f = fixture().await;
        let mut bad = input(f.category.id);
        bad.name = String::new();
        bad.price = 0.0;
        bad.quantity = -1;
        bad.images = vec!["ftp://nope".to_string()];

        let result = CatalogService::new(&f.store)
            .create_product(Some(&f.artisan), bad)
            .await;
        let Err(AppError::Validation { fields, .. }) = result else {
            panic!("expected validation error");
        };
        let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["name", "price", "quantity", "images[0]"]);
    }

    #[tokio::test]
    async fn test_create_product_unknown_category() {
        let f = fixture().await;
        let result = CatalogService::new(&f.store)
            .create_product(Some(&f.artisan), input(CategoryId::new(404)))
            .await;
        assert!(
            matches!(result, Err(AppError::NotFound(ref m)) if m == "The category with ID '404' does not exist.")
        );
    }

    #[tokio::test]
    async fn test_update_product_ownership_and_audit() {
        let f = fixture().await;
        let other = seed_user(&f.store, "other@craftcart.test", Role::Artisan).await;
        let catalog = CatalogService::new(&f.store);
        let product = catalog
            .create_product(Some(&f.artisan), input(f.category.id))
            .await
            .unwrap();

        let patch = ProductUpdate {
            price: Some(39.5),
            ..ProductUpdate::default()
        };

        let result = catalog
            .update_product(Some(&other), product.id, patch.clone())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden)));

        catalog
            .update_product(Some(&f.artisan), product.id, patch.clone())
            .await
            .unwrap();
        assert!(f.store.admin_logs().await.is_empty());

        let updated = catalog
            .update_product(Some(&f.admin), product.id, patch)
            .await
            .unwrap();
        assert_eq!(updated.price, Decimal::from_str("39.50").unwrap());

        let logs = f.store.admin_logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(
            logs[0].action,
            format!("Updated product: Handwoven Basket (ID: {})", product.id)
        );
    }

    #[tokio::test]
    async fn test_admin_delete_survives_audit_failure() {
        let f = fixture().await;
        let catalog = CatalogService::new(&f.store);
        let product = catalog
            .create_product(Some(&f.artisan), input(f.category.id))
            .await
            .unwrap();

        f.store.set_admin_log_offline(true);
        assert!(catalog.delete_product(Some(&f.admin), product.id).await.unwrap());
        assert!(matches!(
            catalog.product(product.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_featured_products_default_limit() {
        let f = fixture().await;
        let catalog = CatalogService::new(&f.store);
        for _ in 0..7 {
            catalog
                .create_product(Some(&f.artisan), input(f.category.id))
                .await
                .unwrap();
        }
        assert_eq!(catalog.featured_products(None).await.unwrap().len(), 5);
        assert_eq!(catalog.featured_products(Some(2)).await.unwrap().len(), 2);
    }
}
