//! Seed the marketplace with a starter catalog.
//!
//! The catalog file lists products together with the names of their artisan
//! and category. Seeding clears every product, then finds or creates each
//! artisan account and category by name before inserting the products.
//! Existing carts, orders and reviews are left alone.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use craftcart_api::db::{PgStore, RepositoryError, Store};
use craftcart_api::models::{NewCategory, NewProduct, NewUser};
use craftcart_api::services::AuthError;
use craftcart_api::services::auth::hash_password;
use craftcart_core::{CategoryId, Email, EmailError, Role, UserId};

use super::{MissingEnvVar, database_url};

/// Catalog loaded when `--file` is not given.
pub const DEFAULT_CATALOG: &str = "crates/cli/seed/catalog.yaml";

/// Password given to artisans created by the seeder.
pub const DEFAULT_PASSWORD: &str = "password123";

const ARTISAN_EMAIL_DOMAIN: &str = "example.com";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Config(#[from] MissingEnvVar),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid artisan email for {name}: {source}")]
    ArtisanEmail { name: String, source: EmailError },

    #[error("Password hashing failed: {0}")]
    Password(#[from] AuthError),
}

/// A catalog file.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub products: Vec<SeedProduct>,
}

/// One product, referring to its artisan and category by name.
#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub category: String,
    pub artisan: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// What a seeding run did.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub products_cleared: u64,
    pub artisans_created: usize,
    pub categories_created: usize,
    pub products: usize,
}

/// Load `file` and seed it into the configured database.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, or on any storage error.
pub async fn run(file: &str) -> Result<SeedSummary, SeedError> {
    let catalog = load(Path::new(file)).await?;
    info!(path = %file, products = catalog.products.len(), "Parsed catalog");

    // Parse before connecting so a bad file never touches the database
    let url = database_url()?;
    let pool = craftcart_api::db::create_pool(&url).await?;
    info!("Connected to database");

    seed_catalog(&PgStore::new(pool), &catalog).await
}

async fn load(path: &Path) -> Result<Catalog, SeedError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Read {
            path: path.display().to_string(),
            source,
        })?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Replace every product with the catalog's.
///
/// # Errors
///
/// Fails on any storage error or when an artisan name yields no valid email.
pub async fn seed_catalog(store: &dyn Store, catalog: &Catalog) -> Result<SeedSummary, SeedError> {
    let mut summary = SeedSummary {
        products_cleared: store.delete_all_products().await?,
        ..SeedSummary::default()
    };
    info!(count = summary.products_cleared, "Existing products cleared");

    let mut artisans: HashMap<&str, UserId> = HashMap::new();
    let mut categories: HashMap<&str, CategoryId> = HashMap::new();

    for product in &catalog.products {
        if !artisans.contains_key(product.artisan.as_str()) {
            let (id, created) = find_or_create_artisan(store, &product.artisan).await?;
            summary.artisans_created += usize::from(created);
            artisans.insert(&product.artisan, id);
        }
        if !categories.contains_key(product.category.as_str()) {
            let (id, created) = find_or_create_category(store, &product.category).await?;
            summary.categories_created += usize::from(created);
            categories.insert(&product.category, id);
        }
    }

    for product in &catalog.products {
        store
            .insert_product(NewProduct {
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price,
                quantity: product.quantity,
                images: product.images.clone(),
                category_id: categories[product.category.as_str()],
                artisan_id: artisans[product.artisan.as_str()],
            })
            .await?;
        summary.products += 1;
    }

    Ok(summary)
}

/// `Amir Khan` becomes `amirkhan@example.com`.
pub fn artisan_email(name: &str) -> String {
    let local: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    format!("{local}@{ARTISAN_EMAIL_DOMAIN}")
}

async fn find_or_create_artisan(store: &dyn Store, name: &str) -> Result<(UserId, bool), SeedError> {
    let email = Email::parse(&artisan_email(name)).map_err(|source| SeedError::ArtisanEmail {
        name: name.to_owned(),
        source,
    })?;

    if let Some(existing) = store.user_by_email(&email).await? {
        return Ok((existing.id, false));
    }

    let user = store
        .insert_user(NewUser {
            name: name.to_owned(),
            email,
            password_hash: hash_password(DEFAULT_PASSWORD)?,
            role: Role::Artisan,
            profile_image: None,
        })
        .await?;
    info!(user_id = %user.id, name = %name, "Artisan created");
    Ok((user.id, true))
}

async fn find_or_create_category(
    store: &dyn Store,
    name: &str,
) -> Result<(CategoryId, bool), SeedError> {
    if let Some(existing) = store.category_by_name(name).await? {
        return Ok((existing.id, false));
    }

    let category = store
        .insert_category(NewCategory {
            name: name.to_owned(),
            description: None,
        })
        .await?;
    info!(category_id = %category.id, name = %name, "Category created");
    Ok((category.id, true))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use craftcart_api::db::MemoryStore;
    use craftcart_api::models::ProductFilter;

    use super::*;

    const CATALOG: &str = r#"
products:
  - name: Handwoven Basket
    description: Beautiful handmade basket from local reeds
    price: "45.99"
    quantity: 10
    category: Home Decor
    artisan: Amir Khan
    images: ["/img/1.png"]
  - name: Macrame Wall Hanging
    description: Boho-style macrame for home decor
    price: "35.00"
    quantity: 8
    category: Home Decor
    artisan: Leena Roy
"#;

    #[test]
    fn test_artisan_email() {
        assert_eq!(artisan_email("Amir Khan"), "amirkhan@example.com");
        assert_eq!(artisan_email("Jaya  Kapoor"), "jayakapoor@example.com");
    }

    #[test]
    fn test_parse_catalog() {
        let catalog: Catalog = serde_yaml::from_str(CATALOG).unwrap();
        assert_eq!(catalog.products.len(), 2);
        assert_eq!(catalog.products[0].price, Decimal::new(4599, 2));
        assert!(catalog.products[1].images.is_empty());
    }

    #[tokio::test]
    async fn test_seed_reuses_artisans_and_categories() {
        let store = MemoryStore::new();
        let catalog: Catalog = serde_yaml::from_str(CATALOG).unwrap();

        let first = seed_catalog(&store, &catalog).await.unwrap();
        assert_eq!(first.artisans_created, 2);
        assert_eq!(first.categories_created, 1);
        assert_eq!(first.products, 2);

        let second = seed_catalog(&store, &catalog).await.unwrap();
        assert_eq!(second.products_cleared, 2);
        assert_eq!(second.artisans_created, 0);
        assert_eq!(second.categories_created, 0);

        let products = store.list_products(&ProductFilter::default()).await.unwrap();
        assert_eq!(products.len(), 2);
        let artisan = store
            .user_by_email(&Email::parse("amirkhan@example.com").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(artisan.role, Role::Artisan);
    }
}
