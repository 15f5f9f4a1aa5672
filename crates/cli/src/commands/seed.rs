//! Seed the database with demo data for local development.

use std::sync::Arc;

use tracing::info;

use tamarind_core::Price;
use tamarind_shop::ShopConfig;
use tamarind_shop::db::products::PgProductStore;
use tamarind_shop::db::users::PgUserStore;
use tamarind_shop::db;
use tamarind_shop::models::product::NewProduct;
use tamarind_shop::services::AuthService;
use tamarind_shop::services::auth::AuthError;
use tamarind_shop::stores::ProductStore;

const DEMO_PRODUCTS: &[(&str, &str, &str)] = &[
    ("A Book", "12.99", "A very interesting read about many things."),
    ("A Mug", "7.50", "Holds roughly one cup of coffee."),
    ("A Poster", "4.00", "Decorative. Wall not included."),
];

/// Create a demo admin account and a handful of products.
///
/// Idempotent for the account: re-running against an existing admin email
/// reuses the account instead of failing.
///
/// # Errors
///
/// Returns an error if the environment is incomplete or database
/// operations fail.
pub async fn run(email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = ShopConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;

    let users = Arc::new(PgUserStore::new(pool.clone()));
    let products = PgProductStore::new(pool);
    let auth = AuthService::new(users);

    let admin = match auth.signup(email, password).await {
        Ok(user) => {
            info!(user_id = %user.id, "created demo admin");
            user
        }
        Err(AuthError::EmailTaken) => {
            info!(email, "demo admin already exists, reusing");
            auth.login(email, password).await?
        }
        Err(err) => return Err(err.into()),
    };

    for (title, price, description) in DEMO_PRODUCTS {
        let product = products
            .insert(NewProduct {
                title: (*title).to_owned(),
                price: Price::parse(price)?,
                description: (*description).to_owned(),
                image_path: "data/images/placeholder.png".to_owned(),
                owner_id: admin.id,
            })
            .await?;
        info!(product_id = %product.id, title, "seeded product");
    }

    info!("Seeding complete!");
    Ok(())
}
