//! Admin catalog management flows: CRUD, ownership, asset lifecycle.

#![allow(clippy::unwrap_used)]

use tamarind_integration_tests::TestShop;
use tamarind_shop::ShopError;
use tamarind_shop::models::product::ProductDraft;
use tamarind_shop::services::admin::ImageUpload;

fn draft(title: &str, price: &str) -> ProductDraft {
    ProductDraft {
        title: title.to_owned(),
        price: price.to_owned(),
        description: "desc".to_owned(),
    }
}

fn image(name: &str) -> Option<ImageUpload> {
    Some(ImageUpload {
        bytes: b"fake-image".to_vec(),
        file_name: name.to_owned(),
    })
}

#[tokio::test]
async fn test_create_edit_delete_lifecycle() {
    let shop = TestShop::new();
    let admin = shop.auth.signup("admin@example.com", "adminpassword").await.unwrap();

    let product = shop
        .admin
        .create_product(admin.id, draft("Book", "10"), image("cover.png"))
        .await
        .unwrap();
    let first_image = product.image_path.clone();
    assert!(std::path::Path::new(&first_image).exists());

    // Edit with a replacement image: old asset goes away.
    let updated = shop
        .admin
        .update_product(admin.id, product.id, draft("Book 2e", "12"), image("new.jpg"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Book 2e");
    assert!(!std::path::Path::new(&first_image).exists());
    assert!(std::path::Path::new(&updated.image_path).exists());

    // Delete removes the row and the remaining asset.
    shop.admin.delete_product(admin.id, product.id).await.unwrap();
    assert!(!std::path::Path::new(&updated.image_path).exists());
    let err = shop.catalog.get_product(product.id).await.unwrap_err();
    assert!(matches!(err, ShopError::NotFound(_)));
}

#[tokio::test]
async fn test_ownership_is_enforced_across_admins() {
    let shop = TestShop::new();
    let alice = shop.auth.signup("alice@example.com", "alicepassword").await.unwrap();
    let bob = shop.auth.signup("bob@example.com", "bobpassword12").await.unwrap();

    let product = shop
        .admin
        .create_product(alice.id, draft("Alice's Book", "10"), image("a.png"))
        .await
        .unwrap();

    let edit = shop
        .admin
        .update_product(bob.id, product.id, draft("Bob's now", "1"), None)
        .await
        .unwrap_err();
    assert!(matches!(edit, ShopError::Forbidden(_)));

    let delete = shop.admin.delete_product(bob.id, product.id).await.unwrap_err();
    assert!(matches!(delete, ShopError::Forbidden(_)));

    // Still intact and still Alice's.
    let stored = shop.catalog.get_product(product.id).await.unwrap();
    assert_eq!(stored.title, "Alice's Book");
    assert_eq!(stored.owner_id, alice.id);
}

#[tokio::test]
async fn test_admin_listing_only_shows_own_products() {
    let shop = TestShop::new();
    let alice = shop.auth.signup("alice@example.com", "alicepassword").await.unwrap();
    let bob = shop.auth.signup("bob@example.com", "bobpassword12").await.unwrap();

    for title in ["One", "Two", "Three"] {
        shop.admin
            .create_product(alice.id, draft(title, "1"), image("p.png"))
            .await
            .unwrap();
    }
    shop.admin
        .create_product(bob.id, draft("Bob's", "1"), image("p.png"))
        .await
        .unwrap();

    let alice_page = shop.admin.list_products(alice.id, 2).await.unwrap();
    assert_eq!(alice_page.total_items, 3);
    assert_eq!(alice_page.items.len(), 1);
    assert!(alice_page.has_previous_page);
    assert!(!alice_page.has_next_page);

    // The storefront still shows everything.
    let storefront = shop.catalog.list_products(1).await.unwrap();
    assert_eq!(storefront.total_items, 4);
}

#[tokio::test]
async fn test_rejected_submission_echoes_input() {
    let shop = TestShop::new();
    let admin = shop.auth.signup("admin@example.com", "adminpassword").await.unwrap();

    let submitted = ProductDraft {
        title: "  ".to_owned(),
        price: "free".to_owned(),
        description: "still typed this".to_owned(),
    };
    let err = shop
        .admin
        .create_product(admin.id, submitted.clone(), image("p.png"))
        .await
        .unwrap_err();

    let ShopError::Validation(validation) = err else {
        panic!("expected a validation error");
    };
    assert_eq!(validation.draft, submitted);
    assert!(validation.errors.iter().any(|e| e.field == "title"));
    assert!(validation.errors.iter().any(|e| e.field == "price"));

    // Nothing was stored, including no orphaned image.
    let page = shop.admin.list_products(admin.id, 1).await.unwrap();
    assert_eq!(page.total_items, 0);
    assert_eq!(std::fs::read_dir(shop.upload_dir()).unwrap().count(), 0);
}
