#[cfg(test)]
mod repository_tests {
    use crate::models::{next_id, Cart, Product, ProductDraft};
    use tempfile::TempDir;

    use crate::repositories::cart_repository::*;
    use crate::repositories::product_repository::*;

    fn create_test_product(existing: &[Product]) -> Product {
        let draft = ProductDraft {
            title: Some("Beef Empanada".to_string()),
            description: Some("Beef, onion and olives".to_string()),
            code: Some("EMP-BEEF".to_string()),
            price: Some("1500".into()),
            category: Some("Savory".to_string()),
            ..Default::default()
        };
        Product::create(draft, next_id(existing).unwrap()).unwrap()
    }

    mod product_repository_tests {
        use super::*;

        #[tokio::test]
        async fn test_fresh_repository_is_empty() {
            let dir = TempDir::new().unwrap();
            let repo = JsonFileProductRepository::new(dir.path().join("products.json"));

            assert!(repo.find_all().await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_save_all_preserves_order() {
            let dir = TempDir::new().unwrap();
            let repo = JsonFileProductRepository::new(dir.path().join("products.json"));

            let first = create_test_product(&[]);
            let second = create_test_product(std::slice::from_ref(&first));
            repo.save_all(&[second.clone(), first.clone()]).await.unwrap();

            let loaded = repo.find_all().await.unwrap();
            assert_eq!(loaded, vec![second, first]);
        }

        #[tokio::test]
        async fn test_reads_records_without_thumbnails() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("products.json");
            tokio::fs::write(
                &path,
                r#"[{"id":3,"title":"A","description":"d","code":"c","price":10,"status":false,"category":"x"}]"#,
            )
            .await
            .unwrap();

            let repo = JsonFileProductRepository::new(path);
            let loaded = repo.find_all().await.unwrap();
            assert_eq!(loaded.len(), 1);
            assert_eq!(loaded[0].id, 3);
            assert!(!loaded[0].status);
            assert!(loaded[0].thumbnails.is_empty());
        }

        #[tokio::test]
        async fn test_stored_price_is_integer_when_whole() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("products.json");
            let repo = JsonFileProductRepository::new(&path);

            repo.save_all(&[create_test_product(&[])]).await.unwrap();

            let raw: serde_json::Value =
                serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
            assert_eq!(raw[0]["price"], serde_json::json!(1500));
        }
    }

    mod cart_repository_tests {
        use super::*;

        #[tokio::test]
        async fn test_cart_round_trip() {
            let dir = TempDir::new().unwrap();
            let repo = JsonFileCartRepository::new(dir.path().join("carts.json"));

            let mut cart = Cart::new(1);
            cart.add_product(5);
            cart.add_product(5);
            let empty = Cart::new(2);

            repo.save_all(&[cart.clone(), empty.clone()]).await.unwrap();
            assert_eq!(repo.find_all().await.unwrap(), vec![cart, empty]);
        }

        #[tokio::test]
        async fn test_cart_without_products_field_loads_empty_list() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("carts.json");
            tokio::fs::write(&path, r#"[{"id": 2}]"#).await.unwrap();

            let repo = JsonFileCartRepository::new(path);
            let carts = repo.find_all().await.unwrap();
            assert_eq!(carts, vec![Cart { id: 2, products: vec![] }]);
        }

        #[tokio::test]
        async fn test_corrupt_cart_file_is_an_error() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("carts.json");
            tokio::fs::write(&path, r#"[{"id": 1, "prod"#).await.unwrap();
            // A truncated document is tolerated, a wrong shape is not
            let repo = JsonFileCartRepository::new(&path);
            assert!(repo.find_all().await.unwrap().is_empty());

            tokio::fs::write(&path, r#"{"id": 1}"#).await.unwrap();
            assert!(repo.find_all().await.is_err());
        }
    }
}
