use serde::{Deserialize, Serialize};

use super::Identified;

/// Shopping cart with its embedded line items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: u64,
    #[serde(default)]
    pub products: Vec<LineItem>,
}

/// One product reference in a cart. The product id is opaque: it is not
/// checked against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product: u64,
    pub quantity: u32,
}

impl Identified for Cart {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Cart {
    /// Create an empty cart with an already allocated `id`
    pub fn new(id: u64) -> Self {
        Self {
            id,
            products: Vec::new(),
        }
    }

    /// Add one unit of a product, incrementing the existing line item if the
    /// product is already in the cart. Returns the resulting quantity.
    pub fn add_product(&mut self, product_id: u64) -> u32 {
        if let Some(item) = self.products.iter_mut().find(|i| i.product == product_id) {
            item.quantity = item.quantity.saturating_add(1);
            item.quantity
        } else {
            self.products.push(LineItem {
                product: product_id,
                quantity: 1,
            });
            1
        }
    }

    /// Total number of units across all line items
    pub fn total_quantity(&self) -> u64 {
        self.products.iter().map(|i| u64::from(i.quantity)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_cart_is_empty() {
        let cart = Cart::new(1);
        assert_eq!(cart.id, 1);
        assert!(cart.products.is_empty());
        assert_eq!(cart.total_quantity(), 0);
    }

    #[test]
    fn test_add_product_increments_duplicates() {
        let mut cart = Cart::new(1);

        assert_eq!(cart.add_product(7), 1);
        assert_eq!(cart.add_product(7), 2);
        assert_eq!(cart.add_product(3), 1);

        assert_eq!(
            cart.products,
            vec![
                LineItem {
                    product: 7,
                    quantity: 2
                },
                LineItem {
                    product: 3,
                    quantity: 1
                },
            ]
        );
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_cart_wire_format() {
        let mut cart = Cart::new(1);
        cart.add_product(7);

        let value = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            value,
            json!({"id": 1, "products": [{"product": 7, "quantity": 1}]})
        );
    }
}
