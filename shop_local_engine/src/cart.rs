//! An in-memory shopping cart.
//!
//! The cart is pure client-side state: a list of line items keyed by product id. Its total is computed from the
//! product prices the client is currently displaying, which is only an estimate. The authoritative total is
//! recomputed from the product store when the order is placed, and the order is rejected if the two disagree (the
//! client then refreshes its product list and retries).

use sl_common::Paise;

use crate::db_types::{NewOrder, NewOrderItem, PaymentMethod, Product};

#[derive(Debug, Clone)]
pub struct CartItem {
    pub product: Product,
    pub quantity: i64,
}

impl CartItem {
    pub fn line_total(&self) -> Paise {
        self.product.selling_price * self.quantity
    }
}

/// A cart holds items from a single shop; adding a product from a different shop empties it first, since an order
/// is placed against exactly one shop.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of the product, incrementing the quantity if it is already in the cart.
    pub fn add(&mut self, product: Product) {
        if self.items.first().map(|i| i.product.shop_id) != Some(product.shop_id) && !self.items.is_empty() {
            self.items.clear();
        }
        match self.items.iter_mut().find(|i| i.product.id == product.id) {
            Some(item) => item.quantity += 1,
            None => self.items.push(CartItem { product, quantity: 1 }),
        }
    }

    /// Sets the quantity of a line item. A quantity of zero or less removes the item.
    pub fn set_quantity(&mut self, product_id: i64, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) {
            item.quantity = quantity;
        }
    }

    pub fn remove(&mut self, product_id: i64) {
        self.items.retain(|i| i.product.id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Σ price × quantity over the displayed prices.
    pub fn total(&self) -> Paise {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// The shop this cart is for, if it holds anything.
    pub fn shop_id(&self) -> Option<i64> {
        self.items.first().map(|i| i.product.shop_id)
    }

    /// Builds the order-submission payload for checkout. Returns `None` for an empty cart. The cart itself is left
    /// untouched; callers clear it only once the order has been accepted.
    pub fn to_order(&self, payment_method: PaymentMethod, payment_status: bool) -> Option<NewOrder> {
        let shop_id = self.shop_id()?;
        Some(NewOrder {
            customer_id: 0,
            shop_id,
            total_amount: self.total(),
            payment_method,
            payment_status,
            delivery_address: None,
            delivery_latitude: None,
            delivery_longitude: None,
            items: self
                .items
                .iter()
                .map(|i| NewOrderItem { product_id: i.product.id, quantity: i.quantity })
                .collect(),
        })
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;

    fn product(id: i64, shop_id: i64, price: i64) -> Product {
        Product {
            id,
            shop_id,
            name: format!("Product {id}"),
            description: None,
            mrp: Paise::from(price),
            selling_price: Paise::from(price),
            stock: 10,
            unit: None,
            is_available: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn adding_twice_increments_the_quantity() {
        let mut cart = Cart::new();
        cart.add(product(1, 3, 2500));
        cart.add(product(1, 3, 2500));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total(), Paise::from(5000));
    }

    #[test]
    fn zero_quantity_removes_the_item() {
        let mut cart = Cart::new();
        cart.add(product(1, 3, 2500));
        cart.add(product(2, 3, 1000));
        cart.set_quantity(1, 0);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product.id, 2);
        cart.set_quantity(2, 5);
        assert_eq!(cart.total(), Paise::from(5000));
    }

    #[test]
    fn switching_shops_empties_the_cart() {
        let mut cart = Cart::new();
        cart.add(product(1, 3, 2500));
        cart.add(product(9, 4, 1000));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.shop_id(), Some(4));
    }

    #[test]
    fn checkout_payload_matches_the_cart() {
        let mut cart = Cart::new();
        cart.add(product(1, 3, 2500));
        cart.add(product(1, 3, 2500));
        let order = cart.to_order(PaymentMethod::Upi, false).unwrap();
        assert_eq!(order.shop_id, 3);
        assert_eq!(order.total_amount, Paise::from(5000));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert!(!cart.is_empty(), "checkout must not clear the cart before the order is accepted");
    }

    #[test]
    fn empty_cart_cannot_check_out() {
        let cart = Cart::new();
        assert!(cart.to_order(PaymentMethod::Cash, false).is_none());
    }
}
