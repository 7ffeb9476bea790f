//! Order record.

use chrono::NaiveDateTime;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{timestamp, Customer, DomainError, Record};
use crate::observability::{attributes, Attributes, Measurements};

/// Lifecycle status of an order. New orders start as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

/// An order, optionally enriched with the customer who placed it.
///
/// `total_amount` is `unit_price × quantity`, computed in [`Order::new`].
/// There is no way to change price, quantity or total afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    order_id: String,
    customer_id: String,
    product_name: String,
    quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    total_amount: Decimal,
    status: OrderStatus,
    #[serde(with = "timestamp")]
    order_date: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer: Option<Customer>,
}

impl Order {
    /// Create a pending order dated now.
    pub fn new(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity(quantity));
        }
        if unit_price < Decimal::ZERO {
            return Err(DomainError::NegativePrice(unit_price));
        }
        let total_amount = unit_price
            .checked_mul(Decimal::from(quantity))
            .ok_or(DomainError::TotalOverflow { quantity, unit_price })?;

        Ok(Self {
            order_id: order_id.into(),
            customer_id: customer_id.into(),
            product_name: product_name.into(),
            quantity,
            unit_price,
            total_amount,
            status: OrderStatus::default(),
            order_date: timestamp::now(),
            customer: None,
        })
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn total_amount(&self) -> Decimal {
        self.total_amount
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn order_date(&self) -> NaiveDateTime {
        self.order_date
    }

    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    /// Attach the customer fetched during enrichment.
    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.customer = Some(customer);
        self
    }
}

impl Record for Order {
    const ENTITY: &'static str = "Order";

    fn id(&self) -> &str {
        &self.order_id
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn found_attributes(&self) -> Attributes {
        attributes([
            ("orderId", self.order_id.as_str()),
            ("customerId", self.customer_id.as_str()),
            ("status", self.status.as_str()),
        ])
    }

    fn found_measurements(&self) -> Measurements {
        let mut measurements = Measurements::new();
        // Telemetry only; the record itself keeps the exact decimal.
        measurements.insert("totalAmount".to_string(), self.total_amount.to_f64().unwrap_or_default());
        measurements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CustomerStatus;

    fn price(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_total_is_exact() {
        let order = Order::new("ORD-002", "456", "Wireless Mouse", 2, price(2999)).unwrap();
        assert_eq!(order.total_amount(), price(5998));
        assert_eq!(order.total_amount().to_string(), "59.98");

        let order = Order::new("ORD-003", "789", "USB-C Cable", 3, price(1999)).unwrap();
        assert_eq!(order.total_amount(), price(5997));
    }

    #[test]
    fn test_new_order_is_pending_without_customer() {
        let order = Order::new("ORD-001", "123", "Laptop Computer", 1, price(99999)).unwrap();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert!(order.customer().is_none());
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert_eq!(
            Order::new("X", "1", "Thing", 0, price(100)).unwrap_err(),
            DomainError::InvalidQuantity(0)
        );
        assert!(matches!(
            Order::new("X", "1", "Thing", 1, price(-1)),
            Err(DomainError::NegativePrice(_))
        ));
        assert!(Order::new("X", "1", "Freebie", 1, Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_overflowing_total_is_rejected() {
        assert_eq!(
            Order::new("X", "1", "Thing", 2, Decimal::MAX).unwrap_err(),
            DomainError::TotalOverflow {
                quantity: 2,
                unit_price: Decimal::MAX,
            }
        );
        let order = Order::new("X", "1", "Thing", 1, Decimal::MAX).unwrap();
        assert_eq!(order.total_amount(), Decimal::MAX);
    }

    #[test]
    fn test_json_shape() {
        let order = Order::new("ORD-002", "456", "Wireless Mouse", 2, price(2999)).unwrap();
        let value = serde_json::to_value(&order).unwrap();

        assert_eq!(value["orderId"], "ORD-002");
        assert_eq!(value["customerId"], "456");
        assert_eq!(value["productName"], "Wireless Mouse");
        assert_eq!(value["quantity"], 2);
        assert_eq!(value["unitPrice"].as_f64(), Some(29.99));
        assert_eq!(value["totalAmount"].as_f64(), Some(59.98));
        assert_eq!(value["status"], "PENDING");
        assert!(value["orderDate"].is_string());
        assert!(value.get("customer").is_none());
    }

    #[test]
    fn test_with_customer_keeps_order_fields() {
        let order = Order::new("ORD-001", "123", "Laptop Computer", 1, price(99999)).unwrap();
        let customer = Customer::new("123", "John", "Doe", "john.doe@example.com", CustomerStatus::Active);
        let enriched = order.clone().with_customer(customer.clone());

        assert_eq!(enriched.customer(), Some(&customer));
        assert_eq!(enriched.total_amount(), order.total_amount());
        assert_eq!(enriched.order_date(), order.order_date());
    }

    #[test]
    fn test_found_telemetry() {
        let order = Order::new("ORD-002", "456", "Wireless Mouse", 2, price(2999)).unwrap();
        let attrs = order.found_attributes();
        assert_eq!(attrs.get("orderId").map(String::as_str), Some("ORD-002"));
        assert_eq!(attrs.get("status").map(String::as_str), Some("PENDING"));
        assert_eq!(order.found_measurements().get("totalAmount"), Some(&59.98));
    }
}
