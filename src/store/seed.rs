//! Fixture records loaded at startup.

use rust_decimal::Decimal;

use crate::domain::{Customer, CustomerStatus, DomainError, Order};

/// Orders ORD-001..ORD-005.
pub fn seed_orders() -> Result<Vec<Order>, DomainError> {
    [
        ("ORD-001", "123", "Laptop Computer", 1, Decimal::new(99999, 2)),
        ("ORD-002", "456", "Wireless Mouse", 2, Decimal::new(2999, 2)),
        ("ORD-003", "789", "USB-C Cable", 3, Decimal::new(1999, 2)),
        ("ORD-004", "999", "External Monitor", 1, Decimal::new(29999, 2)),
        ("ORD-005", "123", "Mechanical Keyboard", 1, Decimal::new(14999, 2)),
    ]
    .into_iter()
    .map(|(order_id, customer_id, product, quantity, price)| {
        Order::new(order_id, customer_id, product, quantity, price)
    })
    .collect()
}

/// Customers referenced by the seeded orders.
pub fn seed_customers() -> Vec<Customer> {
    vec![
        Customer::new("123", "John", "Doe", "john.doe@example.com", CustomerStatus::Active),
        Customer::new("456", "Jane", "Smith", "jane.smith@example.com", CustomerStatus::Active),
        Customer::new("789", "Bob", "Johnson", "bob.johnson@example.com", CustomerStatus::Inactive),
        Customer::new(
            "999",
            "Alice",
            "Williams",
            "alice.williams@example.com",
            CustomerStatus::Suspended,
        ),
    ]
}
