//! Customer record, owned by the customer service and fetched by the order service.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::{timestamp, Record};
use crate::observability::{attributes, Attributes};

/// Account status of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    Active,
    Inactive,
    Suspended,
}

impl CustomerStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "ACTIVE",
            CustomerStatus::Inactive => "INACTIVE",
            CustomerStatus::Suspended => "SUSPENDED",
        }
    }
}

/// A customer. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    customer_id: String,
    first_name: String,
    last_name: String,
    email: String,
    status: CustomerStatus,
    #[serde(with = "timestamp")]
    created_at: NaiveDateTime,
}

impl Customer {
    pub fn new(
        customer_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        status: CustomerStatus,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            status,
            created_at: timestamp::now(),
        }
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn status(&self) -> CustomerStatus {
        self.status
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Record for Customer {
    const ENTITY: &'static str = "Customer";

    fn id(&self) -> &str {
        &self.customer_id
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn found_attributes(&self) -> Attributes {
        attributes([
            ("customerId", self.customer_id.as_str()),
            ("customerStatus", self.status.as_str()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let customer = Customer::new("123", "John", "Doe", "john.doe@example.com", CustomerStatus::Active);
        let value = serde_json::to_value(&customer).unwrap();

        assert_eq!(value["customerId"], "123");
        assert_eq!(value["firstName"], "John");
        assert_eq!(value["lastName"], "Doe");
        assert_eq!(value["email"], "john.doe@example.com");
        assert_eq!(value["status"], "ACTIVE");
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn test_parses_remote_payload() {
        let payload = r#"{
            "customerId": "999",
            "firstName": "Alice",
            "lastName": "Williams",
            "email": "alice.williams@example.com",
            "status": "SUSPENDED",
            "createdAt": "2024-01-02T03:04:05"
        }"#;
        let customer: Customer = serde_json::from_str(payload).unwrap();

        assert_eq!(customer.customer_id(), "999");
        assert_eq!(customer.status(), CustomerStatus::Suspended);
        assert_eq!(customer.full_name(), "Alice Williams");
    }

    #[test]
    fn test_found_attributes() {
        let customer = Customer::new("456", "Jane", "Smith", "jane.smith@example.com", CustomerStatus::Inactive);
        let attrs = customer.found_attributes();
        assert_eq!(attrs.get("customerId").map(String::as_str), Some("456"));
        assert_eq!(attrs.get("customerStatus").map(String::as_str), Some("INACTIVE"));
    }
}
