use serde::{Deserialize, Serialize};

pub const STATUS_COMPLETED: &str = "COMPLETED";
pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_CANCELLED: &str = "CANCELLED";

/// `customer_id` refers to a `customers` document by convention only.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: i32,
    pub customer_id: i32,
    pub order_date: bson::DateTime,
    pub status: String,
    pub total: f64,
}

impl Order {
    pub fn new(id: i32, customer_id: i32, status: &str, total: f64) -> Self {
        Self {
            id,
            customer_id,
            order_date: bson::DateTime::now(),
            status: status.to_string(),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;

    #[test]
    fn test_serializes_total_as_double() {
        let order = Order::new(2002, 1001, STATUS_PENDING, 15.50);
        let doc = bson::to_document(&order).unwrap();

        assert_eq!(doc.get("_id"), Some(&Bson::Int32(2002)));
        assert_eq!(doc.get("customer_id"), Some(&Bson::Int32(1001)));
        assert_eq!(doc.get("total"), Some(&Bson::Double(15.5)));
        assert_eq!(doc.get_str("status").unwrap(), "PENDING");
        assert!(matches!(doc.get("order_date"), Some(Bson::DateTime(_))));
    }

    #[test]
    fn test_status_is_free_form() {
        let order = Order::new(9999, 1001, "ON_HOLD", 1.0);
        let back: Order = bson::from_document(bson::to_document(&order).unwrap()).unwrap();
        assert_eq!(back.status, "ON_HOLD");
        assert_eq!(back, order);
    }
}
