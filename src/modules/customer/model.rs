use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Customer {
    #[serde(rename = "_id")]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: bson::DateTime,
}

impl Customer {
    pub fn new(id: i32, first_name: &str, last_name: &str, email: &str) -> Self {
        Self {
            id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            created_at: bson::DateTime::now(),
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::Bson;

    #[test]
    fn test_serializes_id_as_int32() {
        let customer = Customer::new(1001, "John", "Doe", "john.doe@example.com");
        let doc = bson::to_document(&customer).unwrap();

        assert_eq!(doc.get("_id"), Some(&Bson::Int32(1001)));
        assert_eq!(doc.get_str("email").unwrap(), "john.doe@example.com");
        assert!(matches!(doc.get("created_at"), Some(Bson::DateTime(_))));
        assert!(!doc.contains_key("id"));
    }

    #[test]
    fn test_full_name() {
        let customer = Customer::new(1003, "Bob", "Johnson", "bob.johnson@example.com");
        assert_eq!(customer.full_name(), "Bob Johnson");
    }
}
