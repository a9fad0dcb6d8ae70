use crate::modules::customer::model::Customer;

/// `(id, first_name, last_name, email)` for each sample customer.
pub const SAMPLE_CUSTOMERS: [(i32, &str, &str, &str); 5] = [
    (1001, "John", "Doe", "john.doe@example.com"),
    (1002, "Jane", "Smith", "jane.smith@example.com"),
    (1003, "Bob", "Johnson", "bob.johnson@example.com"),
    (1004, "Alice", "Brown", "alice.brown@example.com"),
    (1005, "Charlie", "Davis", "charlie.davis@example.com"),
];

/// Sample customers, timestamped now.
pub fn sample_customers() -> Vec<Customer> {
    SAMPLE_CUSTOMERS
        .iter()
        .map(|&(id, first, last, email)| Customer::new(id, first, last, email))
        .collect()
}

pub fn sample_customer_ids() -> Vec<i32> {
    SAMPLE_CUSTOMERS.iter().map(|c| c.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_five_customers_with_unique_ids() {
        let customers = sample_customers();
        assert_eq!(customers.len(), 5);

        let ids: HashSet<i32> = customers.iter().map(|c| c.id).collect();
        assert_eq!(ids, (1001..=1005).collect());
    }

    #[test]
    fn test_literal_values() {
        let customers = sample_customers();
        let jane = customers.iter().find(|c| c.id == 1002).unwrap();

        assert_eq!(jane.first_name, "Jane");
        assert_eq!(jane.last_name, "Smith");
        assert_eq!(jane.email, "jane.smith@example.com");
    }
}
