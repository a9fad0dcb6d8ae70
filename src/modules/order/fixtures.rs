use crate::modules::order::model::{Order, STATUS_CANCELLED, STATUS_COMPLETED, STATUS_PENDING};

/// `(id, customer_id, status, total)` for each sample order.
pub const SAMPLE_ORDERS: [(i32, i32, &str, f64); 5] = [
    (2001, 1001, STATUS_COMPLETED, 99.99),
    (2002, 1001, STATUS_PENDING, 15.50),
    (2003, 1002, STATUS_CANCELLED, 25.75),
    (2004, 1003, STATUS_COMPLETED, 75.25),
    (2005, 1004, STATUS_PENDING, 35.50),
];

/// Sample orders, timestamped now.
pub fn sample_orders() -> Vec<Order> {
    SAMPLE_ORDERS
        .iter()
        .map(|&(id, customer_id, status, total)| Order::new(id, customer_id, status, total))
        .collect()
}

pub fn sample_order_ids() -> Vec<i32> {
    SAMPLE_ORDERS.iter().map(|o| o.0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::customer::fixtures::sample_customer_ids;
    use std::collections::HashSet;

    #[test]
    fn test_five_orders_with_unique_ids() {
        let ids: HashSet<i32> = sample_orders().iter().map(|o| o.id).collect();
        assert_eq!(ids, (2001..=2005).collect());
    }

    #[test]
    fn test_every_order_references_a_sample_customer() {
        let customers: HashSet<i32> = sample_customer_ids().into_iter().collect();

        for order in sample_orders() {
            assert!(
                customers.contains(&order.customer_id),
                "order {} references unknown customer {}",
                order.id,
                order.customer_id
            );
        }
    }

    #[test]
    fn test_statuses() {
        let statuses: Vec<String> = sample_orders().into_iter().map(|o| o.status).collect();
        assert_eq!(
            statuses,
            vec!["COMPLETED", "PENDING", "CANCELLED", "COMPLETED", "PENDING"]
        );
    }
}
