//! Post-run checks that the environment looks the way a single clean seed
//! leaves it.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::database;
use crate::config::settings::SeedConfig;
use crate::error::SeedError;
use crate::modules::customer::{
    crud::{CustomerCrud, COLLECTION_NAME as CUSTOMERS},
    fixtures::{sample_customer_ids, SAMPLE_CUSTOMERS},
    model::Customer,
};
use crate::modules::order::{
    crud::{OrderCrud, COLLECTION_NAME as ORDERS},
    fixtures::{sample_order_ids, SAMPLE_ORDERS},
    model::Order,
};
use crate::services::admin_user;
use crate::services::replica_set::{self, ReplicaSetStatus};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl Check {
    fn pass(name: &str, detail: impl Into<String>) -> Self {
        Self { name: name.to_string(), passed: true, detail: detail.into() }
    }

    fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self { name: name.to_string(), passed: false, detail: detail.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub checks: Vec<Check>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        !self.checks.is_empty() && self.checks.iter().all(|c| c.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed)
    }
}

pub fn check_replica_set(status: Option<&ReplicaSetStatus>, expected_name: &str) -> Check {
    const NAME: &str = "replica set";
    match status {
        None => Check::fail(NAME, "replSetGetStatus returned no set information"),
        Some(s) if s.name != expected_name => {
            Check::fail(NAME, format!("expected set '{}', found '{}'", expected_name, s.name))
        }
        Some(s) if !s.is_primary() => {
            Check::fail(NAME, format!("member state is {}, not primary", s.my_state))
        }
        Some(s) if s.members != 1 => {
            Check::fail(NAME, format!("expected a single member, found {}", s.members))
        }
        Some(s) => Check::pass(NAME, format!("'{}' with one primary member", s.name)),
    }
}

/// The configured user holds every admin role and no other user does.
pub fn check_admin_users(username: &str, users: &[(String, Vec<String>)]) -> Check {
    const NAME: &str = "admin user";
    let Some((_, roles)) = users.iter().find(|(name, _)| name == username) else {
        return Check::fail(NAME, format!("user '{}' not found in admin", username));
    };

    if !admin_user::has_admin_roles(roles) {
        return Check::fail(
            NAME,
            format!("user '{}' has roles {:?}, expected {:?}", username, roles, admin_user::ADMIN_ROLES),
        );
    }

    let admins: Vec<&str> = users
        .iter()
        .filter(|(_, roles)| admin_user::has_admin_roles(roles))
        .map(|(name, _)| name.as_str())
        .collect();
    if admins.len() != 1 {
        return Check::fail(NAME, format!("expected one admin principal, found {:?}", admins));
    }

    Check::pass(NAME, format!("'{}' is the only principal with all admin roles", username))
}

fn unexpected_ids(found: impl Iterator<Item = i32>, expected: Vec<i32>) -> Option<String> {
    let found: BTreeSet<i32> = found.collect();
    let expected: BTreeSet<i32> = expected.into_iter().collect();
    if found == expected {
        return None;
    }
    Some(format!(
        "missing {:?}, unexpected {:?}",
        expected.difference(&found).collect::<Vec<_>>(),
        found.difference(&expected).collect::<Vec<_>>()
    ))
}

pub fn check_collections(names: &[String]) -> Check {
    const NAME: &str = "collections";
    let found: HashSet<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| !n.starts_with("system."))
        .collect();
    let expected: HashSet<&str> = [CUSTOMERS, ORDERS].into_iter().collect();

    if found == expected {
        Check::pass(NAME, format!("exactly {} and {}", CUSTOMERS, ORDERS))
    } else {
        let mut found: Vec<&str> = found.into_iter().collect();
        found.sort_unstable();
        Check::fail(NAME, format!("expected [{}, {}], found {:?}", CUSTOMERS, ORDERS, found))
    }
}

pub fn check_customers(customers: &[Customer]) -> Check {
    const NAME: &str = "customers";
    if customers.len() != SAMPLE_CUSTOMERS.len() {
        return Check::fail(
            NAME,
            format!("expected {} documents, found {}", SAMPLE_CUSTOMERS.len(), customers.len()),
        );
    }

    if let Some(diff) = unexpected_ids(customers.iter().map(|c| c.id), sample_customer_ids()) {
        return Check::fail(NAME, diff);
    }

    let by_id: BTreeMap<i32, &Customer> = customers.iter().map(|c| (c.id, c)).collect();
    for (id, first, last, email) in SAMPLE_CUSTOMERS {
        match by_id.get(&id) {
            None => return Check::fail(NAME, format!("customer {} missing", id)),
            Some(c) if c.first_name != first || c.last_name != last || c.email != email => {
                return Check::fail(NAME, format!("customer {} does not match the sample values", id));
            }
            Some(_) => {}
        }
    }

    Check::pass(NAME, "ids 1001..1005 with sample values")
}

pub fn check_orders(orders: &[Order], customer_ids: &HashSet<i32>) -> Check {
    const NAME: &str = "orders";
    if orders.len() != SAMPLE_ORDERS.len() {
        return Check::fail(
            NAME,
            format!("expected {} documents, found {}", SAMPLE_ORDERS.len(), orders.len()),
        );
    }

    if let Some(diff) = unexpected_ids(orders.iter().map(|o| o.id), sample_order_ids()) {
        return Check::fail(NAME, diff);
    }

    let by_id: BTreeMap<i32, &Order> = orders.iter().map(|o| (o.id, o)).collect();
    for (id, customer_id, status, total) in SAMPLE_ORDERS {
        match by_id.get(&id) {
            None => return Check::fail(NAME, format!("order {} missing", id)),
            Some(o) if o.customer_id != customer_id || o.status != status || o.total != total => {
                return Check::fail(NAME, format!("order {} does not match the sample values", id));
            }
            Some(_) => {}
        }
    }

    if let Some(orphan) = orders.iter().find(|o| !customer_ids.contains(&o.customer_id)) {
        return Check::fail(
            NAME,
            format!("order {} references missing customer {}", orphan.id, orphan.customer_id),
        );
    }

    Check::pass(NAME, "ids 2001..2005, every customer_id resolves")
}

/// Run every check against the configured endpoint.
///
/// Authentication failure is reported as a failed check and ends the run,
/// since nothing else can be inspected without the credential.
pub async fn verify(config: &SeedConfig) -> Result<VerificationReport, SeedError> {
    let mut report = VerificationReport::default();

    let client = database::connect_as_admin(config).await?;
    match admin_user::authenticated_users(&client).await {
        Ok(users) if users.contains(&config.admin_username) => {
            report.checks.push(Check::pass("authentication", format!("as '{}'", config.admin_username)));
        }
        Ok(_) => {
            report.checks.push(Check::fail("authentication", "session is anonymous"));
            return Ok(report);
        }
        Err(e) => {
            report.checks.push(Check::fail("authentication", e.to_string()));
            return Ok(report);
        }
    }

    let status = replica_set::status(&client).await?;
    report
        .checks
        .push(check_replica_set(status.as_ref(), &config.replica_set_name));

    let users = admin_user::list_users(&client).await?;
    report
        .checks
        .push(check_admin_users(&config.admin_username, &users));

    let db = client.database(&config.database);
    let names = db.list_collection_names().await?;
    report.checks.push(check_collections(&names));

    let customers = CustomerCrud::new(&db).find_all().await?;
    let customer_ids: HashSet<i32> = customers.iter().map(|c| c.id).collect();
    report.checks.push(check_customers(&customers));

    let orders = OrderCrud::new(&db).find_all().await?;
    report.checks.push(check_orders(&orders, &customer_ids));

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::customer::fixtures::sample_customers;
    use crate::modules::order::fixtures::sample_orders;

    fn status(name: &str, my_state: i32, members: usize) -> ReplicaSetStatus {
        ReplicaSetStatus { name: name.to_string(), my_state, members }
    }

    #[test]
    fn test_replica_set_checks() {
        assert!(check_replica_set(Some(&status("rs0", 1, 1)), "rs0").passed);
        assert!(!check_replica_set(Some(&status("rs1", 1, 1)), "rs0").passed);
        assert!(!check_replica_set(Some(&status("rs0", 2, 1)), "rs0").passed);
        assert!(!check_replica_set(Some(&status("rs0", 1, 3)), "rs0").passed);
        assert!(!check_replica_set(None, "rs0").passed);
    }

    #[test]
    fn test_admin_role_check() {
        let roles: Vec<String> = admin_user::ADMIN_ROLES.iter().map(|r| r.to_string()).collect();
        let reader = ("reader".to_string(), vec!["read".to_string()]);

        let users = vec![("admin".to_string(), roles.clone()), reader.clone()];
        assert!(check_admin_users("admin", &users).passed);

        let partial = vec![("admin".to_string(), roles[..2].to_vec())];
        assert!(!check_admin_users("admin", &partial).passed);

        assert!(!check_admin_users("admin", &[reader]).passed);
    }

    #[test]
    fn test_second_admin_principal_fails() {
        let roles: Vec<String> = admin_user::ADMIN_ROLES.iter().map(|r| r.to_string()).collect();
        let users = vec![
            ("admin".to_string(), roles.clone()),
            ("backup-admin".to_string(), roles),
        ];

        let check = check_admin_users("admin", &users);
        assert!(!check.passed);
        assert!(check.detail.contains("backup-admin"));
    }

    #[test]
    fn test_collection_check_ignores_system_collections() {
        let names = vec![
            "orders".to_string(),
            "customers".to_string(),
            "system.views".to_string(),
        ];
        assert!(check_collections(&names).passed);

        let extra = vec!["orders".to_string(), "customers".to_string(), "products".to_string()];
        let check = check_collections(&extra);
        assert!(!check.passed);
        assert!(check.detail.contains("products"));
    }

    #[test]
    fn test_sample_data_passes() {
        let ids: HashSet<i32> = sample_customer_ids().into_iter().collect();
        assert!(check_customers(&sample_customers()).passed);
        assert!(check_orders(&sample_orders(), &ids).passed);
    }

    #[test]
    fn test_missing_or_altered_customer_fails() {
        let mut customers = sample_customers();
        customers.pop();
        assert!(!check_customers(&customers).passed);

        let mut customers = sample_customers();
        customers[0].email = "someone@example.com".to_string();
        let check = check_customers(&customers);
        assert!(!check.passed);
        assert!(check.detail.contains("1001"));
    }

    #[test]
    fn test_unexpected_order_id_fails() {
        let ids: HashSet<i32> = sample_customer_ids().into_iter().collect();
        let mut orders = sample_orders();
        orders[4].id = 2099;

        let check = check_orders(&orders, &ids);
        assert!(!check.passed);
        assert!(check.detail.contains("2005"));
        assert!(check.detail.contains("2099"));
    }

    #[test]
    fn test_orphan_order_fails() {
        let mut ids: HashSet<i32> = sample_customer_ids().into_iter().collect();
        ids.remove(&1004);

        let check = check_orders(&sample_orders(), &ids);
        assert!(!check.passed);
        assert!(check.detail.contains("2005"));
    }

    #[test]
    fn test_report_status() {
        let mut report = VerificationReport::default();
        assert!(!report.passed());

        report.checks.push(Check::pass("a", "ok"));
        assert!(report.passed());

        report.checks.push(Check::fail("b", "nope"));
        assert!(!report.passed());
        assert_eq!(report.failures().count(), 1);
    }
}
