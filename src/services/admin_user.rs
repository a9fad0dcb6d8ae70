use bson::{doc, Bson, Document};
use mongodb::Client;

use crate::config::settings::ADMIN_DATABASE;

/// Roles granted to the admin principal, all scoped to `admin`.
pub const ADMIN_ROLES: [&str; 4] = [
    "root",
    "userAdminAnyDatabase",
    "dbAdminAnyDatabase",
    "readWriteAnyDatabase",
];

pub fn role_documents() -> Vec<Bson> {
    ADMIN_ROLES
        .iter()
        .map(|role| Bson::Document(doc! { "role": *role, "db": ADMIN_DATABASE }))
        .collect()
}

pub async fn create_admin_user(
    client: &Client,
    username: &str,
    password: &str,
) -> Result<(), mongodb::error::Error> {
    client
        .database(ADMIN_DATABASE)
        .run_command(doc! {
            "createUser": username,
            "pwd": password,
            "roles": role_documents(),
        })
        .await?;
    Ok(())
}

pub async fn drop_user(client: &Client, username: &str) -> Result<(), mongodb::error::Error> {
    client
        .database(ADMIN_DATABASE)
        .run_command(doc! { "dropUser": username })
        .await?;
    Ok(())
}

/// Users the current session is authenticated as, per `connectionStatus`.
pub async fn authenticated_users(client: &Client) -> Result<Vec<String>, mongodb::error::Error> {
    let status = client
        .database(ADMIN_DATABASE)
        .run_command(doc! { "connectionStatus": 1 })
        .await?;
    Ok(parse_authenticated_users(&status))
}

pub fn parse_authenticated_users(status: &Document) -> Vec<String> {
    status
        .get_document("authInfo")
        .and_then(|info| info.get_array("authenticatedUsers"))
        .map(|users| {
            users
                .iter()
                .filter_map(|u| u.as_document())
                .filter_map(|u| u.get_str("user").ok())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Every user defined in `admin` with its admin-scoped role names.
pub async fn list_users(client: &Client) -> Result<Vec<(String, Vec<String>)>, mongodb::error::Error> {
    let info = client
        .database(ADMIN_DATABASE)
        .run_command(doc! { "usersInfo": 1 })
        .await?;
    Ok(parse_users(&info))
}

pub fn parse_users(users_info: &Document) -> Vec<(String, Vec<String>)> {
    users_info
        .get_array("users")
        .map(|users| {
            users
                .iter()
                .filter_map(|u| u.as_document())
                .filter_map(|u| Some((u.get_str("user").ok()?.to_string(), admin_scoped_roles(u))))
                .collect()
        })
        .unwrap_or_default()
}

fn admin_scoped_roles(user: &Document) -> Vec<String> {
    user.get_array("roles")
        .map(|roles| {
            roles
                .iter()
                .filter_map(|r| r.as_document())
                .filter(|r| r.get_str("db").map(|db| db == ADMIN_DATABASE).unwrap_or(false))
                .filter_map(|r| r.get_str("role").ok())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// True when `roles` contains every admin role.
pub fn has_admin_roles(roles: &[String]) -> bool {
    ADMIN_ROLES
        .iter()
        .all(|expected| roles.iter().any(|r| r == expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_documents() {
        let roles = role_documents();
        assert_eq!(roles.len(), 4);

        let first = roles[0].as_document().unwrap();
        assert_eq!(first.get_str("role").unwrap(), "root");
        assert_eq!(first.get_str("db").unwrap(), "admin");
    }

    #[test]
    fn test_parse_authenticated_users() {
        let status = doc! {
            "authInfo": {
                "authenticatedUsers": [ { "user": "admin", "db": "admin" } ],
                "authenticatedUserRoles": []
            },
            "ok": 1.0
        };
        assert_eq!(parse_authenticated_users(&status), vec!["admin".to_string()]);

        let anonymous = doc! { "authInfo": { "authenticatedUsers": [] }, "ok": 1.0 };
        assert!(parse_authenticated_users(&anonymous).is_empty());
    }

    #[test]
    fn test_parse_users_keeps_admin_scoped_roles() {
        let info = doc! {
            "users": [{
                "user": "admin",
                "db": "admin",
                "roles": [
                    { "role": "root", "db": "admin" },
                    { "role": "userAdminAnyDatabase", "db": "admin" },
                    { "role": "dbAdminAnyDatabase", "db": "admin" },
                    { "role": "readWriteAnyDatabase", "db": "admin" },
                    { "role": "read", "db": "inventory" }
                ]
            }],
            "ok": 1.0
        };

        let users = parse_users(&info);
        let (_, roles) = &users[0];
        assert_eq!(roles.len(), 4);
        assert!(has_admin_roles(roles));
    }

    #[test]
    fn test_parse_users() {
        let info = doc! {
            "users": [
                { "user": "admin", "db": "admin", "roles": [ { "role": "root", "db": "admin" } ] },
                { "user": "reader", "db": "admin", "roles": [] }
            ],
            "ok": 1.0
        };

        let users = parse_users(&info);
        assert_eq!(users.len(), 2);
        assert_eq!(users[0], ("admin".to_string(), vec!["root".to_string()]));
        assert!(users[1].1.is_empty());
    }

    #[test]
    fn test_unknown_user_and_missing_roles() {
        assert!(parse_users(&doc! { "users": [], "ok": 1.0 }).is_empty());

        let partial = vec!["root".to_string(), "dbAdminAnyDatabase".to_string()];
        assert!(!has_admin_roles(&partial));
    }
}
