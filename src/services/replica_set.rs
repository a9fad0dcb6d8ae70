use bson::{doc, Document};
use mongodb::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::settings::ADMIN_DATABASE;

/// `myState` value of a primary member.
pub const STATE_PRIMARY: i32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct ReplicaSetStatus {
    pub name: String,
    pub my_state: i32,
    pub members: usize,
}

impl ReplicaSetStatus {
    pub fn from_document(status: &Document) -> Option<Self> {
        let name = status.get_str("set").ok()?.to_string();
        let my_state = match status.get("myState")? {
            bson::Bson::Int32(v) => *v,
            bson::Bson::Int64(v) => *v as i32,
            bson::Bson::Double(v) => *v as i32,
            _ => return None,
        };
        let members = status.get_array("members").map(|m| m.len()).unwrap_or(0);

        Some(Self { name, my_state, members })
    }

    pub fn is_primary(&self) -> bool {
        self.my_state == STATE_PRIMARY
    }
}

/// Single-member replica set configuration for `replSetInitiate`.
pub fn topology_descriptor(set_name: &str, member_host: &str) -> Document {
    doc! {
        "_id": set_name,
        "members": [
            { "_id": 0, "host": member_host }
        ]
    }
}

pub async fn initiate(
    client: &Client,
    set_name: &str,
    member_host: &str,
) -> Result<Document, mongodb::error::Error> {
    let command = doc! { "replSetInitiate": topology_descriptor(set_name, member_host) };
    client.database(ADMIN_DATABASE).run_command(command).await
}

pub async fn is_writable_primary(client: &Client) -> Result<bool, mongodb::error::Error> {
    let hello = client
        .database(ADMIN_DATABASE)
        .run_command(doc! { "hello": 1 })
        .await?;
    Ok(hello.get_bool("isWritablePrimary").unwrap_or(false))
}

/// Poll `hello` until the member reports itself writable primary. Returns
/// the time it took, or `None` once `timeout` runs out.
pub async fn wait_until_primary(
    client: &Client,
    timeout: Duration,
    poll_interval: Duration,
) -> Option<Duration> {
    let started = Instant::now();

    loop {
        match is_writable_primary(client).await {
            Ok(true) => {
                let elapsed = started.elapsed();
                info!("Replica set primary ready after {:?}", elapsed);
                return Some(elapsed);
            }
            Ok(false) => debug!("Member not primary yet"),
            // Elections can briefly drop connections; keep polling.
            Err(e) => debug!("hello failed while waiting for primary: {}", e),
        }

        if started.elapsed() + poll_interval > timeout {
            return None;
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Fixed pause with no readiness check.
pub async fn blind_wait(pause: Duration) {
    info!("Waiting {:?} for replica set to settle", pause);
    tokio::time::sleep(pause).await;
}

pub async fn status(client: &Client) -> Result<Option<ReplicaSetStatus>, mongodb::error::Error> {
    let status = client
        .database(ADMIN_DATABASE)
        .run_command(doc! { "replSetGetStatus": 1 })
        .await?;
    Ok(ReplicaSetStatus::from_document(&status))
}
