//! Linear bootstrap of the inventory demo environment.
//!
//! Stages advance Start -> ReplicaInitiated -> Authenticated ->
//! CollectionsCreated -> Seeded -> Done. The first fatal failure stops the
//! run; nothing already applied is rolled back.

use chrono::{DateTime, Utc};
use mongodb::{Client, Database};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::config::database;
use crate::config::settings::{SeedConfig, SeedMode};
use crate::error::{FailureKind, SeedError};
use crate::modules::customer::{crud::CustomerCrud, fixtures::sample_customers};
use crate::modules::order::{crud::OrderCrud, fixtures::sample_orders};
use crate::services::{admin_user, replica_set};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum SeedStage {
    Start,
    ReplicaInitiated,
    Authenticated,
    CollectionsCreated,
    Seeded,
    Done,
}

impl SeedStage {
    pub fn next(self) -> Option<SeedStage> {
        match self {
            SeedStage::Start => Some(SeedStage::ReplicaInitiated),
            SeedStage::ReplicaInitiated => Some(SeedStage::Authenticated),
            SeedStage::Authenticated => Some(SeedStage::CollectionsCreated),
            SeedStage::CollectionsCreated => Some(SeedStage::Seeded),
            SeedStage::Seeded => Some(SeedStage::Done),
            SeedStage::Done => None,
        }
    }
}

impl fmt::Display for SeedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeedStage::Start => "start",
            SeedStage::ReplicaInitiated => "replica-initiated",
            SeedStage::Authenticated => "authenticated",
            SeedStage::CollectionsCreated => "collections-created",
            SeedStage::Seeded => "seeded",
            SeedStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeedStep {
    InitiateReplicaSet,
    AwaitPrimary,
    CreateAdminUser,
    Authenticate,
    SelectDatabase,
    CreateCollections,
    InsertSamples,
}

impl SeedStep {
    /// Stage reached once this step (and its group) has completed.
    pub fn completes(self) -> Option<SeedStage> {
        match self {
            SeedStep::AwaitPrimary => Some(SeedStage::ReplicaInitiated),
            SeedStep::Authenticate => Some(SeedStage::Authenticated),
            SeedStep::CreateCollections => Some(SeedStage::CollectionsCreated),
            SeedStep::InsertSamples => Some(SeedStage::Seeded),
            _ => None,
        }
    }
}

impl fmt::Display for SeedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SeedStep::InitiateReplicaSet => "initiate replica set",
            SeedStep::AwaitPrimary => "await primary",
            SeedStep::CreateAdminUser => "create admin user",
            SeedStep::Authenticate => "authenticate",
            SeedStep::SelectDatabase => "select database",
            SeedStep::CreateCollections => "create collections",
            SeedStep::InsertSamples => "insert samples",
        };
        write!(f, "{}", name)
    }
}

/// Whether a failure of `kind` may be skipped under `mode`.
pub fn tolerates(mode: SeedMode, kind: FailureKind) -> bool {
    mode == SeedMode::Idempotent && kind == FailureKind::AlreadyExists
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionReport {
    pub name: String,
    pub inserted: usize,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub stage: SeedStage,
    pub mode: SeedMode,
    pub database: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub collections: Vec<CollectionReport>,
    pub skipped: Vec<SeedStep>,
}

pub struct Seeder {
    config: SeedConfig,
    stage: SeedStage,
    skipped: Vec<SeedStep>,
}

impl Seeder {
    pub fn new(config: SeedConfig) -> Self {
        Self {
            config,
            stage: SeedStage::Start,
            skipped: Vec::new(),
        }
    }

    pub async fn run(mut self) -> Result<SeedReport, SeedError> {
        let started_at = Utc::now();
        info!(
            "Seeding {} (replica set '{}', mode {})",
            self.config.database, self.config.replica_set_name, self.config.mode
        );

        let bootstrap = self.bootstrap_client().await?;

        let initiated = replica_set::initiate(
            &bootstrap,
            &self.config.replica_set_name,
            &self.config.member_host,
        )
        .await;
        if self.check(SeedStep::InitiateReplicaSet, initiated)?.is_some() {
            info!("Replica set '{}' initiated", self.config.replica_set_name);
        }

        self.await_primary(&bootstrap).await?;
        self.complete(SeedStep::AwaitPrimary);

        let created = admin_user::create_admin_user(
            &bootstrap,
            &self.config.admin_username,
            &self.config.admin_password,
        )
        .await;
        if self.check(SeedStep::CreateAdminUser, created)?.is_some() {
            info!("Admin user '{}' created", self.config.admin_username);
        }

        let client = self.authenticate().await?;
        self.complete(SeedStep::Authenticate);

        let db = client.database(&self.config.database);
        info!("Using database '{}'", db.name());
        self.complete(SeedStep::SelectDatabase);

        self.create_collections(&db).await?;
        self.complete(SeedStep::CreateCollections);

        let collections = self.insert_samples(&db).await?;
        self.complete(SeedStep::InsertSamples);

        self.advance(SeedStage::Done);
        info!("Seeding finished");

        Ok(SeedReport {
            stage: self.stage,
            mode: self.config.mode,
            database: self.config.database.clone(),
            started_at,
            finished_at: Utc::now(),
            collections,
            skipped: self.skipped,
        })
    }

    /// Client for the steps before the admin user exists. In idempotent
    /// mode an already-working admin credential is preferred, since the
    /// server stops accepting anonymous admin commands once a user exists.
    async fn bootstrap_client(&self) -> Result<Client, SeedError> {
        let wrap = |e| SeedError::step(SeedStep::InitiateReplicaSet, SeedStage::Start, e);

        if self.config.mode == SeedMode::Idempotent {
            let admin = database::connect_as_admin(&self.config).await.map_err(wrap)?;
            match admin_user::authenticated_users(&admin).await {
                Ok(users) if users.contains(&self.config.admin_username) => {
                    info!("Existing admin credential accepted, reusing it");
                    return Ok(admin);
                }
                Ok(_) => {}
                Err(e) => info!("Admin credential not usable yet: {}", e),
            }
        }

        database::connect(&self.config).await.map_err(wrap)
    }

    async fn await_primary(&mut self, client: &Client) -> Result<(), SeedError> {
        if self.config.uses_blind_wait() {
            replica_set::blind_wait(self.config.ready_poll_interval()).await;
            return Ok(());
        }

        let timeout = self.config.ready_timeout();
        match replica_set::wait_until_primary(client, timeout, self.config.ready_poll_interval()).await {
            Some(_) => Ok(()),
            None => Err(SeedError::NotReady {
                step: SeedStep::AwaitPrimary,
                stage: self.stage,
                timeout,
            }),
        }
    }

    async fn authenticate(&mut self) -> Result<Client, SeedError> {
        let client = database::connect_as_admin(&self.config)
            .await
            .map_err(|e| SeedError::step(SeedStep::Authenticate, self.stage, e))?;

        let users = admin_user::authenticated_users(&client)
            .await
            .map_err(|e| SeedError::step(SeedStep::Authenticate, self.stage, e))?;

        if !users.contains(&self.config.admin_username) {
            return Err(SeedError::NotAuthenticated {
                step: SeedStep::Authenticate,
                stage: self.stage,
                username: self.config.admin_username.clone(),
            });
        }

        info!("Authenticated as '{}'", self.config.admin_username);
        Ok(client)
    }

    async fn create_collections(&mut self, db: &Database) -> Result<(), SeedError> {
        let customers = CustomerCrud::create_collection(db).await;
        self.check(SeedStep::CreateCollections, customers)?;

        let orders = OrderCrud::create_collection(db).await;
        self.check(SeedStep::CreateCollections, orders)?;

        info!("Collections ready");
        Ok(())
    }

    async fn insert_samples(&mut self, db: &Database) -> Result<Vec<CollectionReport>, SeedError> {
        // Unordered in idempotent mode so fixtures missing from a partial
        // earlier run still get written past duplicate keys.
        let ordered = self.config.mode == SeedMode::Strict;

        let customers = CustomerCrud::new(db);
        let fixtures = sample_customers();
        let inserted = customers.insert_many(&fixtures, ordered).await;
        let customers_inserted = self.check_insert(fixtures.len(), inserted)?;
        let customers_total = customers
            .count()
            .await
            .map_err(|e| SeedError::step(SeedStep::InsertSamples, self.stage, e))?;

        let orders = OrderCrud::new(db);
        let fixtures = sample_orders();
        let inserted = orders.insert_many(&fixtures, ordered).await;
        let orders_inserted = self.check_insert(fixtures.len(), inserted)?;
        let orders_total = orders
            .count()
            .await
            .map_err(|e| SeedError::step(SeedStep::InsertSamples, self.stage, e))?;

        info!(
            "Inserted {} customers and {} orders",
            customers_inserted, orders_inserted
        );

        Ok(vec![
            CollectionReport {
                name: crate::modules::customer::crud::COLLECTION_NAME.to_string(),
                inserted: customers_inserted,
                total: customers_total,
            },
            CollectionReport {
                name: crate::modules::order::crud::COLLECTION_NAME.to_string(),
                inserted: orders_inserted,
                total: orders_total,
            },
        ])
    }

    /// Turn a driver result into the step outcome: `Some` on success,
    /// `None` when the failure is skipped under the current mode.
    fn check<T>(
        &mut self,
        step: SeedStep,
        result: Result<T, mongodb::error::Error>,
    ) -> Result<Option<T>, SeedError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                let err = SeedError::step(step, self.stage, e);
                if tolerates(self.config.mode, err.kind()) {
                    warn!("Skipping {}: {}", step, err);
                    self.mark_skipped(step);
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Bulk insert outcome. When the only failures were duplicate keys and
    /// the mode allows it, the documents written past them still count.
    fn check_insert(
        &mut self,
        attempted: usize,
        result: Result<usize, mongodb::error::Error>,
    ) -> Result<usize, SeedError> {
        let err = match result {
            Ok(inserted) => return Ok(inserted),
            Err(e) => e,
        };

        let written = FailureKind::insert_write_codes(&err)
            .and_then(|codes| FailureKind::inserted_past_duplicates(attempted, &codes));

        match written {
            Some(written) if self.config.mode == SeedMode::Idempotent => {
                warn!(
                    "{} of {} documents already present, inserted the rest",
                    attempted - written,
                    attempted
                );
                self.mark_skipped(SeedStep::InsertSamples);
                Ok(written)
            }
            _ => Err(SeedError::step(SeedStep::InsertSamples, self.stage, err)),
        }
    }

    fn mark_skipped(&mut self, step: SeedStep) {
        if !self.skipped.contains(&step) {
            self.skipped.push(step);
        }
    }

    fn complete(&mut self, step: SeedStep) {
        if let Some(stage) = step.completes() {
            self.advance(stage);
        }
    }

    fn advance(&mut self, stage: SeedStage) {
        debug_assert_eq!(self.stage.next(), Some(stage));
        info!("Stage {} -> {}", self.stage, stage);
        self.stage = stage;
    }
}
