use std::sync::Arc;

use chrono::Utc;
use log::{error, info};
use mongodb::{error::Error as DbError, Client as MongoClient, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    api::fixture::load_fixture_file,
    mongodb::ensure_indexes_exist,
    store::{MemoryStore, MongoStore, Store},
};
use crate::service::PollService;

/// Which store backs the server.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Keep everything in process memory; lost on shutdown.
    #[default]
    Memory,
    /// Persist to MongoDB at `db_uri`.
    Mongodb,
}

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // non-secrets
    #[serde(default)]
    storage: StorageKind,
    #[serde(default = "default_db_name")]
    db_name: String,
    #[serde(default)]
    fixtures: Option<String>,
    // secrets
    #[serde(default)]
    db_uri: Option<String>,
}

fn default_db_name() -> String {
    "polls".to_string()
}

impl Config {
    /// The kind of store to use.
    pub fn storage(&self) -> StorageKind {
        self.storage
    }

    /// Name of the MongoDB database holding the poll collections.
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Optional path of a JSON fixture file to seed the store with at launch.
    pub fn fixtures(&self) -> Option<&str> {
        self.fixtures.as_deref()
    }

    /// MongoDB connection string; required when `storage = "mongodb"`.
    pub fn db_uri(&self) -> Option<&str> {
        self.db_uri.as_deref()
    }
}

/// Extracts [`Config`] from the figment into managed state, pretty-printing
/// any extraction error before failing ignition.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that builds the configured store, seeds it from the fixture
/// file if one is set, and places a [`PollService`] into managed state.
///
/// Must be attached after [`ConfigFairing`].
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Poll store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = rocket.state::<Config>().cloned();
        let Some(config) = config else {
            error!("Application config is not loaded; attach `ConfigFairing` first");
            return Err(rocket);
        };

        let store: Store = match config.storage() {
            StorageKind::Memory => {
                info!("Using in-memory storage");
                Arc::new(MemoryStore::new())
            }
            StorageKind::Mongodb => {
                let Some(db_uri) = config.db_uri() else {
                    error!("`storage` is \"mongodb\" but `db_uri` is not set");
                    return Err(rocket);
                };
                info!("Loaded database config, connecting...");
                let db = match connect(db_uri, config.db_name()).await {
                    Ok(db) => db,
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                };
                info!("...database connection online!");
                Arc::new(MongoStore::new(&db))
            }
        };

        if let Some(path) = config.fixtures() {
            if let Err(e) = load_fixture_file(store.as_ref(), path, Utc::now()).await {
                error!("Failed to load fixtures from '{path}': {e}");
                return Err(rocket);
            }
        }

        // Manage the state.
        rocket = rocket.manage(PollService::new(store));
        Ok(rocket)
    }
}

/// Connect to MongoDB and make sure the collections are indexed.
pub(crate) async fn connect(db_uri: &str, db_name: &str) -> Result<Database, DbError> {
    let client = MongoClient::with_uri_str(db_uri).await?;
    let db = client.database(db_name);
    ensure_indexes_exist(&db).await?;
    Ok(db)
}
