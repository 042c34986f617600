#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, StoreFairing};
use crate::logging::LoggerFairing;
use crate::model::store::Store;
use crate::service::PollService;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod service;

/// Build the server. Configuration and storage are set up by fairings at ignition.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(StoreFairing)
        .mount("/", api::routes())
}

/// Build a server over an existing store, bypassing storage configuration.
pub fn rocket_for_store(store: Store) -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .manage(PollService::new(store))
        .mount("/", api::routes())
}
