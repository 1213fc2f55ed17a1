//! Kist sample application
//!
//! Command-line front end persisting people through the kist mapper.

mod args;
mod cli;
mod model;
mod person_dao;
mod schema;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use cli::Cli;
use kist_core::PersistenceContext;
use log::info;
use person_dao::PersonDao;

fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        in_memory,
        json,
        command,
    } = Args::parse();

    let config = schema::persistence_config(database_file, in_memory)?;
    let context = schema::register(PersistenceContext::builder(config))
        .build()
        .context("Failed to initialize persistence")?;
    let dao = context
        .inject_dao::<PersonDao>()
        .context("Person DAO is not registered")?;

    info!("Kist sample started");

    let cli = Cli::new(dao, json);
    match command {
        Some(command) => cli.handle_command(command),
        None => cli.maintain(),
    }
}
