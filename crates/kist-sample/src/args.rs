use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Sample application for the kist SQLite mapper
///
/// Seeds and queries a small table of people through the generated entity
/// descriptors and a hand-written DAO. Running without a subcommand seeds ten
/// people and lists the table.
#[derive(Parser)]
#[command(version, about, name = "kist")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/kist/kist.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Use a private in-memory database that is discarded on exit
    #[arg(long, global = true, conflicts_with = "database_file")]
    pub in_memory: bool,

    /// Print results as JSON instead of plain text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Insert sample people
    Seed(SeedArgs),
    /// List every person
    #[command(alias = "ls")]
    List,
    /// Show a single person
    Show(IdArgs),
    /// Find people whose street starts with a prefix, optionally by name too
    Street(StreetArgs),
    /// List ids and names only
    Names,
    /// Count the active people
    CountActive,
    /// Mark a person inactive
    Deactivate(IdArgs),
    /// Delete a person permanently
    #[command(alias = "rm")]
    Delete(IdArgs),
}

#[derive(ClapArgs)]
pub struct SeedArgs {
    #[arg(short, long, default_value_t = 10, help = "Number of people to insert")]
    pub count: u32,
}

#[derive(ClapArgs)]
pub struct IdArgs {
    #[arg(help = "Unique identifier of the person")]
    pub id: i32,
}

#[derive(ClapArgs)]
pub struct StreetArgs {
    #[arg(help = "Beginning of the street name")]
    pub prefix: String,
    #[arg(short, long, help = "Only people whose name starts with this")]
    pub name: Option<String>,
}
