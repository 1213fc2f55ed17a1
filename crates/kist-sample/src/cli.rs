//! Command handlers printing DAO results to stdout.

use std::{fmt::Display, sync::Arc};

use anyhow::{bail, Context, Result};
use jiff::Zoned;
use kist_core::KistDao;
use log::info;
use serde::Serialize;
use serde_json::json;

use crate::{
    args::Commands,
    model::{Person, UserType},
    person_dao::PersonDao,
};

pub struct Cli {
    dao: Arc<PersonDao>,
    json: bool,
}

impl Cli {
    pub fn new(dao: Arc<PersonDao>, json: bool) -> Self {
        Self { dao, json }
    }

    pub fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Seed(args) => self.seed(args.count),
            Commands::List => self.list(),
            Commands::Show(args) => self.show(args.id),
            Commands::Street(args) => self.street(&args.prefix, args.name.as_deref()),
            Commands::Names => self.names(),
            Commands::CountActive => self.count_active(),
            Commands::Deactivate(args) => self.deactivate(args.id),
            Commands::Delete(args) => self.delete(args.id),
        }
    }

    /// Seeds ten people and lists the whole table.
    pub fn maintain(&self) -> Result<()> {
        info!("Creating person data");
        self.insert_people(10)?;
        info!("Creation done. Listing");
        self.list()
    }

    fn insert_people(&self, count: u32) -> Result<Vec<i64>> {
        (0..count)
            .map(|index| {
                self.dao
                    .insert(&sample_person(index))
                    .with_context(|| format!("Failed to insert person {index}"))
            })
            .collect()
    }

    fn seed(&self, count: u32) -> Result<()> {
        let ids = self.insert_people(count)?;
        if self.json {
            println!("{}", json!({ "created": ids }));
        } else {
            println!("Created {} people", ids.len());
        }
        Ok(())
    }

    fn list(&self) -> Result<()> {
        let people = self.dao.find_all().context("Failed to list people")?;
        self.print_all(&people, "No people found.")
    }

    fn show(&self, id: i32) -> Result<()> {
        let Some(person) = self.dao.find_by_id(&id).context("Failed to load person")? else {
            bail!("Person with id {id} not found");
        };
        self.print_one(&person)
    }

    fn street(&self, prefix: &str, name: Option<&str>) -> Result<()> {
        let street = format!("{prefix}%");
        let people = match name {
            Some(name) => self.dao.find_by_name_street(&format!("{name}%"), &street),
            None => self.dao.find_by_street(&street),
        }
        .context("Failed to search by street")?;
        self.print_all(&people, "No people found.")
    }

    fn names(&self) -> Result<()> {
        let references = self
            .dao
            .list_minimal_reference()
            .context("Failed to list names")?;
        self.print_all(&references, "No people found.")
    }

    fn count_active(&self) -> Result<()> {
        let count = self.dao.count_active().context("Failed to count people")?;
        if self.json {
            println!("{}", json!({ "active": count }));
        } else {
            println!("{count} active");
        }
        Ok(())
    }

    fn deactivate(&self, id: i32) -> Result<()> {
        if self.dao.deactivate(id).context("Failed to deactivate person")? == 0 {
            bail!("Person with id {id} not found");
        }
        self.report(id, "Deactivated")
    }

    fn delete(&self, id: i32) -> Result<()> {
        if self.dao.delete_by_id(&id).context("Failed to delete person")? == 0 {
            bail!("Person with id {id} not found");
        }
        self.report(id, "Deleted")
    }

    fn report(&self, id: i32, action: &str) -> Result<()> {
        if self.json {
            println!("{}", json!({ "id": id, "status": action.to_lowercase() }));
        } else {
            println!("{action} person {id}");
        }
        Ok(())
    }

    fn print_all<T: Serialize + Display>(&self, items: &[T], empty: &str) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(items)?);
        } else if items.is_empty() {
            println!("{empty}");
        } else {
            for item in items {
                println!("{item}");
            }
        }
        Ok(())
    }

    fn print_one<T: Serialize + Display>(&self, item: &T) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(item)?);
        } else {
            println!("{item}");
        }
        Ok(())
    }
}

fn sample_person(index: u32) -> Person {
    Person {
        id: None,
        name: format!("Ricardo{index}"),
        birthday: 10_000 * (i64::from(index) + 1),
        street: "Av. Brasil".to_string(),
        active: true,
        number: 100,
        user_type: UserType::Basic,
        creation_date: Some(Zoned::now().datetime()),
        phone_number: None,
        complement: Some("No complement".to_string()),
    }
}
