//! Data access for [`Person`] rows.

use std::sync::Arc;

use kist_core::{codec, EntityDao, EntityMetadata, KistDao, Result, SqliteConnection};

use crate::model::{Person, PersonMinDto};

/// Standard CRUD plus the hand-written person queries.
pub struct PersonDao {
    entities: EntityDao<Person, i32, SqliteConnection>,
}

impl PersonDao {
    pub fn new(connection: Arc<SqliteConnection>, metadata: Arc<dyn EntityMetadata<Person>>) -> Self {
        Self {
            entities: EntityDao::new(connection, metadata),
        }
    }

    /// People whose street matches the `LIKE` pattern.
    pub fn find_by_street(&self, pattern: &str) -> Result<Vec<Person>> {
        self.entities
            .query_entities("SELECT * FROM person_table WHERE street LIKE ?", &[&pattern])
    }

    pub fn find_by_name_street(&self, name: &str, street_part: &str) -> Result<Vec<Person>> {
        self.entities.query_entities(
            "SELECT * FROM person_table WHERE name LIKE ? AND street LIKE ?",
            &[&name, &street_part],
        )
    }

    pub fn list_minimal_reference(&self) -> Result<Vec<PersonMinDto>> {
        self.entities
            .query_list("SELECT id, name FROM person_table", &[], PersonMinDto::from_row)
    }

    pub fn count_active(&self) -> Result<i64> {
        let count = self.entities.query_single(
            "SELECT count(*) FROM person_table WHERE is_active = ?",
            &[&true],
            |mut row| codec::take::<i64>(&mut row, 0),
        )?;
        Ok(count.unwrap_or_default())
    }

    /// Marks a person inactive, returning the number of rows changed.
    pub fn deactivate(&self, id: i32) -> Result<usize> {
        self.entities.execute(
            "UPDATE person_table SET is_active = ? WHERE id = ?",
            &[&false, &id],
        )
    }
}

impl KistDao<Person, i32> for PersonDao {
    fn insert(&self, data: &Person) -> Result<i64> {
        self.entities.insert(data)
    }

    fn update(&self, data: &Person) -> Result<usize> {
        self.entities.update(data)
    }

    fn delete_by_id(&self, id: &i32) -> Result<usize> {
        self.entities.delete_by_id(id)
    }

    fn find_all(&self) -> Result<Vec<Person>> {
        self.entities.find_all()
    }

    fn find_by_id(&self, id: &i32) -> Result<Option<Person>> {
        self.entities.find_by_id(id)
    }

    fn exists(&self, id: &i32) -> Result<bool> {
        self.entities.exists(id)
    }
}

#[cfg(test)]
mod tests {
    use kist_core::{PersistenceConfig, PersistenceContext};

    use super::*;
    use crate::{model::UserType, schema};

    fn person(name: &str, street: &str) -> Person {
        Person {
            id: None,
            name: name.to_string(),
            birthday: 10_000,
            street: street.to_string(),
            active: true,
            number: 100,
            user_type: UserType::Basic,
            creation_date: None,
            phone_number: None,
            complement: None,
        }
    }

    fn dao() -> Arc<PersonDao> {
        let config = PersistenceConfig::in_memory("test.db", schema::create_statements());
        let context = schema::register(PersistenceContext::builder(config))
            .build()
            .unwrap();
        context.inject_dao::<PersonDao>().unwrap()
    }

    #[test]
    fn finds_people_by_street_pattern() {
        let dao = dao();
        dao.insert(&person("Ada", "Av. Brasil")).unwrap();
        dao.insert(&person("Alan", "Rua Augusta")).unwrap();

        let found = dao.find_by_street("Av.%").unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ada");
    }

    #[test]
    fn finds_people_by_name_and_street() {
        let dao = dao();
        dao.insert(&person("Ada", "Av. Brasil")).unwrap();
        dao.insert(&person("Alan", "Av. Brasil")).unwrap();
        dao.insert(&person("Ada", "Rua Augusta")).unwrap();

        let found = dao.find_by_name_street("Ad%", "%Brasil").unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].street, "Av. Brasil");
    }

    #[test]
    fn lists_minimal_references() {
        let dao = dao();
        let id = dao.insert(&person("Ada", "Av. Brasil")).unwrap();

        let references = dao.list_minimal_reference().unwrap();

        assert_eq!(
            references,
            vec![PersonMinDto {
                id: i32::try_from(id).unwrap(),
                name: "Ada".to_string()
            }]
        );
    }

    #[test]
    fn deactivation_changes_the_active_count() {
        let dao = dao();
        let first = dao.insert(&person("Ada", "Av. Brasil")).unwrap();
        dao.insert(&person("Alan", "Av. Brasil")).unwrap();
        assert_eq!(dao.count_active().unwrap(), 2);

        let changed = dao.deactivate(i32::try_from(first).unwrap()).unwrap();

        assert_eq!(changed, 1);
        assert_eq!(dao.count_active().unwrap(), 1);
    }
}
