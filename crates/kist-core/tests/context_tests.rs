mod common;

use std::sync::Arc;

use common::{sample, Sample, SampleDao, SAMPLE_TABLE};
use kist_core::{KistDao, KistError, PersistenceConfig, PersistenceContext};
use tempfile::TempDir;

fn build_context(config: PersistenceConfig) -> PersistenceContext {
    PersistenceContext::builder(config)
        .with_entity::<Sample>()
        .with_dao(|connection, registry| {
            Ok(SampleDao::new(
                Arc::clone(connection),
                registry.get_metadata::<Sample>()?,
            ))
        })
        .build()
        .expect("Failed to build context")
}

#[test]
fn test_injected_dao_works_against_the_database() {
    let temp_dir = TempDir::new().unwrap();
    let context = build_context(PersistenceConfig::file(
        "context.db",
        temp_dir.path(),
        vec![SAMPLE_TABLE],
    ));

    let dao = context.inject_dao::<SampleDao>().unwrap();
    let id = dao.insert(&sample("injected")).unwrap();

    assert!(dao.exists(&id).unwrap());
}

#[test]
fn test_lookups_return_the_registered_instances() {
    let context = build_context(PersistenceConfig::in_memory("context.db", vec![SAMPLE_TABLE]));

    let dao = context.inject_dao::<SampleDao>().unwrap();
    let again = context.inject_dao::<SampleDao>().unwrap();
    assert!(Arc::ptr_eq(&dao, &again));

    let metadata = context.metadata::<Sample>().unwrap();
    let again = context.metadata::<Sample>().unwrap();
    assert!(Arc::ptr_eq(&metadata, &again));
    assert_eq!(metadata.table_name(), "sample");
}

#[test]
fn test_dao_factory_needs_registered_entities() {
    let result = PersistenceContext::builder(PersistenceConfig::in_memory(
        "context.db",
        vec![SAMPLE_TABLE],
    ))
    .with_dao(|connection, registry| {
        Ok(SampleDao::new(
            Arc::clone(connection),
            registry.get_metadata::<Sample>()?,
        ))
    })
    .build();

    assert!(matches!(result, Err(KistError::Configuration { .. })));
}

#[test]
fn test_registry_is_open_after_build() {
    let context = build_context(PersistenceConfig::in_memory("context.db", vec![SAMPLE_TABLE]));

    assert!(context.registry().is_initialized());
}
