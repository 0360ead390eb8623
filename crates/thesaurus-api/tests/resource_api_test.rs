//! Facade workflows against the in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use thesaurus_api::ResourceApi;
use thesaurus_core::namespaces::{dcterms, openskos, rdf, skos};
use thesaurus_core::{status_of, ConceptStatus, Error, Resource, ResourceKind, Term, User, UserRole};
use thesaurus_db::test_fixtures::{fixture_store, fixture_tenant, SCHEME_URI, SET_URI, TENANT_CODE};

fn concepts() -> ResourceApi {
    let store = Arc::new(fixture_store());
    ResourceApi::new(ResourceKind::Concept, store.clone(), store.clone(), store)
}

fn user(role: UserRole) -> User {
    fixture_tenant()
        .users
        .into_iter()
        .find(|u| u.role == role)
        .unwrap()
}

fn admin_of(tenant: &str) -> User {
    User {
        uri: format!("http://data.example.com/users/{}-admin", tenant),
        name: format!("{} admin", tenant),
        tenant: tenant.to_string(),
        role: UserRole::Admin,
        api_key: None,
    }
}

fn with_bike_properties(mut concept: Resource) -> Resource {
    concept.add_property(rdf::TYPE, Term::uri(skos::CONCEPT));
    concept.add_property(skos::IN_SCHEME, Term::uri(SCHEME_URI));
    concept.add_property(openskos::SET, Term::uri(SET_URI));
    concept.add_property(skos::PREF_LABEL, Term::lang_literal("Fiets", "nl"));
    concept
}

fn bike() -> Resource {
    with_bike_properties(Resource::new("http://data.example.com/gtaa/fiets"))
}

#[tokio::test]
async fn test_create_then_get_by_uuid() {
    let api = concepts();
    let created = api
        .create(bike(), TENANT_CODE, &user(UserRole::Editor))
        .await
        .unwrap();

    let uuid = created.uuid().expect("uuid assigned on create").to_string();
    assert_eq!(created.tenant(), Some(TENANT_CODE));

    let fetched = api.get_by_id(&uuid).await.unwrap();
    assert_eq!(fetched.uri(), Some("http://data.example.com/gtaa/fiets"));

    let by_uri = api.get_by_id("http://data.example.com/gtaa/fiets").await.unwrap();
    assert_eq!(by_uri.uuid(), Some(uuid.as_str()));
}

#[tokio::test]
async fn test_create_blank_generates_uri_from_notation() {
    let api = concepts();
    let mut concept = with_bike_properties(Resource::blank());
    concept.add_property(skos::NOTATION, Term::literal("1234"));

    let created = api
        .create(concept, TENANT_CODE, &user(UserRole::Editor))
        .await
        .unwrap();
    assert_eq!(created.uri(), Some("http://data.example.com/set/gtaa/1234"));
}

#[tokio::test]
async fn test_create_twice_is_rejected() {
    let api = concepts();
    let editor = user(UserRole::Editor);
    api.create(bike(), TENANT_CODE, &editor).await.unwrap();

    let err = api.create(bike(), TENANT_CODE, &editor).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(err.message().contains("already exists"));
}

#[tokio::test]
async fn test_unknown_scheme_names_the_uri() {
    let api = concepts();
    let mut concept = bike();
    concept.set_property(skos::IN_SCHEME, Term::uri("http://data.example.com/nowhere"));

    let err = api
        .create(concept, TENANT_CODE, &user(UserRole::Editor))
        .await
        .unwrap_err();
    match err {
        Error::Validation(messages) => {
            assert!(messages
                .iter()
                .any(|m| m.contains("http://data.example.com/nowhere")));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_update_carries_system_properties() {
    let api = concepts();
    let editor = user(UserRole::Editor);
    let created = api.create(bike(), TENANT_CODE, &editor).await.unwrap();
    let uuid = created.uuid().unwrap().to_string();

    let mut changed = bike();
    changed.set_property(skos::PREF_LABEL, Term::lang_literal("Rijwiel", "nl"));
    let updated = api.update(changed, TENANT_CODE, &editor).await.unwrap();

    assert_eq!(updated.uuid(), Some(uuid.as_str()));
    assert_eq!(
        updated
            .get_property_single_value(skos::PREF_LABEL)
            .map(Term::value),
        Some("Rijwiel")
    );
}

#[tokio::test]
async fn test_update_missing_resource() {
    let err = concepts()
        .update(bike(), TENANT_CODE, &user(UserRole::Editor))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_delete_then_get_is_gone() {
    let api = concepts();
    let created = api
        .create(bike(), TENANT_CODE, &user(UserRole::Editor))
        .await
        .unwrap();
    let uuid = created.uuid().unwrap().to_string();
    let uri = created.uri().unwrap().to_string();

    let prior = api
        .delete(&uri, TENANT_CODE, &user(UserRole::Admin))
        .await
        .unwrap();
    assert_ne!(status_of(&prior), Some(ConceptStatus::Deleted));

    let err = api.get_by_id(&uuid).await.unwrap_err();
    assert_eq!(err.status_code(), 410);
    assert!(api.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_admin_cannot_delete() {
    let api = concepts();
    let editor = user(UserRole::Editor);
    let created = api.create(bike(), TENANT_CODE, &editor).await.unwrap();

    let err = api
        .delete(created.uri().unwrap(), TENANT_CODE, &editor)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[tokio::test]
async fn test_refused_delete_leaves_resource() {
    let api = concepts();
    let editor = user(UserRole::Editor);
    let created = api.create(bike(), TENANT_CODE, &editor).await.unwrap();
    let uri = created.uri().unwrap().to_string();

    api.delete(&uri, TENANT_CODE, &editor).await.unwrap_err();

    let fetched = api.get_by_id(&uri).await.unwrap();
    assert_ne!(status_of(&fetched), Some(ConceptStatus::Deleted));
    assert!(!fetched.has_property(openskos::DELETED_BY));
}

#[tokio::test]
async fn test_admin_of_other_tenant_cannot_delete() {
    let api = concepts();
    let created = api
        .create(bike(), TENANT_CODE, &user(UserRole::Editor))
        .await
        .unwrap();
    let uri = created.uri().unwrap().to_string();

    let err = api.delete(&uri, "other", &admin_of("other")).await.unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert!(err.message().contains("beng"));
    assert!(api.get_by_id(&uri).await.is_ok());
}

#[tokio::test]
async fn test_create_declaring_other_tenant_is_refused() {
    let mut concept = bike();
    concept.add_property(openskos::TENANT, Term::literal("other"));

    let err = concepts()
        .create(concept, TENANT_CODE, &user(UserRole::Editor))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 403);
    assert!(err.message().contains("other"));
}

#[tokio::test]
async fn test_update_retagging_tenant_is_refused() {
    let api = concepts();
    let editor = user(UserRole::Editor);
    api.create(bike(), TENANT_CODE, &editor).await.unwrap();

    let mut changed = bike();
    changed.set_property(openskos::TENANT, Term::literal("other"));
    let err = api.update(changed, TENANT_CODE, &editor).await.unwrap_err();
    assert_eq!(err.status_code(), 403);

    let stored = api.get_by_id("http://data.example.com/gtaa/fiets").await.unwrap();
    assert_eq!(stored.tenant(), Some(TENANT_CODE));
}

#[tokio::test]
async fn test_update_of_other_kind_is_not_found() {
    let mut impostor = bike();
    impostor.set_uri(SET_URI);

    let err = concepts()
        .update(impostor, TENANT_CODE, &user(UserRole::Editor))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_update_to_approved_stamps_acceptance() {
    let api = concepts();
    let editor = user(UserRole::Editor);
    let mut candidate = bike();
    candidate.set_property(openskos::STATUS, Term::literal(ConceptStatus::Candidate.as_str()));
    let created = api.create(candidate, TENANT_CODE, &editor).await.unwrap();
    assert!(!created.has_property(dcterms::DATE_ACCEPTED));

    let mut approved = bike();
    approved.set_property(openskos::STATUS, Term::literal(ConceptStatus::Approved.as_str()));
    let updated = api.update(approved, TENANT_CODE, &editor).await.unwrap();

    assert_eq!(status_of(&updated), Some(ConceptStatus::Approved));
    assert_eq!(updated.get_property(dcterms::DATE_ACCEPTED).len(), 1);
    assert_eq!(
        updated
            .get_property_single_value(openskos::ACCEPTED_BY)
            .map(Term::value),
        Some(editor.uri.as_str())
    );
}

#[tokio::test]
async fn test_get_wrong_kind_is_not_found() {
    let err = concepts().get_by_id(SCHEME_URI).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

#[tokio::test]
async fn test_find_and_list() {
    let api = concepts();
    api.create(bike(), TENANT_CODE, &user(UserRole::Editor))
        .await
        .unwrap();

    let params: HashMap<String, String> =
        [("q".to_string(), "fiets".to_string())].into();
    let results = api.find(&params).await.unwrap();
    assert_eq!(results.total, 1);
    assert_eq!(results.resources.len(), 1);

    let list = api.list().await.unwrap();
    assert_eq!(
        list.get("http://data.example.com/gtaa/fiets").map(String::as_str),
        Some("Fiets")
    );
}
