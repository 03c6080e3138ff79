use contact_store_core::db::open_db;
use contact_store_core::{
    Contact, ContactQuery, ContactRepository, ContactService, MemoryContactRepository, RepoError,
    SqliteContactRepository,
};

#[test]
fn committed_writes_survive_reopening_the_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contacts.db");

    {
        let conn = open_db(&path).unwrap();
        let service = ContactService::new(SqliteContactRepository::try_new(&conn).unwrap());
        service
            .create(&Contact::new("Alice", "alice@test.com"))
            .unwrap();

        let repo = service.repository();
        let mut session = repo.open_session();
        session.persist(&Contact::new("Bob", "bob@test.com")).unwrap();
        session.close();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteContactRepository::try_new(&conn).unwrap();
    let all = repo.list(&ContactQuery::all()).unwrap();
    assert_eq!(all, vec![Contact::new("Alice", "alice@test.com")]);
}

#[test]
fn staged_writes_are_invisible_to_other_sessions_until_commit() {
    let repo = MemoryContactRepository::new();
    let mut writer = repo.open_session();
    let reader = repo.open_session();

    let mut tx = writer.transaction().unwrap();
    tx.persist(&Contact::new("Alice", "alice@test.com")).unwrap();
    assert!(tx.find("Alice").unwrap().is_some());
    assert!(reader.find("Alice").unwrap().is_none());

    tx.commit().unwrap();
    assert!(reader.find("Alice").unwrap().is_some());
}

#[test]
fn writes_staged_before_begin_are_flushed_by_commit() {
    let repo = MemoryContactRepository::new();
    let mut session = repo.open_session();
    session
        .persist(&Contact::new("Alice", "alice@test.com"))
        .unwrap();

    let mut tx = session.transaction().unwrap();
    tx.persist(&Contact::new("Bob", "bob@test.com")).unwrap();
    tx.commit().unwrap();

    assert_eq!(repo.len(), 2);
    assert_eq!(session.pending_len(), 0);
}

#[test]
fn failed_commit_discards_batch_and_keeps_committed_state() {
    let repo = MemoryContactRepository::new();
    let service = ContactService::new(repo);
    service
        .create(&Contact::new("Alice", "alice@test.com"))
        .unwrap();

    let mut stale = service.repository().open_session();
    stale.remove("Alice").unwrap();

    service.delete(&Contact::new("Alice", "")).unwrap();
    service
        .create(&Contact::new("Bob", "bob@test.com"))
        .unwrap();

    let mut tx = stale.transaction().unwrap();
    tx.persist(&Contact::new("Carol", "carol@test.com")).unwrap();
    let err = tx.commit().unwrap_err();
    assert!(matches!(err, RepoError::NotFound(name) if name == "Alice"));
    assert_eq!(stale.pending_len(), 0);
    assert!(!stale.is_transaction_active());

    let names: Vec<_> = service
        .retrieve_all()
        .unwrap()
        .into_iter()
        .map(|contact| contact.name)
        .collect();
    assert_eq!(names, ["Bob"]);
}

#[test]
fn delete_of_missing_contact_is_not_found() {
    let service = ContactService::new(MemoryContactRepository::new());

    let err = service
        .delete(&Contact::new("Ghost", "ghost@test.com"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(name) if name == "Ghost"));
}

#[test]
fn update_of_unknown_contact_inserts_it() {
    let service = ContactService::new(MemoryContactRepository::new());

    service
        .update(&Contact::new("Dana", "dana@test.com"))
        .unwrap();

    assert_eq!(
        service.retrieve_with_id("Dana").unwrap(),
        Some(Contact::new("Dana", "dana@test.com"))
    );
}

#[test]
fn invalid_contact_is_rejected_before_staging() {
    let service = ContactService::new(MemoryContactRepository::new());

    let err = service.create(&Contact::new("  ", "eve@test.com")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert!(service.retrieve_all().unwrap().is_empty());
}

#[test]
fn update_accepts_free_form_email() {
    let service = ContactService::new(MemoryContactRepository::new());
    service
        .create(&Contact::new("Alice", "alice@test.com"))
        .unwrap();

    service.update(&Contact::new("Alice", "noreply")).unwrap();

    assert_eq!(
        service.retrieve_with_id("Alice").unwrap().unwrap().email,
        "noreply"
    );
}

#[test]
fn paginated_query_matches_across_backends() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("page.db")).unwrap();
    let sqlite = SqliteContactRepository::try_new(&conn).unwrap();
    let memory = MemoryContactRepository::new();

    for repo in [&sqlite as &dyn SeedTarget, &memory as &dyn SeedTarget] {
        repo.seed();
    }

    let query = ContactQuery {
        email_like: Some("%@test.com".to_string()),
        limit: Some(2),
        offset: 1,
    };
    let from_sqlite = sqlite.list(&query).unwrap();
    let from_memory = memory.list(&query).unwrap();

    assert_eq!(from_sqlite, from_memory);
    assert_eq!(
        from_sqlite
            .iter()
            .map(|contact| contact.name.as_str())
            .collect::<Vec<_>>(),
        ["C", "E"]
    );
}

#[test]
fn contacts_export_as_json() {
    let service = ContactService::new(MemoryContactRepository::new());
    service
        .create(&Contact::new("Alice", "alice@test.com"))
        .unwrap();

    let exported = serde_json::to_value(service.retrieve_all().unwrap()).unwrap();
    assert_eq!(
        exported,
        serde_json::json!([{ "name": "Alice", "email": "alice@test.com" }])
    );

    let imported: Vec<Contact> = serde_json::from_value(exported).unwrap();
    assert_eq!(imported[0].name, "Alice");
}

trait SeedTarget {
    fn seed(&self);
}

impl<R: ContactRepository> SeedTarget for R {
    fn seed(&self) {
        let mut session = self.open_session();
        let mut tx = session.transaction().unwrap();
        for (name, email) in [
            ("A", "a@test.com"),
            ("B", "b@other.com"),
            ("C", "c@test.com"),
            ("D", "d@other.com"),
            ("E", "e@test.com"),
            ("F", "f@test.com"),
        ] {
            tx.persist(&Contact::new(name, email)).unwrap();
        }
        tx.commit().unwrap();
    }
}
