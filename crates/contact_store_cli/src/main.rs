//! Contact store smoke executable.
//!
//! Loads configuration from the environment, opens the configured backend
//! and walks through create, list, filter, update and delete, printing the
//! visible contacts after each step.

use contact_store_core::db::{open_db, open_db_in_memory};
use contact_store_core::{
    core_version, init_logging, BackendConfig, Contact, ContactRepository, ContactService,
    MemoryContactRepository, SqliteContactRepository, StoreConfig,
};
use log::info;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("contact_store_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = StoreConfig::from_env()?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(config.log_level, log_dir)?;
    }

    println!("contact_store_core version={}", core_version());
    match &config.backend {
        BackendConfig::Memory => run_scenario(MemoryContactRepository::new()),
        BackendConfig::SqliteFile(path) => {
            let conn = open_db(path)?;
            let repo = SqliteContactRepository::try_new(&conn)?;
            run_scenario(repo)
        }
        BackendConfig::SqliteMemory => {
            let conn = open_db_in_memory()?;
            let repo = SqliteContactRepository::try_new(&conn)?;
            run_scenario(repo)
        }
    }
}

fn run_scenario<R: ContactRepository>(repo: R) -> Result<(), Box<dyn Error>> {
    let service = ContactService::new(repo);
    info!(
        "event=scenario_start module=cli status=start backend={}",
        service.repository().backend_name()
    );

    let alice = Contact::new("Alice", "alice@test.com");
    let bob = Contact::new("Bob", "bob@test.com");
    ensure_created(&service, &alice)?;
    ensure_created(&service, &bob)?;
    print_contacts("after create", &service.retrieve_all()?);
    print_contacts(
        "filter email like 'bob@test.com'",
        &service.retrieve_with_filter("bob@test.com")?,
    );

    let mut updated = service
        .retrieve_with_id("Alice")?
        .ok_or("Alice should exist after create")?;
    updated.email = "noreply@test.com".to_string();
    service.update(&updated)?;
    print_contacts("after update", &service.retrieve_all()?);

    service.delete(&updated)?;
    print_contacts("after delete", &service.retrieve_all()?);

    // Leave a file-backed store as it was found.
    service.delete(&bob)?;

    info!("event=scenario_finish module=cli status=ok");
    Ok(())
}

/// Creates `contact` unless a contact with its name is already stored.
fn ensure_created<R: ContactRepository>(
    service: &ContactService<R>,
    contact: &Contact,
) -> Result<(), Box<dyn Error>> {
    if service.retrieve_with_id(&contact.name)?.is_none() {
        service.create(contact)?;
    }
    Ok(())
}

fn print_contacts(step: &str, contacts: &[Contact]) {
    println!("{step}:");
    for contact in contacts {
        println!("  {} <{}>", contact.name, contact.email);
    }
}
