use anyhow::Result;
use clap::Subcommand;

use courier_core::config::AppConfig;
use courier_core::contacts::store::ContactStore;
use courier_core::domain::contact::ContactFields;
use courier_directory::FileContactStore;

#[derive(Debug, Subcommand)]
pub enum ContactsCommand {
    #[command(about = "Search the directory by name or email local-part")]
    Find { query: String },
    #[command(about = "Add or update a contact (upserts by email)")]
    Add {
        #[arg(long)]
        first: String,
        #[arg(long)]
        last: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
    },
}

pub fn run(config: &AppConfig, command: ContactsCommand) -> Result<()> {
    let store = FileContactStore::from_config(&config.directory);

    match command {
        ContactsCommand::Find { query } => {
            let matches = store.search(&query);
            if matches.is_empty() {
                println!("No contacts matched '{query}'.");
                return Ok(());
            }
            for contact in matches {
                println!(
                    "{} <{}>  phone: {}",
                    contact.full_name(),
                    contact.email,
                    contact.phone.as_deref().unwrap_or("N/A")
                );
            }
        }
        ContactsCommand::Add { first, last, email, phone } => {
            let saved = store.save(&ContactFields {
                first_name: first,
                last_name: last,
                email,
                phone,
            })?;
            println!("Saved contact: {} <{}>", saved.full_name(), saved.email);
        }
    }

    Ok(())
}
