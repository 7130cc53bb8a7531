use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use server_api::draft_from_payload;
use shared::{domain::EventId, protocol::EventPayload};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/events.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateEvent {
        name: String,
        /// RFC 3339 start time, e.g. 2026-11-02T18:00:00Z
        starts_at: DateTime<Utc>,
        #[arg(long)]
        ends_at: Option<DateTime<Utc>>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    ListEvents {
        #[arg(long, default_value_t = 50)]
        limit: i64,
    },
    DeleteEvent {
        event_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateEvent {
            name,
            starts_at,
            ends_at,
            location,
            description,
        } => {
            let draft = draft_from_payload(EventPayload {
                id: None,
                name,
                description,
                location,
                starts_at,
                ends_at,
            })
            .context("invalid event")?;
            let event = storage.insert_event(&draft).await?;
            println!("created event_id={}", event.id);
        }
        Command::ListEvents { limit } => {
            let events = storage.list_events(0, limit.max(1)).await?;
            for event in &events {
                println!(
                    "{}\t{}\t{}\t{}",
                    event.id,
                    event.starts_at.to_rfc3339(),
                    event.name,
                    event.location.as_deref().unwrap_or("-")
                );
            }
            println!("{} of {} events", events.len(), storage.count_events().await?);
        }
        Command::DeleteEvent { event_id } => {
            let removed = storage.delete_event(EventId(event_id)).await?;
            if removed {
                println!("deleted event_id={event_id}");
            } else {
                println!("no event with event_id={event_id}");
            }
        }
    }

    Ok(())
}
