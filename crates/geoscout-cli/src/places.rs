//! Saved-place handlers for the CLI: listing, visit tracking, notes.

use chrono::Utc;
use clap::Subcommand;

use geoscout_backend::BackendClient;

#[derive(Debug, Subcommand)]
pub(crate) enum PlaceCommand {
    /// List the places saved inside a geofence
    List {
        #[arg(long)]
        geofence_id: String,
    },
    /// Mark a place as visited (stamps the visit time)
    Visit {
        #[arg(long)]
        id: String,
    },
    /// Clear a place's visited flag
    Unvisit {
        #[arg(long)]
        id: String,
    },
    /// Replace the notes on a place
    Note {
        #[arg(long)]
        id: String,
        #[arg(long)]
        text: String,
    },
    /// Delete a place
    Delete {
        #[arg(long)]
        id: String,
    },
}

pub(crate) async fn run(backend: &BackendClient, command: PlaceCommand) -> anyhow::Result<()> {
    match command {
        PlaceCommand::List { geofence_id } => list(backend, &geofence_id).await,
        PlaceCommand::Visit { id } => set_visited(backend, &id, true).await,
        PlaceCommand::Unvisit { id } => set_visited(backend, &id, false).await,
        PlaceCommand::Note { id, text } => note(backend, &id, text).await,
        PlaceCommand::Delete { id } => {
            backend.delete_place(&id).await?;
            println!("Deleted place {id}");
            Ok(())
        }
    }
}

async fn list(backend: &BackendClient, geofence_id: &str) -> anyhow::Result<()> {
    let places = backend.places_in_geofence(geofence_id).await?;
    if places.is_empty() {
        println!("No places saved yet for geofence {geofence_id}.");
        return Ok(());
    }
    for place in &places {
        let id = place.id.as_deref().unwrap_or("-");
        let status = if place.is_visited { "visited" } else { "not visited" };
        println!("  {id:<12} {:<28} {:<32} {status}", place.name, place.address);
    }
    let visited = places.iter().filter(|p| p.is_visited).count();
    println!("{} place(s), {visited} visited", places.len());
    Ok(())
}

async fn set_visited(backend: &BackendClient, id: &str, visited: bool) -> anyhow::Result<()> {
    let mut place = backend.get_place(id).await?;
    place.is_visited = visited;
    place.visited_at = visited.then(Utc::now);
    let updated = backend.update_place(&place).await?;
    if updated.is_visited {
        println!("Marked \"{}\" as visited", updated.name);
    } else {
        println!("Cleared visit on \"{}\"", updated.name);
    }
    Ok(())
}

async fn note(backend: &BackendClient, id: &str, text: String) -> anyhow::Result<()> {
    let mut place = backend.get_place(id).await?;
    place.notes = Some(text);
    let updated = backend.update_place(&place).await?;
    println!("Updated notes on \"{}\"", updated.name);
    Ok(())
}
