//! Geofence CRUD handlers for the CLI.

use anyhow::Context;
use clap::Subcommand;

use geoscout_backend::BackendClient;
use geoscout_core::{Geofence, GeofenceKind, Point};

#[derive(Debug, Subcommand)]
pub(crate) enum GeofenceCommand {
    /// List all geofences
    List,
    /// Create a circular geofence around a center point
    CreateCircle {
        #[arg(long)]
        name: String,
        /// Center as "lat,lng" in decimal degrees
        #[arg(long)]
        center: String,
        /// Radius in meters
        #[arg(long)]
        radius: f64,
    },
    /// Create a polygonal geofence from a ring of vertices
    CreatePolygon {
        #[arg(long)]
        name: String,
        /// Ring vertices as "lat,lng", at least three
        #[arg(long = "point", num_args = 1..)]
        points: Vec<String>,
    },
    /// Rename a saved geofence (coordinates stay fixed once saved)
    Rename {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },
    /// Delete a geofence
    Delete {
        #[arg(long)]
        id: String,
    },
}

pub(crate) async fn run(backend: &BackendClient, command: GeofenceCommand) -> anyhow::Result<()> {
    match command {
        GeofenceCommand::List => list(backend).await,
        GeofenceCommand::CreateCircle {
            name,
            center,
            radius,
        } => {
            let center = parse_point(&center)?;
            create(backend, Geofence::circle(name, center, radius)).await
        }
        GeofenceCommand::CreatePolygon { name, points } => {
            let ring = points
                .iter()
                .map(|raw| parse_point(raw))
                .collect::<anyhow::Result<Vec<_>>>()?;
            create(backend, Geofence::polygon(name, ring)).await
        }
        GeofenceCommand::Rename { id, name } => rename(backend, &id, name).await,
        GeofenceCommand::Delete { id } => {
            backend.delete_geofence(&id).await?;
            println!("Deleted geofence {id}");
            Ok(())
        }
    }
}

async fn list(backend: &BackendClient) -> anyhow::Result<()> {
    let geofences = backend.get_geofences().await?;
    if geofences.is_empty() {
        println!("No geofences saved yet.");
        return Ok(());
    }
    for fence in &geofences {
        let id = fence.id.as_deref().unwrap_or("-");
        let shape = match fence.kind {
            GeofenceKind::Circle => {
                let radius = fence.radius_m.unwrap_or(0.0);
                format!("circle r={radius:.0}m")
            }
            GeofenceKind::Polygon => format!("polygon {} vertices", fence.boundary.len()),
        };
        println!("  {id:<12} {:<24} {shape}", fence.name);
    }
    println!("{} geofence(s)", geofences.len());
    Ok(())
}

async fn create(backend: &BackendClient, fence: Geofence) -> anyhow::Result<()> {
    // Reject malformed shapes before they reach the backend.
    geoscout_places::resolve(&fence).context("geofence failed validation")?;

    let saved = backend.save_geofence(&fence).await?;
    let id = saved.id.as_deref().unwrap_or("-");
    println!("Saved geofence \"{}\" as {id}", saved.name);
    Ok(())
}

async fn rename(backend: &BackendClient, id: &str, name: String) -> anyhow::Result<()> {
    let geofences = backend.get_geofences().await?;
    let mut fence = geofences
        .into_iter()
        .find(|g| g.id.as_deref() == Some(id))
        .with_context(|| format!("no geofence with id {id}"))?;
    fence.name = name;
    let updated = backend.update_geofence(id, &fence).await?;
    println!("Renamed geofence {id} to \"{}\"", updated.name);
    Ok(())
}

/// Parses a "lat,lng" pair in decimal degrees.
fn parse_point(raw: &str) -> anyhow::Result<Point> {
    let (lat, lng) = raw
        .split_once(',')
        .with_context(|| format!("expected \"lat,lng\", got \"{raw}\""))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("invalid latitude in \"{raw}\""))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .with_context(|| format!("invalid longitude in \"{raw}\""))?;
    Ok(Point { lat, lng })
}
