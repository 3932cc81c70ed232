//! Place-discovery handler for the CLI.
//!
//! Runs the full discovery pipeline for one geofence: resolves it from the
//! backend, sweeps the provider with the configured search passes, excludes
//! places already saved for that geofence, and optionally persists the rest.

use std::collections::HashSet;

use anyhow::Context;
use clap::Args;

use geoscout_backend::BackendClient;
use geoscout_core::AppConfig;
use geoscout_places::{
    discover_places, DiscoveryPolicy, GooglePlacesClient, SearchPolicy, SearchTerms,
};

#[derive(Debug, Args)]
pub(crate) struct DiscoverArgs {
    /// Geofence to search (backend id)
    #[arg(long)]
    geofence_id: String,
    /// Extra keyword passes on top of the default food-and-drink catalog
    #[arg(long = "term")]
    terms: Vec<String>,
    /// Replace the default catalog instead of extending it
    #[arg(long, requires = "terms")]
    terms_only: bool,
    /// Persist the discovered places to the backend
    #[arg(long)]
    save: bool,
}

pub(crate) async fn run(
    config: &AppConfig,
    backend: &BackendClient,
    args: DiscoverArgs,
) -> anyhow::Result<()> {
    let api_key = config
        .google_maps_api_key
        .as_deref()
        .context("GEOSCOUT_GOOGLE_MAPS_API_KEY is required for discovery")?;
    let provider =
        GooglePlacesClient::new(api_key, config.request_timeout_secs, &config.user_agent)?;

    let geofences = backend.get_geofences().await?;
    let geofence = geofences
        .into_iter()
        .find(|g| g.id.as_deref() == Some(args.geofence_id.as_str()))
        .with_context(|| format!("no geofence with id {}", args.geofence_id))?;

    let terms = build_terms(&args);
    let policy = DiscoveryPolicy {
        search: SearchPolicy {
            page_delay_ms: config.places_page_delay_ms,
            max_retries: config.places_max_retries,
            backoff_base_ms: config.places_retry_backoff_base_ms,
            max_radius_m: config.places_max_radius_m,
        },
        inter_pass_delay_ms: config.places_inter_pass_delay_ms,
    };

    println!(
        "Searching {} pass(es) in \"{}\"...",
        1 + terms.text_queries.len(),
        geofence.name
    );

    let candidates = discover_places(&provider, &geofence, &terms, &policy, |progress| {
        println!(
            "  pass {}/{} complete — {} candidate(s) so far",
            progress.passes_completed, progress.passes_total, progress.candidates_so_far
        );
    })
    .await?;
    tracing::debug!(
        geofence_id = %args.geofence_id,
        unique = candidates.len(),
        "discovery pipeline complete"
    );

    // Places already saved for this geofence are not offered again.
    let existing: HashSet<String> = backend
        .places_in_geofence(&args.geofence_id)
        .await?
        .into_iter()
        .map(|p| p.external_id)
        .collect();
    let fresh: Vec<_> = candidates
        .into_iter()
        .filter(|c| !existing.contains(&c.external_id))
        .collect();

    if fresh.is_empty() {
        println!("No new places found.");
        return Ok(());
    }

    println!("Found {} new place(s):", fresh.len());
    for candidate in &fresh {
        let extras = match (&candidate.website, &candidate.phone_number) {
            (Some(site), Some(phone)) => format!("  [{site}, {phone}]"),
            (Some(site), None) => format!("  [{site}]"),
            (None, Some(phone)) => format!("  [{phone}]"),
            (None, None) => String::new(),
        };
        println!("  {:<28} {}{extras}", candidate.name, candidate.address);
    }

    if args.save {
        let saved = backend
            .save_places(&args.geofence_id, &fresh, |progress| {
                println!(
                    "  saving {}/{} ({} saved, {} failed)",
                    progress.processed, progress.total, progress.saved, progress.failed
                );
            })
            .await;
        println!("Saved {} of {} place(s)", saved.len(), fresh.len());
    } else {
        println!("Re-run with --save to persist them.");
    }

    Ok(())
}

fn build_terms(args: &DiscoverArgs) -> SearchTerms {
    let mut terms = if args.terms_only {
        SearchTerms {
            nearby_type: "restaurant".to_owned(),
            text_queries: Vec::new(),
        }
    } else {
        SearchTerms::food_and_drink()
    };
    terms.text_queries.extend(args.terms.iter().cloned());
    terms
}
