use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use place_wiki_core::stores::wikipedia::{DEFAULT_API_URL, DEFAULT_REST_URL, DEFAULT_USER_AGENT};
use place_wiki_core::{
    haversine_km, AdminHierarchy, ArticleSummary, Classifier, ClassifierConfig, LatLng,
    LatestSelection, PoolBuilder, PoolConfig, PoolEntry, SelectedPlace, WikiLookup,
    WikipediaClient, WikipediaConfig,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "place-wiki", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// MediaWiki action API endpoint
    #[arg(long, env = "PLACE_WIKI_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Wikipedia REST API base
    #[arg(long, env = "PLACE_WIKI_REST_URL", default_value = DEFAULT_REST_URL)]
    rest_url: String,

    /// User-Agent sent with every request
    #[arg(long, env = "PLACE_WIKI_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "PLACE_WIKI_TIMEOUT_SECS", default_value = "15")]
    timeout_secs: u64,

    /// Print JSON instead of a text listing.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Build the ranked article pool for a place.
    Pool {
        #[command(flatten)]
        place: PlaceArgs,
        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// Resolve only the primary article for a place.
    Primary {
        #[command(flatten)]
        place: PlaceArgs,
        #[command(flatten)]
        tuning: TuningArgs,
    },
    /// Fetch one article and show how it is classified.
    Classify {
        /// Article title. Redirects are followed.
        #[arg(long)]
        title: String,
        /// Accept unbadged titles that merely look like place names.
        #[arg(long, default_value_t = false)]
        place_shaped: bool,
    },
    /// Great-circle distance between two points.
    Distance {
        #[arg(long, allow_hyphen_values = true)]
        from_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        from_lng: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lng: f64,
    },
}

#[derive(Args, Clone, Default)]
struct PlaceArgs {
    /// JSON file holding a selected place. Flags below override its fields.
    #[arg(long)]
    place_file: Option<PathBuf>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    county: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    state_code: Option<String>,
    #[arg(long)]
    country: Option<String>,
    #[arg(long)]
    country_code: Option<String>,
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lng: Option<f64>,
    /// Comma-separated place types, e.g. "locality,political".
    #[arg(long, value_delimiter = ',')]
    types: Vec<String>,
}

#[derive(Args, Clone)]
struct TuningArgs {
    /// Maximum number of articles in the pool.
    #[arg(long, default_value = "51")]
    max_entries: usize,
    /// Primary candidates farther than this are rejected.
    #[arg(long, default_value = "150")]
    max_primary_km: f64,
    /// Geofence for nearby POIs.
    #[arg(long, default_value = "35")]
    nearby_radius_km: f64,
    /// Geofence for keyword fallback matches.
    #[arg(long, default_value = "60")]
    keyword_radius_km: f64,
    /// Remote lookups in flight at once.
    #[arg(long, default_value = "4")]
    concurrency: usize,
    /// Accept unbadged titles that merely look like place names.
    #[arg(long, default_value_t = false)]
    place_shaped: bool,
}

impl PlaceArgs {
    async fn load(self) -> anyhow::Result<SelectedPlace> {
        let mut place = match &self.place_file {
            Some(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("couldn't read place file {}", path.display()))?;
                serde_json::from_str::<SelectedPlace>(&raw)
                    .with_context(|| format!("invalid place JSON in {}", path.display()))?
            }
            None => SelectedPlace::default(),
        };
        self.apply(&mut place);
        Ok(place)
    }

    fn apply(self, place: &mut SelectedPlace) {
        let admin: &mut AdminHierarchy = &mut place.admin;
        for (value, field) in [
            (self.city, &mut admin.city),
            (self.county, &mut admin.county),
            (self.state, &mut admin.state),
            (self.state_code, &mut admin.state_code),
            (self.country, &mut admin.country),
            (self.country_code, &mut admin.country_code),
        ] {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(name) = self.name {
            place.name = name;
        }
        if let Some(address) = self.address {
            place.formatted_address = address;
        }
        if let (Some(lat), Some(lng)) = (self.lat, self.lng) {
            place.location = Some(LatLng::new(lat, lng));
        }
        if !self.types.is_empty() {
            place.types = self.types;
        }
    }
}

impl TuningArgs {
    fn pool_config(&self) -> PoolConfig {
        let mut config = PoolConfig {
            max_entries: self.max_entries,
            nearby_radius_km: self.nearby_radius_km,
            keyword_radius_km: self.keyword_radius_km,
            concurrency: self.concurrency,
            ..PoolConfig::default()
        };
        config.resolver.policy.max_distance_km = self.max_primary_km;
        config.resolver.policy.accept_place_shaped_titles = self.place_shaped;
        config.classifier.accept_place_shaped_titles = self.place_shaped;
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let wiki_config = WikipediaConfig {
        api_url: cli.api_url.clone(),
        rest_url: cli.rest_url.clone(),
        user_agent: cli.user_agent.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
    };

    info!(
        version = app_version,
        api_url = %wiki_config.api_url,
        started_at = %Utc::now().to_rfc3339(),
        "place-wiki boot"
    );

    match cli.command {
        Command::Pool { place, tuning } => {
            let place = place.load().await?;
            let client = WikipediaClient::new(wiki_config)?;
            let builder = PoolBuilder::with_config(client, tuning.pool_config())?;

            let pool = LatestSelection::new()
                .run(&builder, &place)
                .await
                .context("couldn't load Wikipedia info")?
                .unwrap_or_default();
            info!(entries = pool.len(), "pool built");

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&pool)?);
            } else {
                print_pool(&pool);
            }
        }
        Command::Primary { place, tuning } => {
            let place = place.load().await?;
            let client = WikipediaClient::new(wiki_config)?;
            let builder = PoolBuilder::with_config(client, tuning.pool_config())?;

            let primary = builder
                .resolver()
                .resolve_primary(&place)
                .await
                .context("couldn't load Wikipedia info")?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&primary)?);
            } else {
                match primary {
                    Some(entry) => print_pool(std::slice::from_ref(&entry)),
                    None => println!("No primary article found."),
                }
            }
        }
        Command::Classify {
            title,
            place_shaped,
        } => {
            let client = WikipediaClient::new(wiki_config)?;
            let classifier = Classifier::new(ClassifierConfig {
                accept_place_shaped_titles: place_shaped,
            })?;

            let summary = client
                .fetch_canonical_summary(&title)
                .await
                .context("couldn't load Wikipedia info")?;
            let Some(summary) = summary else {
                println!("No article titled {title:?}.");
                return Ok(());
            };

            print_classification(&classifier, &summary, cli.json)?;
        }
        Command::Distance {
            from_lat,
            from_lng,
            to_lat,
            to_lng,
        } => {
            let km = haversine_km(LatLng::new(from_lat, from_lng), LatLng::new(to_lat, to_lng));
            if cli.json {
                println!("{}", serde_json::json!({ "distanceKm": km }));
            } else {
                println!("{km:.1} km");
            }
        }
    }

    Ok(())
}

fn print_pool(pool: &[PoolEntry]) {
    if pool.is_empty() {
        println!("No articles found.");
        return;
    }

    for (index, entry) in pool.iter().enumerate() {
        let mut header = format!("{:>2}. {}", index + 1, entry.title());
        if entry.is_primary {
            header.push_str(" [Primary]");
        }
        if let Some(tag) = entry.display_tag() {
            header.push_str(&format!(" ({tag})"));
        }
        if let Some(km) = entry.distance_km {
            header.push_str(&format!(" {km:.1} km"));
        }
        println!("{header}");
        println!("    {}", entry.summary.blurb());
        if let Some(url) = entry.summary.page_url() {
            println!("    {url}");
        }
    }
}

fn print_classification(
    classifier: &Classifier,
    summary: &ArticleSummary,
    json: bool,
) -> anyhow::Result<()> {
    let badge = classifier.detect_badge(summary);
    let place_or_poi = classifier.is_place_or_poi(summary);
    let admin = classifier.is_admin(summary);
    let government_body = classifier.is_government_body(&summary.title);

    if json {
        let report = serde_json::json!({
            "title": summary.title,
            "description": summary.description,
            "badge": badge,
            "isPlaceOrPoi": place_or_poi,
            "isAdmin": admin,
            "isGovernmentBody": government_body,
            "isDisambiguation": summary.is_disambiguation(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("title: {}", summary.title);
    println!("description: {}", summary.description_text());
    match badge {
        Some(badge) => println!("badge: {badge}"),
        None => println!("badge: none"),
    }
    println!("place or POI: {place_or_poi}");
    println!("admin: {admin}");
    println!("government body: {government_body}");
    println!("disambiguation: {}", summary.is_disambiguation());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_place_file_fields() {
        let mut place = SelectedPlace {
            name: "Greer".to_string(),
            formatted_address: "Greer, SC, USA".to_string(),
            ..SelectedPlace::default()
        };
        let args = PlaceArgs {
            state: Some("South Carolina".to_string()),
            lat: Some(34.9387),
            lng: Some(-82.2273),
            types: vec!["locality".to_string()],
            ..PlaceArgs::default()
        };

        args.apply(&mut place);

        assert_eq!(place.name, "Greer");
        assert_eq!(place.admin.state, "South Carolina");
        assert_eq!(place.location, Some(LatLng::new(34.9387, -82.2273)));
        assert_eq!(place.types, vec!["locality".to_string()]);
    }

    #[test]
    fn tuning_flows_into_pool_config() {
        let tuning = TuningArgs {
            max_entries: 10,
            max_primary_km: 80.0,
            nearby_radius_km: 20.0,
            keyword_radius_km: 40.0,
            concurrency: 2,
            place_shaped: true,
        };

        let config = tuning.pool_config();

        assert_eq!(config.max_entries, 10);
        assert_eq!(config.resolver.policy.max_distance_km, 80.0);
        assert!(config.resolver.policy.accept_place_shaped_titles);
        assert!(config.classifier.accept_place_shaped_titles);
        assert_eq!(config.keyword_limit, 6);
    }

    #[test]
    fn cli_parses_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "place-wiki",
            "distance",
            "--from-lat",
            "34.9",
            "--from-lng",
            "-82.2",
            "--to-lat",
            "34.8",
            "--to-lng",
            "-82.4",
        ])
        .expect("arguments should parse");

        assert!(matches!(cli.command, Command::Distance { from_lng, .. } if from_lng == -82.2));
    }
}
