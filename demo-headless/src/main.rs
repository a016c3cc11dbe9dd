use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use clap::Parser;
use odour_plume_core::{
    InMemoryIncidentStore, InMemoryObservationStore, Incident, IncidentStatus, Intensity,
    ObservationRecord, PlaybackEnd, PlaybackSpeed, PlumeShape, SiteMapConfig, SiteMapView,
    StabilityClass, Viewport, WeatherMode,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const SITE: &str = "demo-site";
const SITE_MAP: &str = "demo-site-plan";

/// Odour plume playback demo with configurable parameters
#[derive(Parser, Debug)]
#[command(name = "odour-plume-demo")]
#[command(about = "Replays weather history over a site map and prints the odour plumes", long_about = None)]
struct Args {
    /// Hours of weather history to look back over (and to synthesize); defaults to the config value
    #[arg(long)]
    hours: Option<u32>,

    /// Number of incidents to place on the map
    #[arg(short = 'n', long, default_value_t = 6)]
    incidents: u32,

    /// Playback speed multiplier (0.5, 1, 2, 4)
    #[arg(short, long, default_value_t = 1.0)]
    speed: f32,

    /// Override the base tick interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop at the newest snapshot instead of looping
    #[arg(long)]
    stop_at_newest: bool,

    /// Render surface width
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Render surface height
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Seed for synthetic weather and incidents
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// JSON file with a site-map configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file with observation records to replay instead of synthetic weather
    #[arg(long)]
    series: Option<PathBuf>,

    /// Number of playback frames to print
    #[arg(short, long, default_value_t = 12)]
    frames: u32,

    /// Print frames back to back without waiting for the tick interval
    #[arg(long)]
    no_wait: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║              Odour Plume Playback - Headless              ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();

    let config = load_config(args)?;
    let speed = PlaybackSpeed::from_multiplier(args.speed)
        .with_context(|| format!("unsupported playback speed {}; use 0.5, 1, 2 or 4", args.speed))?;

    let hours = config.playback.look_back_hours;
    let mut rng = StdRng::seed_from_u64(args.seed);

    let (records, now) = match &args.series {
        Some(path) => {
            let records = load_records(path)?;
            let newest = reference_time(&records, Utc::now());
            info!(records = records.len(), newest = %newest, "replaying saved observations");
            (records, newest)
        }
        None => {
            let now = Utc::now();
            (synthesize_weather(&mut rng, now, hours), now)
        }
    };
    let mut observations = InMemoryObservationStore::new(now);
    observations.insert(SITE, records);

    let mut incidents = InMemoryIncidentStore::new();
    incidents.insert(SITE_MAP, synthesize_incidents(&mut rng, now, hours, args.incidents));

    let mut view = SiteMapView::new(SITE, SITE_MAP, Viewport::new(args.width, args.height), config);
    view.load_live(&observations);
    view.load_history(&observations);
    view.load_incidents(&incidents);

    println!("Site map:   {:.0} x {:.0}", args.width, args.height);
    println!("Incidents:  {} active", view.incidents().len());
    println!("History:    {} snapshots", view.playback().series().len());
    println!();

    println!("── LIVE ─────────────────────────────────────────────────────");
    report(&mut view);

    view.set_mode(WeatherMode::Historical);
    view.playback_mut().set_cursor(0);
    view.playback_mut().set_speed(speed);
    let Some(handle) = view.playback_mut().play() else {
        println!("No weather history to replay.");
        return Ok(());
    };
    info!(interval_ms = handle.interval().as_millis() as u64, "playback started");

    println!("── PLAYBACK {:>4}x ───────────────────────────────────────────", speed.multiplier());
    report(&mut view);
    for _ in 0..args.frames {
        if !args.no_wait {
            std::thread::sleep(handle.interval());
        }
        if !view.playback_mut().on_tick(&handle) {
            break;
        }
        report(&mut view);
    }

    view.set_mode(WeatherMode::Live);
    println!();
    println!("Playback finished at cursor {}", view.playback().state().cursor);
    Ok(())
}

fn load_config(args: &Args) -> Result<SiteMapConfig> {
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SiteMapConfig::default(),
    };
    Ok(apply_overrides(config, args))
}

/// Flags given on the command line win over the config file
fn apply_overrides(mut config: SiteMapConfig, args: &Args) -> SiteMapConfig {
    if let Some(hours) = args.hours {
        config.playback.look_back_hours = hours;
    }
    if let Some(ms) = args.interval_ms {
        config.playback.base_interval_ms = ms;
    }
    if args.stop_at_newest {
        config.playback.end_behavior = PlaybackEnd::StopAtNewest;
    }
    config
}

/// Saved observations are replayed relative to their newest capture time
fn reference_time(records: &[ObservationRecord], fallback: DateTime<Utc>) -> DateTime<Utc> {
    records.iter().filter_map(|r| r.captured_at).max().unwrap_or(fallback)
}

fn load_records(path: &Path) -> Result<Vec<ObservationRecord>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading series {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing series {}", path.display()))
}

/// Hourly observations, newest first, with wind drifting between hours
fn synthesize_weather(rng: &mut StdRng, now: DateTime<Utc>, hours: u32) -> Vec<ObservationRecord> {
    let mut direction: f32 = rng.random_range(0.0..360.0);
    let mut speed: f32 = rng.random_range(0.5..6.0);

    (0..hours)
        .map(|h| {
            direction = (direction + rng.random_range(-35.0..35.0)).rem_euclid(360.0);
            speed = (speed + rng.random_range(-1.5..1.5)).clamp(0.0, 12.0);
            let stability = if speed < 2.0 {
                StabilityClass::ALL[rng.random_range(3..6)]
            } else {
                StabilityClass::ALL[rng.random_range(0..4)]
            };
            ObservationRecord {
                captured_at: Some(now - TimeDelta::hours(i64::from(h))),
                wind_speed: Some(speed),
                wind_direction: Some(direction),
                stability_class: Some(stability.letter().to_string()),
                temperature: Some(rng.random_range(8.0..28.0)),
            }
        })
        .collect()
}

fn synthesize_incidents(rng: &mut StdRng, now: DateTime<Utc>, hours: u32, count: u32) -> Vec<Incident> {
    const STATUSES: [IncidentStatus; 4] = [
        IncidentStatus::Open,
        IncidentStatus::Investigating,
        IncidentStatus::Resolved,
        IncidentStatus::Closed,
    ];

    (0..count)
        .map(|i| {
            let hours_ago = rng.random_range(0..=i64::from(hours.max(1)));
            Incident::at_percent(
                format!("odour-{:03}", i + 1),
                rng.random_range(10.0..90.0),
                rng.random_range(10.0..90.0),
                Intensity::from_raw(rng.random_range(1..=5)),
                STATUSES[rng.random_range(0..STATUSES.len())],
            )
            .reported(now - TimeDelta::hours(hours_ago))
        })
        .collect()
}

fn report(view: &mut SiteMapView) {
    let Some(snapshot) = view.current_snapshot().cloned() else {
        println!("  (no weather data, no plumes)");
        return;
    };
    let temperature = snapshot
        .temperature
        .map_or_else(|| "n/a".to_string(), |t| format!("{:.1}°C", *t));
    println!(
        "[{}] wind {} from {} | class {} | {}",
        snapshot.captured_at.format("%Y-%m-%d %H:%M"),
        snapshot.wind_speed,
        snapshot.wind_bearing_from,
        snapshot.stability_class,
        temperature
    );

    let overlays = view.overlays();
    if overlays.is_empty() {
        println!("  (no incidents visible)");
    }
    for overlay in overlays {
        let shape = match &overlay.shape {
            PlumeShape::Directional(plume) => format!(
                "→ {} length {} half-width {:.1}",
                plume.travel_bearing, plume.length_share, plume.max_half_width
            ),
            PlumeShape::Calm(calm) => format!("calm radius {:.1}", calm.radius),
        };
        println!(
            "  {:<10} {:<13} I{} {} opacity {:.2} {}",
            overlay.incident_id,
            overlay.status.as_str(),
            overlay.intensity.value(),
            shape,
            overlay.shape.opacity(),
            overlay.shape.fill_color().to_hex()
        );
    }
    println!("  {} directional, {} calm", overlays.directional_count(), overlays.len() - overlays.directional_count());
}
