//! End-to-end overlay rendering: store records in, drawn plumes out
use approx::assert_relative_eq;
use chrono::{TimeDelta, TimeZone, Utc};
use odour_plume_core::plume::bearing_between;
use odour_plume_core::{
    Degrees, InMemoryIncidentStore, InMemoryObservationStore, Incident, IncidentStatus, Intensity,
    ObservationRecord, PlumeShape, SiteMapConfig, SiteMapView, StabilityClass, Viewport, WeatherMode,
    WeatherSnapshot,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn record(hours_ago: i64, speed: f32, direction: f32, stability: &str) -> ObservationRecord {
    let now = Utc.with_ymd_and_hms(2024, 11, 20, 12, 0, 0).unwrap();
    ObservationRecord {
        captured_at: Some(now - TimeDelta::hours(hours_ago)),
        wind_speed: Some(speed),
        wind_direction: Some(direction),
        stability_class: Some(stability.to_string()),
        temperature: Some(14.5),
    }
}

fn stores() -> (InMemoryObservationStore, InMemoryIncidentStore) {
    let now = Utc.with_ymd_and_hms(2024, 11, 20, 12, 0, 0).unwrap();
    let mut observations = InMemoryObservationStore::new(now);
    observations.insert(
        "wwtp-north",
        [
            record(0, 5.0, 0.0, "D"),
            record(1, 3.0, 90.0, "Moderately Unstable"),
            record(2, 0.2, 270.0, "F"),
            record(72, 8.0, 45.0, "A"),
        ],
    );

    let mut incidents = InMemoryIncidentStore::new();
    incidents.insert(
        "site-plan",
        [
            Incident::at_percent("odour-17", 50.0, 50.0, Intensity::from_raw(4), IncidentStatus::Open)
                .reported(now - TimeDelta::hours(3)),
            Incident::at_percent("odour-18", 20.0, 70.0, Intensity::MAX, IncidentStatus::Investigating)
                .reported(now - TimeDelta::minutes(30)),
            Incident::at_percent("odour-09", 80.0, 10.0, Intensity::MIN, IncidentStatus::Closed),
        ],
    );
    (observations, incidents)
}

#[test]
fn test_live_plume_points_downwind() {
    let (observations, incidents) = stores();
    let mut view = SiteMapView::new("wwtp-north", "site-plan", Viewport::new(1000.0, 800.0), SiteMapConfig::default());
    view.load_live(&observations);
    view.load_incidents(&incidents);

    let overlays = view.overlays();
    assert_eq!(overlays.len(), 2, "closed incident must not be drawn");
    assert!(overlays.get("odour-09").is_none());

    let overlay = overlays.get("odour-17").unwrap();
    let PlumeShape::Directional(plume) = &overlay.shape else {
        panic!("5 m/s should give a directional plume");
    };

    // Wind from north, odour travels south
    assert_eq!(plume.travel_bearing, Degrees::new(180.0));
    assert_relative_eq!(*bearing_between(plume.source, plume.tip), 180.0, epsilon = 1e-3);

    // (15 + 5 * 5) * 1.0 = 40% of the container width
    assert_relative_eq!(*plume.length_share, 40.0, epsilon = 1e-4);
    assert_relative_eq!(plume.length, 400.0, epsilon = 1e-3);
    assert_relative_eq!(plume.source.x, 500.0);
    assert_relative_eq!(plume.source.y, 400.0);
    assert_relative_eq!(plume.tip.x, 500.0, epsilon = 1e-3);
    assert_relative_eq!(plume.tip.y, 800.0, epsilon = 1e-3);

    assert_relative_eq!(plume.opacity, 0.5, epsilon = 1e-6);
    assert_eq!(plume.fill_color, StabilityClass::D.profile().display_color);
    assert_eq!(plume.fill_color.to_hex(), "#22c55e");
}

#[test]
fn test_historical_mode_hides_later_incidents() {
    let (observations, incidents) = stores();
    let mut view = SiteMapView::new("wwtp-north", "site-plan", Viewport::new(1000.0, 800.0), SiteMapConfig::default());
    view.load_history(&observations);
    view.load_incidents(&incidents);
    view.set_mode(WeatherMode::Historical);

    // 72h-old record is outside the 48h look-back
    assert_eq!(view.playback().series().len(), 3);

    // Oldest snapshot: calm air two hours ago, odour-18 not yet reported
    view.playback_mut().set_cursor(0);
    let overlays = view.overlays().clone();
    assert_eq!(overlays.len(), 1);
    assert!(overlays.get("odour-17").unwrap().shape.is_calm());
    assert_eq!(overlays.directional_count(), 0);

    // One hour ago: class B from the east, still only odour-17
    view.playback_mut().step_forward();
    let overlays = view.overlays().clone();
    assert_eq!(overlays.len(), 1);
    let plume = overlays.get("odour-17").unwrap().shape.as_directional().cloned().unwrap();
    assert_eq!(plume.travel_bearing, Degrees::new(270.0));
    assert_eq!(plume.fill_color.to_hex(), "#f97316");

    // Newest snapshot: both open incidents
    view.playback_mut().step_forward();
    let overlays = view.overlays();
    assert_eq!(overlays.len(), 2);
    assert_eq!(overlays.directional_count(), 2);
    assert_eq!(overlays.get("odour-18").unwrap().shape.fill_color().to_hex(), "#22c55e");
}

#[test]
fn test_directional_count_skips_calm_indicators() {
    let (observations, incidents) = stores();
    let mut view = SiteMapView::new("wwtp-north", "site-plan", Viewport::new(1000.0, 800.0), SiteMapConfig::default());
    view.load_history(&observations);
    view.load_incidents(&incidents);
    view.set_mode(WeatherMode::Historical);

    let counts: Vec<(usize, usize)> = (0..3)
        .map(|cursor| {
            view.playback_mut().set_cursor(cursor);
            let overlays = view.overlays();
            (overlays.len(), overlays.directional_count())
        })
        .collect();
    // Calm, class B breeze, then 5 m/s with odour-18 reported
    assert_eq!(counts, vec![(1, 0), (1, 1), (2, 2)]);

    view.set_live_snapshot(WeatherSnapshot::from_record(&record(0, 0.3, 90.0, "E")));
    view.set_mode(WeatherMode::Live);
    let overlays = view.overlays();
    assert_eq!(overlays.len(), 2);
    assert_eq!(overlays.directional_count(), 0);
    assert!(overlays.iter().all(|o| o.shape.is_calm()));
}

#[test]
fn test_missing_weather_draws_nothing() {
    let (_, incidents) = stores();
    let empty = InMemoryObservationStore::new(Utc::now());
    let mut view = SiteMapView::new("wwtp-north", "site-plan", Viewport::new(640.0, 480.0), SiteMapConfig::default());
    view.load_live(&empty);
    view.load_history(&empty);
    view.load_incidents(&incidents);

    assert!(view.current_snapshot().is_none());
    assert!(view.overlays().is_empty());

    view.set_mode(WeatherMode::Historical);
    assert!(view.playback_mut().play().is_none());
    assert!(view.overlays().is_empty());
}

#[test]
fn test_unusable_record_is_skipped() {
    let now = Utc.with_ymd_and_hms(2024, 11, 20, 12, 0, 0).unwrap();
    let mut observations = InMemoryObservationStore::new(now);
    let mut broken = record(1, 4.0, 10.0, "C");
    broken.wind_direction = None;
    observations.insert("wwtp-north", [record(2, 4.0, 10.0, "C"), broken, record(0, f32::NAN, 10.0, "C")]);

    let mut view = SiteMapView::new("wwtp-north", "site-plan", Viewport::new(640.0, 480.0), SiteMapConfig::default());
    view.load_history(&observations);
    view.load_live(&observations);

    assert_eq!(view.playback().series().len(), 1);
    assert!(view.current_snapshot().is_none(), "latest record has a NaN wind speed");
}
