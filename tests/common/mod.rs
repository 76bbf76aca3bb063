use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Group used by every fixture
#[allow(dead_code)]
pub const GROUP: &str = "Surrey-Code-Camp";

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Events endpoint payload: two upcoming events out of order, one past
/// event, and extra fields the announcer ignores.
#[allow(dead_code)]
pub fn sample_events_json() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "298765432",
            "name": "Rust Night",
            "time": 1_704_164_400_000_i64,
            "status": "upcoming",
            "yes_rsvp_count": 24,
            "venue": {
                "id": 25791234,
                "name": "City Centre Library",
                "address_1": "10350 University Dr",
                "city": "Surrey",
                "country": "ca"
            },
            "link": "https://www.meetup.com/Surrey-Code-Camp/events/298765432/"
        },
        {
            "id": "298765001",
            "name": "New Year Hack Night",
            "time": 1_704_128_700_000_i64,
            "status": "upcoming",
            "venue": {
                "name": "Innovation Boulevard",
                "address_1": "9639 137A St",
                "city": "Surrey"
            },
            "link": "https://www.meetup.com/Surrey-Code-Camp/events/298765001/"
        },
        {
            "id": "297000000",
            "name": "December Social",
            "time": 1_702_000_000_000_i64,
            "status": "past",
            "venue": {
                "name": "Central City Brewing",
                "address_1": "13450 102 Ave",
                "city": "Surrey"
            },
            "link": "https://www.meetup.com/Surrey-Code-Camp/events/297000000/"
        }
    ])
}
