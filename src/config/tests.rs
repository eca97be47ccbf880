use clap::{CommandFactory, FromArgMatches};
use tempfile::tempdir;

use super::{apply_config, load_config_file, types::ConfigFile};
use crate::args::{BenchArgs, HttpMethod};

fn parse_cli(raw: &[&str]) -> Result<(BenchArgs, clap::ArgMatches), String> {
    let matches = BenchArgs::command()
        .try_get_matches_from(raw)
        .map_err(|err| format!("parse failed: {}", err))?;
    let args = BenchArgs::from_arg_matches(&matches).map_err(|err| err.to_string())?;
    Ok((args, matches))
}

#[test]
fn parse_toml_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("volley.toml");
    let content = r#"
url = "http://localhost:3000/search?q=a b"
method = "post"
headers = ["X-Api-Key: secret", "Accept: */*"]
connections = 32
duration = 30
timeout_ms = 2500
http2 = false
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.url.as_deref() != Some("http://localhost:3000/search?q=a b") {
        return Err("Unexpected url".to_owned());
    }
    if config.method != Some(HttpMethod::Post) {
        return Err("Unexpected method".to_owned());
    }
    if config.connections != Some(32) || config.duration != Some(30) {
        return Err("Unexpected connections/duration".to_owned());
    }
    if config.http2 != Some(false) {
        return Err("Expected http2 = false".to_owned());
    }
    Ok(())
}

#[test]
fn parse_json_config_with_workers_alias() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("volley.json");
    std::fs::write(&path, r#"{"url":"https://example.com","workers":4}"#)
        .map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.connections != Some(4) {
        return Err(format!("Unexpected connections: {:?}", config.connections));
    }
    Ok(())
}

#[test]
fn unsupported_extension_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("volley.yaml");
    std::fs::write(&path, "url: x").map_err(|err| format!("write failed: {}", err))?;
    if load_config_file(&path).is_ok() {
        return Err("Expected yaml config to be rejected".to_owned());
    }
    Ok(())
}

#[test]
fn cli_values_win_over_config() -> Result<(), String> {
    let (mut args, matches) = parse_cli(&["volley", "-c", "3", "http://cli.local/"])?;
    let config = ConfigFile {
        url: Some("http://config.local/".to_owned()),
        connections: Some(50),
        duration: Some(5),
        ..ConfigFile::default()
    };
    apply_config(&mut args, &matches, &config).map_err(|err| err.to_string())?;

    if args.url.as_deref() != Some("http://cli.local/") {
        return Err(format!("Expected CLI url, got {:?}", args.url));
    }
    if args.connections.get() != 3 {
        return Err(format!("Expected CLI connections, got {}", args.connections.get()));
    }
    if args.duration.get() != 5 {
        return Err(format!("Expected config duration, got {}", args.duration.get()));
    }
    Ok(())
}

#[test]
fn config_rejects_zero_duration() -> Result<(), String> {
    let (mut args, matches) = parse_cli(&["volley", "http://cli.local/"])?;
    let config = ConfigFile {
        duration: Some(0),
        ..ConfigFile::default()
    };
    if apply_config(&mut args, &matches, &config).is_ok() {
        return Err("Expected zero duration to fail".to_owned());
    }
    Ok(())
}

#[test]
fn config_headers_must_be_well_formed() -> Result<(), String> {
    let (mut args, matches) = parse_cli(&["volley", "http://cli.local/"])?;
    let config = ConfigFile {
        headers: Some(vec!["no-colon".to_owned()]),
        ..ConfigFile::default()
    };
    if apply_config(&mut args, &matches, &config).is_ok() {
        return Err("Expected malformed header to fail".to_owned());
    }
    Ok(())
}
