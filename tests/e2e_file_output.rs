use mimeo::{MimeoEnv, OutputOpts};
use mimeo_core::{MimeoConfig, OutputFormat};
use std::fs;
use tempfile::TempDir;

/// End-to-end: configuration file on disk to one output file per record
#[tokio::test]
async fn test_toml_config_to_xml_files() {
    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("out");
    let config_path = dir.path().join("people.toml");
    fs::write(
        &config_path,
        format!(
            r#"
seed = 3

[output]
direction = "file"
format = "xml"
xml_declaration = true
directory_path = "{}"
file_name = "person"

[[_templates_]]
count = 3

[_templates_.model.Person]
Id = "{{auto_increment}}"
Active = true
"#,
            output_dir.display()
        ),
    )
    .unwrap();

    let config = MimeoConfig::from_file(&config_path).unwrap();
    let metrics = mimeo::run::generate(&config).await.unwrap();
    assert_eq!(metrics.records_written, 3);

    for n in 1..=3 {
        let content = fs::read_to_string(output_dir.join(format!("person-{n}.xml"))).unwrap();
        assert!(content.starts_with(r#"<?xml version="1.0" encoding="utf-8"?><Person>"#));
        assert!(content.contains(&format!("<Id>{n:05}</Id>")), "{content}");
        assert!(content.contains("<Active>true</Active>"));
        assert!(content.ends_with("</Person>"));
    }
    assert!(!output_dir.join("person-4.xml").exists());
}

/// Command-line overrides take precedence over the file
#[tokio::test]
async fn test_overrides_switch_to_json() {
    let dir = TempDir::new().unwrap();
    let mut config = MimeoConfig::from_json(
        r#"{"output": {"file_name": "ignored"}, "_templates_": [{"count": 2, "model": {"Item": {"Name": "{first_name}"}}}]}"#,
    )
    .unwrap();

    let opts = OutputOpts {
        format: Some(mimeo::Format::Json),
        directory_path: Some(dir.path().to_path_buf()),
        file_name: Some("item".to_string()),
        ..OutputOpts::default()
    };
    opts.apply(&mut config.output);
    assert_eq!(config.output.format, OutputFormat::Json);

    mimeo::run::generate(&config).await.unwrap();

    for n in 1..=2 {
        let content = fs::read_to_string(dir.path().join(format!("item-{n}.json"))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(value["Item"]["Name"].is_string());
    }
    assert!(!dir.path().join("ignored-1.json").exists());
}

/// Environment settings apply below explicit overrides
#[test]
fn test_env_then_overrides() {
    let dir = TempDir::new().unwrap();
    let envs = dir.path().join(".mimeoenv");
    fs::write(
        &envs,
        r#"{"dev": {"host": "dev.local", "port": 9000, "username": "dev"}}"#,
    )
    .unwrap();

    let mut config = MimeoConfig::from_json(
        r#"{"output": {"direction": "http", "endpoint": "/items"}, "_templates_": [{"count": 1, "model": {"A": 1}}]}"#,
    )
    .unwrap();

    MimeoEnv::load(&envs, "dev").unwrap().apply(&mut config.output);
    let opts = OutputOpts {
        http_port: Some(9443),
        http_protocol: Some(mimeo::Protocol::Https),
        ..OutputOpts::default()
    };
    opts.apply(&mut config.output);

    assert_eq!(config.output.url(), "https://dev.local:9443/items");
    assert_eq!(config.output.username.as_deref(), Some("dev"));
}
