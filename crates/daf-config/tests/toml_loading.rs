//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use daf_config::DafConfig;

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[sefaria]
base_url = "http://localhost:9000/api"
max_attempts = 2

[engine]
link_depth = 3
data_dir = "./data"

[cache]
enabled = false
"#,
        )?;

        let config: DafConfig = Figment::from(Serialized::defaults(DafConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.sefaria.base_url, "http://localhost:9000/api");
        assert_eq!(config.sefaria.max_attempts, 2);
        assert_eq!(config.sefaria.timeout_secs, 30);
        assert_eq!(config.engine.link_depth, 3);
        assert_eq!(config.engine.bulk_shard_size, 40);
        assert_eq!(config.engine.data_dir.as_deref(), Some(std::path::Path::new("./data")));
        assert!(!config.cache.enabled);
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".daf")?;
        jail.create_file(".daf/config.toml", "[engine]\nbulk_shard_size = 10\n")?;

        let config = DafConfig::load().expect("config loads");
        assert_eq!(config.engine.bulk_shard_size, 10);
        Ok(())
    });
}

#[test]
fn malformed_toml_is_an_error() {
    Jail::expect_with(|jail| {
        jail.create_dir(".daf")?;
        jail.create_file(".daf/config.toml", "[engine]\nlink_depth = \"deep\"\n")?;

        assert!(DafConfig::load().is_err());
        Ok(())
    });
}
