//! Tests for TOML configuration parsing.

use super::toml::{TomlConfig, default_config_template};

mod parsing {
    use super::*;
    use std::path::Path;

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [watch]
            file = "/var/lib/routes/table.txt"
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        assert_eq!(
            config.watch.file.as_deref(),
            Some(Path::new("/var/lib/routes/table.txt"))
        );
        assert!(config.watch.debounce_ms.is_none());
        assert!(config.table.marker.is_none());
        assert!(config.report.max_listed.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [watch]
            file = "routes.txt"
            debounce_ms = 750

            [table]
            marker = "Route:"

            [report]
            max_listed = 25
        "#;

        let config = TomlConfig::parse(toml).unwrap();
        assert_eq!(config.watch.file.as_deref(), Some(Path::new("routes.txt")));
        assert_eq!(config.watch.debounce_ms, Some(750));
        assert_eq!(config.table.marker.as_deref(), Some("Route:"));
        assert_eq!(config.report.max_listed, Some(25));
    }

    #[test]
    fn parse_empty_config() {
        let config = TomlConfig::parse("").unwrap();
        assert!(config.watch.file.is_none());
    }
}

mod errors {
    use super::*;
    use crate::config::ConfigError;

    #[test]
    fn unknown_section_is_rejected() {
        let result = TomlConfig::parse("[server]\nport = 80\n");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let result = TomlConfig::parse("[watch]\npath = \"x\"\n");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let result = TomlConfig::parse("[watch]\ndebounce_ms = \"fast\"\n");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn negative_max_listed_is_rejected() {
        let result = TomlConfig::parse("[report]\nmax_listed = -1\n");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn load_missing_file_returns_file_read() {
        let dir = tempfile::tempdir().unwrap();
        let result = TomlConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }
}

mod loading {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[report]\nmax_listed = 4").unwrap();

        let config = TomlConfig::load(file.path()).unwrap();
        assert_eq!(config.report.max_listed, Some(4));
    }
}

mod template {
    use super::*;

    #[test]
    fn template_is_valid_toml() {
        let template = default_config_template();
        let config = TomlConfig::parse(&template).unwrap();

        // Everything is commented out, so nothing is set
        assert!(config.watch.file.is_none());
        assert!(config.watch.debounce_ms.is_none());
        assert!(config.table.marker.is_none());
        assert!(config.report.max_listed.is_none());
    }

    #[test]
    fn template_mentions_every_section() {
        let template = default_config_template();
        assert!(template.contains("[watch]"));
        assert!(template.contains("[table]"));
        assert!(template.contains("[report]"));
    }
}
