//! Integration tests for Configuration System

use crate::integration::test_utils::with_env_lock;
use itinera::config::{ConfigLoader, ProviderType, ValidationError};
use itinera::Pipeline;
use tempfile::TempDir;

#[test]
fn test_workspace_config_builds_pipeline() {
    with_env_lock(|| {
        let temp_dir = TempDir::new().unwrap();
        let original = std::env::var_os("ITINERA_CONFIG_DIR");
        std::env::set_var("ITINERA_CONFIG_DIR", temp_dir.path().join("global"));

        let config_dir = temp_dir.path().join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(
            config_dir.join("config.toml"),
            r#"
[provider]
provider_type = "ollama"
model = "llama3"
endpoint = "http://localhost:11434"

[provider.default_options]
temperature = 0.2

[generation]
system_prompt = "You plan trips for families."
activity_cap = 6
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(temp_dir.path()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.provider.provider_type, ProviderType::Ollama);
        assert_eq!(config.provider.default_options.temperature, Some(0.2));
        assert_eq!(config.generation.system_prompt, "You plan trips for families.");

        let pipeline = Pipeline::from_config(&config).unwrap();
        assert_eq!(pipeline.provider_name(), "ollama");
        assert_eq!(pipeline.model_name(), "llama3");
        assert_eq!(pipeline.activity_cap(), 6);

        match original {
            Some(v) => std::env::set_var("ITINERA_CONFIG_DIR", v),
            None => std::env::remove_var("ITINERA_CONFIG_DIR"),
        }
    });
}

#[test]
fn test_invalid_config_reports_every_section() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("bad.toml");
    std::fs::write(
        &config_file,
        r#"
[provider]
provider_type = "local"
model = "m"

[generation]
activity_cap = 40

[logging]
output = "file"
"#,
    )
    .unwrap();

    let config = with_env_lock(|| ConfigLoader::load_from_file(&config_file)).unwrap();
    let errors = config.validate().unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, ValidationError::Provider(_))));
    assert!(errors.iter().any(|e| matches!(e, ValidationError::Generation(_))));
    assert!(errors.iter().any(|e| matches!(e, ValidationError::Logging(_))));
    assert!(Pipeline::from_config(&config).is_err());
}

#[test]
fn test_unknown_provider_type_fails_to_load() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("unknown.toml");
    std::fs::write(
        &config_file,
        r#"
[provider]
provider_type = "carrier-pigeon"
"#,
    )
    .unwrap();

    assert!(with_env_lock(|| ConfigLoader::load_from_file(&config_file)).is_err());
}

#[test]
fn test_env_override_selects_provider() {
    with_env_lock(|| {
        let temp_dir = TempDir::new().unwrap();
        let original = std::env::var_os("ITINERA_CONFIG_DIR");
        std::env::set_var("ITINERA_CONFIG_DIR", temp_dir.path().join("global"));
        std::env::set_var("ITINERA__PROVIDER__PROVIDER_TYPE", "ollama");
        std::env::set_var("ITINERA__PROVIDER__MODEL", "mistral");

        let config = ConfigLoader::load(temp_dir.path()).unwrap();
        assert_eq!(config.provider.provider_type, ProviderType::Ollama);
        assert_eq!(config.provider.model, "mistral");

        std::env::remove_var("ITINERA__PROVIDER__PROVIDER_TYPE");
        std::env::remove_var("ITINERA__PROVIDER__MODEL");
        match original {
            Some(v) => std::env::set_var("ITINERA_CONFIG_DIR", v),
            None => std::env::remove_var("ITINERA_CONFIG_DIR"),
        }
    });
}
