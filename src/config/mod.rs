mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./imagecask.toml",
        "~/.config/imagecask/config.toml",
        "/etc/imagecask/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.upload.max_batch_size == 0 {
        anyhow::bail!("Upload max_batch_size cannot be 0");
    }

    if config.upload.max_body_bytes == 0 {
        anyhow::bail!("Upload max_body_bytes cannot be 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_full() {
        let file = write_config(
            r#"
[server]
host = "127.0.0.1"
port = 9090

[storage]
data_dir = "/tmp/imagecask"

[upload]
max_batch_size = 5
max_body_bytes = 1048576
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9090);
        assert_eq!(
            config.storage.data_dir,
            std::path::PathBuf::from("/tmp/imagecask")
        );
        assert_eq!(config.upload.max_batch_size, 5);
        assert_eq!(config.upload.max_body_bytes, 1048576);
    }

    #[test]
    fn test_load_config_defaults_for_missing_sections() {
        let file = write_config("[server]\nport = 3000\n");

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upload.max_batch_size, 10);
        assert_eq!(config.upload.max_body_bytes, 100 * 1024 * 1024);
    }

    #[test]
    fn test_load_config_rejects_zero_port() {
        let file = write_config("[server]\nport = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_config_rejects_zero_batch_size() {
        let file = write_config("[upload]\nmax_batch_size = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_load_config_rejects_invalid_toml() {
        let file = write_config("this is not toml {");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }
}
