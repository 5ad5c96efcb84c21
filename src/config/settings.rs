use crate::domain::ports::ConfigProvider;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_route_prefix, validate_socket_addr,
    validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::Path;

pub const BIND_ENV: &str = "LASTDONE_BIND";
pub const DATA_DIR_ENV: &str = "LASTDONE_DATA_DIR";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub project: ProjectConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
    pub description: String,
    pub version: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "lastdone".to_string(),
            description: "Track when you last did something and when to do it again".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ProjectConfig {
    /// 啟動時顯示的專案資訊
    pub fn banner(&self) -> String {
        if self.description.is_empty() {
            format!("{} v{}", self.name, self.version)
        } else {
            format!("{} v{} - {}", self.name, self.version, self.description)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub api_v1_str: String,
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            api_v1_str: "/api/v1".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            in_memory: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
}

impl Settings {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| AppError::ConfigError {
            message: format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 載入配置：有指定檔案就讀檔，否則使用預設值，最後套用環境變數
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// 替換環境變數 (例如 ${DATA_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var(BIND_ENV) {
            self.server.bind = bind;
        }
        if let Ok(data_dir) = std::env::var(DATA_DIR_ENV) {
            self.storage.data_dir = data_dir;
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        validate_socket_addr("server.bind", &self.server.bind)
    }

    /// 用戶端預設連到本機設定的 server.bind；0.0.0.0 之類的位址改連 loopback
    pub fn client_base_url(&self) -> Result<String> {
        let mut addr = self.bind_addr()?;
        if addr.ip().is_unspecified() {
            let loopback = match addr {
                SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::LOCALHOST),
                SocketAddr::V6(_) => IpAddr::V6(Ipv6Addr::LOCALHOST),
            };
            addr.set_ip(loopback);
        }
        Ok(format!("http://{}", addr))
    }
}

impl ConfigProvider for Settings {
    fn project_name(&self) -> &str {
        &self.project.name
    }

    fn api_v1_str(&self) -> &str {
        &self.server.api_v1_str
    }

    fn cors_origins(&self) -> &[String] {
        &self.server.cors_origins
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("project.name", &self.project.name)?;
        self.bind_addr()?;
        validate_route_prefix("server.api_v1_str", &self.server.api_v1_str)?;

        for origin in &self.server.cors_origins {
            validate_url("server.cors_origins", origin)?;
        }

        if !self.storage.in_memory {
            validate_path("storage.data_dir", &self.storage.data_dir)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.api_v1_str, "/api/v1");
        assert_eq!(settings.server.cors_origins, vec!["http://localhost:3000"]);
        assert_eq!(settings.bind_addr().unwrap().port(), 8000);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
[project]
name = "chores"

[server]
bind = "0.0.0.0:9000"
cors_origins = ["http://localhost:5173", "https://chores.example.com"]

[storage]
in_memory = true
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();

        assert_eq!(settings.project.name, "chores");
        assert_eq!(settings.server.bind, "0.0.0.0:9000");
        assert_eq!(settings.server.api_v1_str, "/api/v1");
        assert_eq!(settings.server.cors_origins.len(), 2);
        assert!(settings.storage.in_memory);
        assert!(!settings.logging.json);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LASTDONE_TEST_DATA_DIR", "/var/lib/lastdone");

        let toml_content = r#"
[storage]
data_dir = "${LASTDONE_TEST_DATA_DIR}"
"#;

        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert_eq!(settings.storage.data_dir, "/var/lib/lastdone");

        std::env::remove_var("LASTDONE_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[server]
api_v1_str = "api/v1/"
"#;
        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert!(settings.validate().is_err());

        let toml_content = r#"
[server]
cors_origins = ["localhost:3000"]
"#;
        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert!(settings.validate().is_err());

        let toml_content = r#"
[server]
bind = "nowhere"
"#;
        let settings = Settings::from_toml_str(toml_content).unwrap();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_env_overrides_applied_on_load() {
        std::env::set_var(BIND_ENV, "127.0.0.1:8123");
        std::env::set_var(DATA_DIR_ENV, "/srv/lastdone");

        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.server.bind, "127.0.0.1:8123");
        assert_eq!(settings.storage.data_dir, "/srv/lastdone");

        std::env::remove_var(BIND_ENV);
        std::env::remove_var(DATA_DIR_ENV);
    }

    #[test]
    fn test_client_base_url_follows_bind() {
        let mut settings = Settings::default();
        assert_eq!(settings.client_base_url().unwrap(), "http://127.0.0.1:8000");

        settings.server.bind = "0.0.0.0:9000".to_string();
        assert_eq!(settings.client_base_url().unwrap(), "http://127.0.0.1:9000");

        settings.server.bind = "[::]:9001".to_string();
        assert_eq!(settings.client_base_url().unwrap(), "http://[::1]:9001");

        settings.server.bind = "nowhere".to_string();
        assert!(settings.client_base_url().is_err());
    }

    #[test]
    fn test_project_banner() {
        let project = ProjectConfig::default();
        assert_eq!(
            project.banner(),
            format!(
                "lastdone v{} - Track when you last did something and when to do it again",
                env!("CARGO_PKG_VERSION")
            )
        );

        let project = ProjectConfig {
            name: "chores".to_string(),
            description: String::new(),
            version: "2.0.0".to_string(),
        };
        assert_eq!(project.banner(), "chores v2.0.0");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            Settings::from_toml_str("[server\nbind = 1"),
            Err(AppError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[project]
name = "file-test"

[logging]
json = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let settings = Settings::from_file(temp_file.path()).unwrap();
        assert_eq!(settings.project.name, "file-test");
        assert!(settings.logging.json);

        assert!(Settings::from_file("/definitely/not/here.toml").is_err());
    }
}
