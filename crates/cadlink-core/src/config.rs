//! 连接配置
//!
//! 宿主标识符列表和等待时间属于配置数据，可通过 JSON 文件覆盖，
//! 以适应宿主版本变化。

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "cadlink.json";

/// 指定配置文件路径的环境变量
pub const CONFIG_ENV_VAR: &str = "CADLINK_CONFIG";

/// 一种宿主（如 AutoCAD、ZWCAD）及其标识符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostProfile {
    /// 显示名称
    pub name: String,
    /// 按优先级排列的标识符（最新版本在前，通用标识符在后）
    pub prog_ids: Vec<String>,
    /// 连接名称中是否附带匹配到的标识符
    #[serde(default)]
    pub label_with_prog_id: bool,
}

impl HostProfile {
    pub fn new<I, S>(name: &str, prog_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            prog_ids: prog_ids.into_iter().map(Into::into).collect(),
            label_with_prog_id: false,
        }
    }

    pub fn with_prog_id_label(mut self) -> Self {
        self.label_with_prog_id = true;
        self
    }

    /// 连接成功后显示的应用名称
    pub fn label(&self, prog_id: &str) -> String {
        if self.label_with_prog_id {
            format!("{} ({})", self.name, prog_id)
        } else {
            self.name.clone()
        }
    }

    pub fn autocad() -> Self {
        Self::new(
            "AutoCAD",
            [
                "AutoCAD.Application.25",   // AutoCAD 2025
                "AutoCAD.Application.24.1", // AutoCAD 2024.1
                "AutoCAD.Application.24",   // AutoCAD 2024
                "AutoCAD.Application",      // 通用
            ],
        )
        .with_prog_id_label()
    }

    pub fn zwcad() -> Self {
        Self::new("ZWCAD", ["ZwCAD.Application"])
    }
}

/// 探测过程中的等待时间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeTimings {
    /// 附加成功后等待对象模型初始化
    #[serde(rename = "attach_settle_ms", with = "millis")]
    pub attach_settle: Duration,
    /// 宿主尚未就绪时，重试前的等待
    #[serde(rename = "unavailable_retry_ms", with = "millis")]
    pub unavailable_retry: Duration,
    /// 启动新实例后等待其完全启动
    #[serde(rename = "launch_settle_ms", with = "millis")]
    pub launch_settle: Duration,
}

impl ProbeTimings {
    /// 不等待（测试与模拟宿主使用）
    pub const ZERO: Self = Self {
        attach_settle: Duration::ZERO,
        unavailable_retry: Duration::ZERO,
        launch_settle: Duration::ZERO,
    };
}

impl Default for ProbeTimings {
    fn default() -> Self {
        Self {
            attach_settle: Duration::from_millis(1000),
            unavailable_retry: Duration::from_millis(2000),
            launch_settle: Duration::from_millis(3000),
        }
    }
}

/// 连接配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// 按探测顺序排列的宿主
    pub hosts: Vec<HostProfile>,
    #[serde(default)]
    pub timings: ProbeTimings,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            hosts: vec![HostProfile::autocad(), HostProfile::zwcad()],
            timings: ProbeTimings::default(),
        }
    }
}

impl ConnectionConfig {
    /// 默认宿主列表，但不做任何等待
    pub fn instant() -> Self {
        Self {
            timings: ProbeTimings::ZERO,
            ..Self::default()
        }
    }

    pub fn with_timings(mut self, timings: ProbeTimings) -> Self {
        self.timings = timings;
        self
    }

    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 文件存在则加载，否则使用默认配置
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let config = Self::load(path)?;
            info!("Loaded connection config from {}", path.display());
            Ok(config)
        } else {
            info!("No config at {}, using built-in host list", path.display());
            Ok(Self::default())
        }
    }

    /// 保存为 JSON 文件
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 检查宿主列表是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts.is_empty() {
            return Err(ConfigError::Invalid("no hosts configured".to_string()));
        }

        for host in &self.hosts {
            if host.name.trim().is_empty() {
                return Err(ConfigError::Invalid("host with empty name".to_string()));
            }
            if host.prog_ids.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "host '{}' has no identifiers",
                    host.name
                )));
            }
            if host.prog_ids.iter().any(|id| id.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "host '{}' has a blank identifier",
                    host.name
                )));
            }
        }

        Ok(())
    }
}

/// `Duration` 以毫秒整数序列化
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hosts() {
        let config = ConnectionConfig::default();
        assert_eq!(config.hosts.len(), 2);
        assert_eq!(config.hosts[0].name, "AutoCAD");
        assert_eq!(config.hosts[0].prog_ids[0], "AutoCAD.Application.25");
        assert_eq!(config.hosts[0].prog_ids.last().map(String::as_str), Some("AutoCAD.Application"));
        assert_eq!(config.hosts[1].prog_ids, vec!["ZwCAD.Application".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            HostProfile::autocad().label("AutoCAD.Application.24"),
            "AutoCAD (AutoCAD.Application.24)"
        );
        assert_eq!(HostProfile::zwcad().label("ZwCAD.Application"), "ZWCAD");
    }

    #[test]
    fn test_timings_from_json() {
        let json = r#"{
            "hosts": [{ "name": "ZWCAD", "prog_ids": ["ZwCAD.Application.2024"] }],
            "timings": { "attach_settle_ms": 250, "unavailable_retry_ms": 500, "launch_settle_ms": 4000 }
        }"#;

        let config: ConnectionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.timings.attach_settle, Duration::from_millis(250));
        assert_eq!(config.timings.launch_settle, Duration::from_secs(4));
        assert!(!config.hosts[0].label_with_prog_id);
    }

    #[test]
    fn test_missing_timings_use_defaults() {
        let json = r#"{ "hosts": [{ "name": "AutoCAD", "prog_ids": ["AutoCAD.Application"] }] }"#;
        let config: ConnectionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.timings, ProbeTimings::default());
    }

    #[test]
    fn test_validate_rejects_empty() {
        let mut config = ConnectionConfig::default();
        config.hosts[1].prog_ids.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.hosts.clear();
        assert!(config.validate().is_err());

        let config = ConnectionConfig {
            hosts: vec![HostProfile::new("AutoCAD", ["  "])],
            timings: ProbeTimings::ZERO,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let file_path = std::env::temp_dir().join("cadlink_test_config.json");

        let config = ConnectionConfig::default().with_timings(ProbeTimings::ZERO);
        config.save(&file_path).expect("Failed to save");

        let loaded = ConnectionConfig::load(&file_path).expect("Failed to load");
        assert_eq!(loaded, config);

        // 清理
        std::fs::remove_file(&file_path).ok();
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let file_path = std::env::temp_dir().join("cadlink_missing_config.json");
        std::fs::remove_file(&file_path).ok();

        let config = ConnectionConfig::load_or_default(&file_path).unwrap();
        assert_eq!(config, ConnectionConfig::default());
    }
}
