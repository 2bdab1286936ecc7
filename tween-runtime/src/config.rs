//! # Config 模块
//!
//! 动画系统配置，JSON 格式。
//!
//! 所有字段都有默认值，配置文件中可以只写需要覆盖的部分：
//!
//! ```json
//! {
//!   "default_duration": 0.5,
//!   "default_tweener": { "kind": "ease_out" },
//!   "clock": { "max_frame_dt": 0.1 }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::animation::AnimateOptions;
use crate::tweener::Tweener;

/// 动画配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// 默认动画时长（秒）
    #[serde(default = "default_duration")]
    pub default_duration: f64,

    /// 默认缓动函数
    #[serde(default)]
    pub default_tweener: Tweener,

    /// 默认重复次数，0 表示无限循环
    #[serde(default)]
    pub default_repeat: u32,

    /// 默认是否往返
    #[serde(default)]
    pub default_reverse: bool,

    /// 帧时钟配置
    #[serde(default)]
    pub clock: ClockConfig,
}

/// 帧时钟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// 单帧 dt 上限（秒），用于吸收卡顿造成的时间跳变
    #[serde(default = "default_max_frame_dt")]
    pub max_frame_dt: f64,

    /// 名义刷新频率（Hz）
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: f64,
}

fn default_duration() -> f64 {
    0.25
}

fn default_max_frame_dt() -> f64 {
    0.25
}

fn default_tick_rate_hz() -> f64 {
    60.0
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            default_duration: default_duration(),
            default_tweener: Tweener::default(),
            default_repeat: 0,
            default_reverse: false,
            clock: ClockConfig::default(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_frame_dt: default_max_frame_dt(),
            tick_rate_hz: default_tick_rate_hz(),
        }
    }
}

impl ClockConfig {
    /// 名义帧间隔（秒）
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.tick_rate_hz
    }
}

impl AnimationConfig {
    /// 加载配置文件
    ///
    /// 文件不存在、读取或解析失败时返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件读取失败，使用默认配置");
                return Self::default();
            }
        };

        match Self::from_json_str(&content) {
            Ok(config) => {
                info!(path = %path.display(), "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "配置文件无效，使用默认配置");
                Self::default()
            }
        }
    }

    /// 从 JSON 字符串解析并验证
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_duration.is_finite() || self.default_duration < 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "default_duration 必须是非负数，当前为 {}",
                self.default_duration
            )));
        }

        self.default_tweener
            .validate()
            .map_err(|e| ConfigError::ValidationFailed(format!("default_tweener 无效：{e}")))?;

        if !self.clock.max_frame_dt.is_finite() || self.clock.max_frame_dt <= 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "clock.max_frame_dt 必须是正数，当前为 {}",
                self.clock.max_frame_dt
            )));
        }

        if !self.clock.tick_rate_hz.is_finite() || self.clock.tick_rate_hz <= 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "clock.tick_rate_hz 必须是正数，当前为 {}",
                self.clock.tick_rate_hz
            )));
        }

        Ok(())
    }

    /// 以配置默认值构造的动画参数
    pub fn animate_options(&self) -> AnimateOptions {
        AnimateOptions::default()
            .with_tweener(self.default_tweener.clone())
            .with_repeat(self.default_repeat)
            .with_reverse(self.default_reverse)
    }
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// 解析失败
    #[error("配置解析失败: {0}")]
    ParseFailed(String),
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnimationConfig::default();
        assert_eq!(config.default_duration, 0.25);
        assert_eq!(config.default_tweener, Tweener::Linear);
        assert_eq!(config.default_repeat, 0);
        assert!(!config.default_reverse);
        assert_eq!(config.clock.max_frame_dt, 0.25);
        assert_eq!(config.clock.tick_rate_hz, 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AnimationConfig::from_json_str(
            r#"{ "default_tweener": { "kind": "cycle", "cycles": 3 }, "clock": { "tick_rate_hz": 30 } }"#,
        )
        .unwrap();
        assert_eq!(config.default_duration, 0.25);
        assert_eq!(config.default_tweener, Tweener::Cycle { cycles: 3 });
        assert_eq!(config.clock.tick_rate_hz, 30.0);
        assert_eq!(config.clock.max_frame_dt, 0.25);
        assert!((config.clock.frame_interval() - 1.0 / 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AnimationConfig::default();
        config.default_duration = -1.0;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationFailed(_))));

        let mut config = AnimationConfig::default();
        config.clock.tick_rate_hz = 0.0;
        assert!(config.validate().is_err());

        let err = AnimationConfig::from_json_str(r#"{ "default_tweener": { "kind": "cycle", "cycles": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed(_)));

        let err = AnimationConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("animation.json");

        let mut config = AnimationConfig::default();
        config.default_duration = 1.5;
        config.default_reverse = true;
        config.default_tweener = Tweener::EaseOut;
        config.save(&path).unwrap();

        assert_eq!(AnimationConfig::load(&path), config);
    }

    #[test]
    fn test_load_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            AnimationConfig::load(dir.path().join("missing.json")),
            AnimationConfig::default()
        );

        let path = dir.path().join("broken.json");
        fs::write(&path, "[1, 2").unwrap();
        assert_eq!(AnimationConfig::load(&path), AnimationConfig::default());
    }

    #[test]
    fn test_animate_options_seeded() {
        let mut config = AnimationConfig::default();
        config.default_repeat = 2;
        config.default_reverse = true;
        config.default_tweener = Tweener::Easy;

        let options = config.animate_options();
        assert_eq!(options.repeat, 2);
        assert!(options.reverse);
        assert_eq!(options.tweener, Tweener::Easy);
        assert!(options.replace);
        assert!(!options.auto_start);
    }
}
