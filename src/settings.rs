//! # 配置与状态持久化模块
//!
//! ## 设计思路
//!
//! 面板有两份落盘 JSON：全局配置（后端 Token、服务商选择、预览开关）
//! 与处理状态（上次选择的模型、比例、输出选项等）。两份文件都可能
//! 不存在或被写坏，读取一律容错回退默认值并告警，绝不让一份坏配置
//! 卡死面板启动。
//!
//! ## 实现思路
//!
//! - 磁盘格式与面板侧一致：camelCase 字段、缺省字段直接省略。
//! - 读取：缺文件 / 空文件 / 解析失败均返回默认值。
//! - 写入：按需创建数据目录，pretty JSON 落盘。
//! - 字段级 setter 做读-改-写，调用方不必自己拼配置。

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 全局配置文件名。
pub const CONFIG_FILE_NAME: &str = "selection-relay.config.json";

/// 处理状态文件名。
pub const PROCESS_STATE_FILE_NAME: &str = "process.state.json";

/// 默认服务商标识。
const DEFAULT_API_SERVER: &str = "grsai";

/// 面板全局配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GlobalConfig {
    /// 后端鉴权 Token。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// 服务商标识。
    pub api_server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_panel_enabled: Option<bool>,
    /// 是否在面板里展示选区预览图。
    pub show_selection_preview: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_server: DEFAULT_API_SERVER.to_string(),
            debug_panel_enabled: None,
            show_selection_preview: false,
        }
    }
}

impl GlobalConfig {
    /// 去掉首尾空白后的非空后端 Token。
    pub fn secret_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn debug_panel_enabled(&self) -> bool {
        self.debug_panel_enabled.unwrap_or(false)
    }
}

/// 面板处理状态，字段全部可缺省。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_preset: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_custom_ratio: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_resolution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_force_opaque: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue_shift_enabled: Option<bool>,
}

/// 配置文件存取入口，持有数据目录路径。
#[derive(Debug, Clone)]
pub struct SettingsStore {
    data_dir: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn config_path(&self) -> PathBuf {
        self.data_dir.join(CONFIG_FILE_NAME)
    }

    fn state_path(&self) -> PathBuf {
        self.data_dir.join(PROCESS_STATE_FILE_NAME)
    }

    pub fn load_config(&self) -> GlobalConfig {
        load_json_or_default(&self.config_path(), "全局配置")
    }

    pub fn save_config(&self, config: &GlobalConfig) -> Result<(), AppError> {
        self.save_json(&self.config_path(), config, "全局配置")
    }

    pub fn load_process_state(&self) -> ProcessState {
        load_json_or_default(&self.state_path(), "处理状态")
    }

    pub fn save_process_state(&self, state: &ProcessState) -> Result<(), AppError> {
        self.save_json(&self.state_path(), state, "处理状态")
    }

    pub fn set_api_key(&self, api_key: impl Into<String>) -> Result<(), AppError> {
        let mut config = self.load_config();
        config.api_key = Some(api_key.into());
        self.save_config(&config)
    }

    pub fn set_api_server(&self, api_server: impl Into<String>) -> Result<(), AppError> {
        let mut config = self.load_config();
        config.api_server = api_server.into();
        self.save_config(&config)
    }

    pub fn set_debug_panel_enabled(&self, enabled: bool) -> Result<(), AppError> {
        let mut config = self.load_config();
        config.debug_panel_enabled = Some(enabled);
        self.save_config(&config)
    }

    pub fn set_show_selection_preview(&self, enabled: bool) -> Result<(), AppError> {
        let mut config = self.load_config();
        config.show_selection_preview = enabled;
        self.save_config(&config)
    }

    fn save_json<T: Serialize>(&self, path: &Path, value: &T, label: &str) -> Result<(), AppError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| AppError::Storage(format!("创建数据目录失败: {}", e)))?;
        let content = serde_json::to_string_pretty(value)
            .map_err(|e| AppError::Storage(format!("序列化{}失败: {}", label, e)))?;
        fs::write(path, content)?;
        Ok(())
    }
}

fn load_json_or_default<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    if !path.exists() {
        return T::default();
    }

    match fs::read_to_string(path) {
        Ok(content) => {
            if content.trim().is_empty() {
                return T::default();
            }
            match serde_json::from_str(&content) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("⚠️ 解析{}失败，使用默认值：{}", label, e);
                    T::default()
                }
            }
        }
        Err(e) => {
            log::warn!("⚠️ 读取{}失败，使用默认值：{}", label, e);
            T::default()
        }
    }
}
