//! # 选区中继库 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    面板 (webview UI)                      │
//! │                                                          │
//! │  文档信息 ── 选区预览 ── 出图上传 ── 配置读写            │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ 跨边界调用 (Result<T, AppError>)
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕           选区中继 (Rust)                        │
//! │                                                          │
//! │  ┌─ error ────── AppError (统一错误类型)                  │
//! │  │                                                       │
//! │  ├─ service ──── 流水线编排（文档 → 规划 → 取图 → 合成）  │
//! │  │                                                       │
//! │  ├─ host ─────── 宿主成像接口 seam（嵌入方实现）          │
//! │  │                                                       │
//! │  ├─ pixel ────── 归一化·伽马·色相·蒙版合成·降采样规划     │
//! │  │                                                       │
//! │  ├─ export ───── 白底压平·JPEG/PNG 编码·令牌上传          │
//! │  │                                                       │
//! │  ├─ provider ── Provider Key 单飞 TTL 缓存                │
//! │  ├─ settings ── 全局配置 / 处理状态 JSON 持久化           │
//! │  └─ notify ──── 服务商变更旁路通知（永不报错）            │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，所有服务入口的返回类型 |
//! | [`host`] | 宿主成像接口：文档、选区边界、像素/蒙版缓冲读取 |
//! | [`pixel`] | 采样归一化、sRGB 伽马、色相旋转、蒙版合成、降采样规划 |
//! | [`export`] | 压白底编码 JPEG/PNG、令牌换取与多部分表单上传 |
//! | [`provider`] | Provider Key 的单飞 TTL 缓存客户端 |
//! | [`settings`] | 全局配置与处理状态的容错 JSON 落盘 |
//! | [`notify`] | 服务商变更的尽力而为通知，失败降级不报错 |
//! | [`service`] | `SelectionRelayService` 流程编排与阶段耗时日志 |

pub mod error;
pub mod export;
pub mod host;
pub mod notify;
pub mod pixel;
pub mod provider;
pub mod service;
pub mod settings;
