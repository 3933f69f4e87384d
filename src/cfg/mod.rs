//! cfg 模块 - 配置管理
//!
//! 提供 `TypeOptions` 配置信封：`type` 选择驱动，`options` 为驱动自身的配置，
//! 支持 JSON5 / YAML / TOML 三种格式

pub mod type_options;

pub use type_options::TypeOptions;
