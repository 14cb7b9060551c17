//! 命令行配置文件.
//!
//! JSON 格式, 所有字段可省略:
//!
//! ```json
//! {
//!   "logging": { "level": "debug", "directory": "logs" },
//!   "decode": { "prefetch_blocks": 2, "tolerance": 0.0001 }
//! }
//! ```

use anyhow::{Context, Result};
use liu::SourceOptions;
use liu::codec::SeekTolerance;
use liu::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub decode: DecodeProfile,
}

/// 覆盖解码器默认值的解码参数
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize, Serialize)]
pub struct DecodeProfile {
    /// 定位预解码块数
    #[serde(default)]
    pub prefetch_blocks: Option<u64>,
    /// 定位一致性容差, 0 表示逐位一致
    #[serde(default)]
    pub tolerance: Option<f32>,
}

impl DecodeProfile {
    pub fn seek_tolerance(&self) -> Option<SeekTolerance> {
        self.tolerance.map(|max_error| {
            if max_error > 0.0 {
                SeekTolerance::Within(max_error)
            } else {
                SeekTolerance::Exact
            }
        })
    }

    /// 把配置叠加到打开选项上
    pub fn apply(&self, mut options: SourceOptions) -> SourceOptions {
        if let Some(prefetch_blocks) = self.prefetch_blocks {
            options.prefetch_blocks = Some(prefetch_blocks);
        }
        if let Some(tolerance) = self.seek_tolerance() {
            options.tolerance = Some(tolerance);
        }
        options
    }
}

/// 加载配置文件, 未指定时使用默认配置
pub fn load(path: Option<&Path>) -> Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("读取配置文件失败, path={}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("解析配置文件失败, path={}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_加载配置文件() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("liu.json");
        std::fs::write(
            &path,
            r#"{"logging": {"level": "debug"}, "decode": {"prefetch_blocks": 4}}"#,
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file_prefix, "liu");
        assert_eq!(config.decode.prefetch_blocks, Some(4));
        assert_eq!(config.decode.tolerance, None);
    }

    #[test]
    fn test_未指定配置文件() {
        assert_eq!(load(None).unwrap(), CliConfig::default());
    }

    #[test]
    fn test_配置文件格式错误() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, "{").unwrap();
        assert!(load(Some(&path)).is_err());
    }

    #[test]
    fn test_解码参数覆盖选项() {
        let profile = DecodeProfile {
            prefetch_blocks: Some(0),
            tolerance: Some(0.01),
        };
        let options = profile.apply(SourceOptions::tabled().with_prefetch_blocks(3));
        assert_eq!(options.prefetch_blocks, Some(0));
        assert_eq!(options.tolerance, Some(SeekTolerance::Within(0.01)));

        let exact = DecodeProfile {
            prefetch_blocks: None,
            tolerance: Some(0.0),
        };
        let options = exact.apply(SourceOptions::fixed().with_prefetch_blocks(3));
        assert_eq!(options.prefetch_blocks, Some(3));
        assert_eq!(options.tolerance, Some(SeekTolerance::Exact));
    }
}
