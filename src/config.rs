use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// 匹配参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// 应税金额容差
    pub taxable_tolerance: BigDecimal,
    /// IGST / CGST / SGST 容差
    pub tax_tolerance: BigDecimal,
    /// 名称相似度阈值 (严格大于)
    pub name_similarity_threshold: f64,
    /// 短名称剪枝: 长度差超过该值则跳过
    pub prune_length_gap: usize,
    /// 短名称剪枝: 仅对长度小于该值的名称生效
    pub prune_short_name_len: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            taxable_tolerance: BigDecimal::from(5),
            tax_tolerance: BigDecimal::from(2),
            name_similarity_threshold: 0.85,
            prune_length_gap: 5,
            prune_short_name_len: 10,
        }
    }
}

/// 输出参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            file_prefix: "GST_Reco".to_string(),
        }
    }
}

impl AppConfig {
    /// 加载配置: 默认值 -> 配置文件 -> 环境变量 (RECO_MATCHING__TAX_TOLERANCE=3)
    ///
    /// 未指定文件时尝试读取当前目录下可选的 `reco.toml`。
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name("reco").required(false),
        };

        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("RECO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
