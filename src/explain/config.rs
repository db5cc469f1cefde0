use serde::{Deserialize, Serialize};

/// 把 [C, H, W] 的梯度压缩为单通道时，跨通道的归约方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrayscaleReduction {
    /// 各通道绝对值的最大值
    #[default]
    MaxAbs,
    /// 各通道绝对值之和
    SumAbs,
}

/// 引导反向传播的配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuidedBackpropConfig {
    pub grayscale: GrayscaleReduction,
}

impl GuidedBackpropConfig {
    pub const fn with_grayscale(grayscale: GrayscaleReduction) -> Self {
        Self { grayscale }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
