/*
 * @Author       : 老董
 * @Date         : 2025-12-27
 * @Description  : 网络描述符（Network Descriptor）
 *                 分类网络的可序列化描述，用于以 JSON 配置/保存/加载网络结构与权重
 */

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use super::layer::{Conv2d, Flatten, Layer, Linear, MaxPool2d, ReLU};
use super::{Classifier, GraphError, Sequential};
use crate::tensor::Tensor;

/// 分类网络的可序列化描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    /// 格式版本（用于向后兼容）
    pub version: String,
    /// 网络名称
    pub name: String,
    /// 特征提取部分（引导反向传播挂载观察者的层序列）
    pub features: Vec<LayerDescriptor>,
    /// 分类头部分
    #[serde(default)]
    pub classifier: Vec<LayerDescriptor>,
}

/// 层描述（包含类型特定参数）。
/// 带参数的层若未给出权重，则在构建时随机初始化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LayerDescriptor {
    Conv2d {
        name: String,
        in_channels: usize,
        out_channels: usize,
        kernel_size: (usize, usize),
        #[serde(default = "default_stride")]
        stride: (usize, usize),
        #[serde(default)]
        padding: (usize, usize),
        #[serde(default = "default_use_bias")]
        use_bias: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kernel: Option<Vec<f32>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bias: Option<Vec<f32>>,
    },
    ReLU {
        name: String,
    },
    MaxPool2d {
        name: String,
        kernel_size: (usize, usize),
        stride: (usize, usize),
    },
    Flatten {
        name: String,
    },
    Linear {
        name: String,
        in_features: usize,
        out_features: usize,
        #[serde(default = "default_use_bias")]
        use_bias: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        weights: Option<Vec<f32>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bias: Option<Vec<f32>>,
    },
}

const fn default_stride() -> (usize, usize) {
    (1, 1)
}

const fn default_use_bias() -> bool {
    true
}

impl NetworkDescriptor {
    pub fn new(name: &str, features: Vec<LayerDescriptor>, classifier: Vec<LayerDescriptor>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            name: name.to_string(),
            features,
            classifier,
        }
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 构建分类网络；未给出权重的层使用以`seed`为种子的 RNG 初始化
    pub fn build(&self, seed: u64) -> Result<Classifier, GraphError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let features = build_sequential(&self.features, &mut rng)?;
        let classifier = build_sequential(&self.classifier, &mut rng)?;
        tracing::debug!(
            network = %self.name,
            features = features.len(),
            classifier = classifier.len(),
            "根据描述符构建网络"
        );
        Ok(Classifier::new(features, classifier))
    }
}

fn build_sequential(
    descriptors: &[LayerDescriptor],
    rng: &mut StdRng,
) -> Result<Sequential, GraphError> {
    let mut sequential = Sequential::new();
    for descriptor in descriptors {
        sequential.add(descriptor.build(rng)?);
    }
    Ok(sequential)
}

impl LayerDescriptor {
    pub fn name(&self) -> &str {
        match self {
            Self::Conv2d { name, .. }
            | Self::ReLU { name }
            | Self::MaxPool2d { name, .. }
            | Self::Flatten { name }
            | Self::Linear { name, .. } => name.as_str(),
        }
    }

    /// 根据描述构建一层
    pub fn build(&self, rng: &mut StdRng) -> Result<Layer, GraphError> {
        let layer = match self {
            Self::Conv2d {
                name,
                in_channels,
                out_channels,
                kernel_size,
                stride,
                padding,
                use_bias,
                kernel,
                bias,
            } => {
                let mut conv = Conv2d::init(
                    name,
                    *in_channels,
                    *out_channels,
                    *kernel_size,
                    *stride,
                    *padding,
                    *use_bias,
                    rng,
                )?;
                if kernel.is_some() || bias.is_some() {
                    let (k_h, k_w) = *kernel_size;
                    let kernel = match kernel {
                        Some(data) => {
                            param_tensor(name, data, &[*out_channels, *in_channels, k_h, k_w])?
                        }
                        None => conv.kernel().clone(),
                    };
                    let bias = match (bias, use_bias) {
                        (Some(data), true) => Some(param_tensor(name, data, &[*out_channels])?),
                        (None, true) => conv.bias().cloned(),
                        (Some(_), false) => {
                            return Err(GraphError::InvalidOperation(format!(
                                "{name}声明了use_bias=false，却给出了偏置"
                            )));
                        }
                        (None, false) => None,
                    };
                    conv = Conv2d::new(name, kernel, bias, *stride, *padding)?;
                }
                Layer::from(conv)
            }
            Self::ReLU { name } => Layer::from(ReLU::new(name)),
            Self::MaxPool2d {
                name,
                kernel_size,
                stride,
            } => Layer::from(MaxPool2d::new(name, *kernel_size, Some(*stride))?),
            Self::Flatten { name } => Layer::from(Flatten::new(name)),
            Self::Linear {
                name,
                in_features,
                out_features,
                use_bias,
                weights,
                bias,
            } => {
                let mut linear = Linear::init(name, *in_features, *out_features, *use_bias, rng)?;
                if weights.is_some() || bias.is_some() {
                    let weights = match weights {
                        Some(data) => param_tensor(name, data, &[*in_features, *out_features])?,
                        None => linear.weights().clone(),
                    };
                    let bias = match (bias, use_bias) {
                        (Some(data), true) => Some(param_tensor(name, data, &[*out_features])?),
                        (None, true) => linear.bias().cloned(),
                        (Some(_), false) => {
                            return Err(GraphError::InvalidOperation(format!(
                                "{name}声明了use_bias=false，却给出了偏置"
                            )));
                        }
                        (None, false) => None,
                    };
                    linear = Linear::new(name, weights, bias)?;
                }
                Layer::from(linear)
            }
        };
        Ok(layer)
    }
}

fn param_tensor(layer_name: &str, data: &[f32], shape: &[usize]) -> Result<Tensor, GraphError> {
    let expected_len = shape.iter().product::<usize>();
    if data.len() != expected_len {
        return Err(GraphError::ShapeMismatch {
            expected: shape.to_vec(),
            got: vec![data.len()],
            message: format!("{layer_name}的参数个数与声明的形状不符"),
        });
    }
    Ok(Tensor::new(data, shape))
}
