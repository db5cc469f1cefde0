/*
 * @Author       : 老董
 * @Date         : 2026-01-08
 * @Description  : 参数初始化策略
 */

use crate::tensor::Tensor;
use rand::rngs::StdRng;

/// 参数初始化策略
#[derive(Debug, Clone, PartialEq)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`）
    Kaiming,
}

impl Init {
    /// 生成初始化后的 Tensor（使用指定的 RNG）
    ///
    /// Kaiming 的 fan_in：卷积核`[C_out, C_in, kH, kW]`取`C_in*kH*kW`，
    /// 线性层权重`[in, out]`取`in`
    pub fn generate_with_rng(&self, shape: &[usize], rng: &mut StdRng) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::full(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Kaiming => {
                let fan_in = match shape {
                    [_, rest @ ..] if shape.len() == 4 => rest.iter().product::<usize>(),
                    [fan_in, ..] => *fan_in,
                    [] => 1,
                };
                let std = (2.0 / fan_in.max(1) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
        }
    }
}
