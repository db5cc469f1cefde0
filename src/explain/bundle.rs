use std::collections::BTreeMap;

use super::normalize::{convert_to_grayscale, normalize, positive_negative_saliency};
use super::{ExplainError, GrayscaleReduction};
use crate::tensor::Tensor;

/// 技术名 -> 结果图 的映射，聚合多种解释技术时按键合并
pub type ExplanationMap = BTreeMap<String, Tensor>;

pub const COLOR_GUIDED_GRADS: &str = "color_guided_grads";
pub const GRAYSCALE_GUIDED_GRADS: &str = "grayscale_guided_grads";
pub const POSITIVE_SALIENCY_MAPS: &str = "positive_saliency_maps";
pub const NEGATIVE_SALIENCY_MAPS: &str = "negative_saliency_maps";

pub const VANILLA_COLOR_GRADS: &str = "vanilla_color_grads";
pub const VANILLA_GRAYSCALE_GRADS: &str = "vanilla_grayscale_grads";

/// 一次引导反向传播的四张结果图，各自独立归一化到[0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct GuidedGradients {
    /// [C, H, W]
    pub color_guided_grads: Tensor,
    /// [1, H, W]
    pub grayscale_guided_grads: Tensor,
    /// [C, H, W]
    pub positive_saliency_maps: Tensor,
    /// [C, H, W]
    pub negative_saliency_maps: Tensor,
}

impl GuidedGradients {
    /// 由[C, H, W]的原始梯度生成四张结果图
    pub fn from_gradient(
        gradient: &Tensor,
        reduction: GrayscaleReduction,
    ) -> Result<Self, ExplainError> {
        let grayscale = convert_to_grayscale(gradient, reduction)?;
        let (positive, negative) = positive_negative_saliency(gradient);
        Ok(Self {
            color_guided_grads: normalize(gradient),
            grayscale_guided_grads: normalize(&grayscale),
            positive_saliency_maps: normalize(&positive),
            negative_saliency_maps: normalize(&negative),
        })
    }

    pub fn into_map(self) -> ExplanationMap {
        ExplanationMap::from([
            (COLOR_GUIDED_GRADS.to_string(), self.color_guided_grads),
            (GRAYSCALE_GUIDED_GRADS.to_string(), self.grayscale_guided_grads),
            (POSITIVE_SALIENCY_MAPS.to_string(), self.positive_saliency_maps),
            (NEGATIVE_SALIENCY_MAPS.to_string(), self.negative_saliency_maps),
        ])
    }
}

/// 普通反向传播的两张结果图
#[derive(Debug, Clone, PartialEq)]
pub struct VanillaGradients {
    pub color_grads: Tensor,
    pub grayscale_grads: Tensor,
}

impl VanillaGradients {
    pub fn from_gradient(
        gradient: &Tensor,
        reduction: GrayscaleReduction,
    ) -> Result<Self, ExplainError> {
        let grayscale = convert_to_grayscale(gradient, reduction)?;
        Ok(Self {
            color_grads: normalize(gradient),
            grayscale_grads: normalize(&grayscale),
        })
    }

    pub fn into_map(self) -> ExplanationMap {
        ExplanationMap::from([
            (VANILLA_COLOR_GRADS.to_string(), self.color_grads),
            (VANILLA_GRAYSCALE_GRADS.to_string(), self.grayscale_grads),
        ])
    }
}
