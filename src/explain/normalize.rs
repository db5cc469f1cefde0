/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 梯度的后处理：归一化、灰度化、正负显著性分解。均为无状态的纯函数
 */

use super::{ExplainError, GrayscaleReduction};
use crate::tensor::Tensor;

/// 最小-最大归一化到[0, 1]：`(x - min) / (max - min)`。
/// 所有元素相等（含空张量）或值域不是有限值时返回同形的全零张量。
/// 以f64计算，极端但有限的f32输入不会因`max - min`溢出而得到NaN
pub fn normalize(tensor: &Tensor) -> Tensor {
    let min = f64::from(tensor.min_value());
    let max = f64::from(tensor.max_value());
    let range = max - min;
    if !range.is_finite() || range <= 0.0 {
        return Tensor::zeros(tensor.shape());
    }
    tensor.map(|x| ((f64::from(x) - min) / range) as f32)
}

/// 把[C, H, W]的梯度沿通道维压缩为[1, H, W]
pub fn convert_to_grayscale(
    gradient: &Tensor,
    reduction: GrayscaleReduction,
) -> Result<Tensor, ExplainError> {
    if gradient.dimension() != 3 {
        return Err(ExplainError::InvalidInput(format!(
            "灰度化需要 [C, H, W] 的梯度，得到形状{:?}",
            gradient.shape()
        )));
    }
    let gray = match reduction {
        GrayscaleReduction::MaxAbs => gradient.fold_axis(0, 0.0, |acc, x| acc.max(x.abs()))?,
        GrayscaleReduction::SumAbs => gradient.fold_axis(0, 0.0, |acc, x| acc + x.abs())?,
    };
    Ok(gray.unsqueeze_first())
}

/// 分解为正、负显著性：`(max(g, 0), max(-g, 0))`，不做归一化
pub fn positive_negative_saliency(gradient: &Tensor) -> (Tensor, Tensor) {
    let positive = gradient.clamp_min(0.0);
    let negative = (-gradient).clamp_min(0.0);
    (positive, negative)
}
