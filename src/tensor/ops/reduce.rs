use crate::errors::TensorError;
use crate::tensor::Tensor;
use ndarray::Axis;

impl Tensor {
    /// 所有元素之和
    pub fn sum(&self) -> f32 {
        self.data.sum()
    }

    /// 所有元素中的最大值；空张量返回`f32::NEG_INFINITY`
    pub fn max_value(&self) -> f32 {
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    /// 所有元素中的最小值；空张量返回`f32::INFINITY`
    pub fn min_value(&self) -> f32 {
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// 沿第`axis`维求和，结果会少一个维度
    pub fn sum_axis(&self, axis: usize) -> Result<Self, TensorError> {
        self.fold_axis(axis, 0.0, |acc, x| acc + x)
    }

    /// 沿第`axis`维折叠，结果会少一个维度。
    /// 如对[C, H, W]沿第0维取`|x|`的最大值，即得到[H, W]的单通道图
    pub fn fold_axis<F>(&self, axis: usize, init: f32, fold: F) -> Result<Self, TensorError>
    where
        F: Fn(f32, f32) -> f32,
    {
        let dimension = self.dimension();
        if axis >= dimension {
            return Err(TensorError::AxisOutOfRange { axis, dimension });
        }
        Ok(Self::from_array(
            self.data.fold_axis(Axis(axis), init, |&acc, &x| fold(acc, x)),
        ))
    }
}
