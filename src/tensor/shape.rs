use super::Tensor;
use crate::errors::TensorError;
use ndarray::{Axis, Ix2};

impl Tensor {
    pub fn reshape(&self, shape: &[usize]) -> Self {
        let total_elements: usize = self.data.len();
        let new_total_elements: usize = shape.iter().product();
        assert!(
            total_elements == new_total_elements,
            "{}",
            TensorError::IncompatibleShape
        );
        Self::new(&self.to_vec(), shape)
    }

    /// 在最前面插入一个长度为1的维度，如[C, H, W] -> [1, C, H, W]
    pub fn unsqueeze_first(&self) -> Self {
        Self::from_array(self.data.clone().insert_axis(Axis(0)))
    }

    /// 沿第`axis`维取出第`index`个切片，返回的张量会少一个维度。
    /// 如对[1, C, H, W]调用`select(0, 0)`可去掉批维度，得到[C, H, W]
    pub fn select(&self, axis: usize, index: usize) -> Result<Self, TensorError> {
        let dimension = self.dimension();
        if axis >= dimension {
            return Err(TensorError::AxisOutOfRange { axis, dimension });
        }
        let len = self.shape()[axis];
        if index >= len {
            return Err(TensorError::IndexOutOfRange { index, axis, len });
        }
        Ok(Self::from_array(
            self.data.index_axis(Axis(axis), index).to_owned(),
        ))
    }

    /// 2阶张量（矩阵）的转置；非2阶张量会panic
    pub fn transpose(&self) -> Self {
        let matrix = self
            .data
            .view()
            .into_dimensionality::<Ix2>()
            .unwrap_or_else(|_| panic!("转置需要2阶张量，得到形状{:?}", self.shape()));
        Self::from_array(matrix.t().to_owned().into_dyn())
    }
}
