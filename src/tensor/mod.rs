/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @Description  : 张量（Tensor）：本库所有数值计算的载体，底层为`ndarray`的动态维数组。
 *                 约定图像张量为通道优先（channel-first），即[C, H, W]或[batch, C, H, W]
 */

use ndarray::{Array, IxDyn};
use rand::Rng;
use rand::rngs::StdRng;

use crate::errors::TensorError;

mod ops {
    pub mod add;
    pub mod index;
    pub mod mat_mul;
    pub mod mul;
    pub mod reduce;
    pub mod sub;
}

mod filter;
mod image;
mod property;
mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]、[1,1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等，否则panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        let expected_len = shape.iter().product::<usize>();
        assert!(
            data.len() == expected_len,
            "{}",
            TensorError::DataShapeMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
            }
        );
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec())
            .unwrap_or_else(|_| panic!("{}", TensorError::IncompatibleShape));
        Self { data }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: Array::ones(IxDyn(shape)),
        }
    }

    /// 创建一个所有元素均为`value`的张量
    pub fn full(value: f32, shape: &[usize]) -> Self {
        Self {
            data: Array::from_elem(IxDyn(shape), value),
        }
    }

    /// 创建一个独热（one-hot）张量：形状为`shape`，展平后第`index`个元素为1，其余为0。
    /// `index`须在[0, 元素个数)内，否则panic。
    pub fn one_hot(index: usize, shape: &[usize]) -> Self {
        let mut data = vec![0.0; shape.iter().product()];
        let len = data.len();
        assert!(
            index < len,
            "{}",
            TensorError::IndexOutOfRange {
                index,
                axis: 0,
                len,
            }
        );
        data[index] = 1.0;
        Self::new(&data, shape)
    }

    /// 使用指定的随机数生成器创建一个服从正态分布的随机张量（Box-Muller变换）
    pub fn normal_with_rng(mean: f32, std_dev: f32, shape: &[usize], rng: &mut StdRng) -> Self {
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1: f32 = rng.gen_range(f32::EPSILON..1.0);
            let u2: f32 = rng.gen_range(0.0..1.0);
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Self::new(&data, shape)
    }

    pub(crate) const fn from_array(data: Array<f32, IxDyn>) -> Self {
        Self { data }
    }
}
