/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @Description  : 张量的乘法，实现了张量与纯数的乘法以及两个张量“逐元素”相乘的运算，并返回一个新的张量。
 *                 注意：这里的乘法概念与线性代数中的矩阵乘法不同，其更类似于哈达玛积（Hadamard product）与数乘的结合。
 *                 矩阵乘法见`mat_mul`。
 */

use super::add::assert_same_shape;
use crate::errors::Operator;
use crate::tensor::Tensor;
use std::ops::{Div, Mul};

impl Mul for &Tensor {
    type Output = Tensor;

    fn mul(self, other: &Tensor) -> Tensor {
        assert_same_shape(self, other, Operator::Mul);
        Tensor::from_array(&self.data * &other.data)
    }
}

impl Mul<f32> for &Tensor {
    type Output = Tensor;

    fn mul(self, scalar: f32) -> Tensor {
        Tensor::from_array(&self.data * scalar)
    }
}

impl Div<f32> for &Tensor {
    type Output = Tensor;

    fn div(self, scalar: f32) -> Tensor {
        Tensor::from_array(&self.data / scalar)
    }
}
