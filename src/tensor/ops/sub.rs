use super::add::assert_same_shape;
use crate::errors::Operator;
use crate::tensor::Tensor;
use std::ops::{Neg, Sub};

impl Sub for &Tensor {
    type Output = Tensor;

    fn sub(self, other: &Tensor) -> Tensor {
        assert_same_shape(self, other, Operator::Sub);
        Tensor::from_array(&self.data - &other.data)
    }
}

impl Sub<f32> for &Tensor {
    type Output = Tensor;

    fn sub(self, scalar: f32) -> Tensor {
        Tensor::from_array(&self.data - scalar)
    }
}

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        Tensor::from_array(-&self.data)
    }
}
