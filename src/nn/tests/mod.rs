mod hook;

use crate::nn::{Layer, TraitLayer};
use crate::tensor::Tensor;

/// 用中心差分估计`sum(layer(x) * upstream)`对`x`的梯度
fn numeric_input_grad(layer: &mut Layer, x: &Tensor, upstream: &Tensor) -> Tensor {
    let eps = 1e-2;
    let flat = x.to_vec();
    let mut grad = vec![0.0; flat.len()];
    for i in 0..flat.len() {
        let mut plus = flat.clone();
        plus[i] += eps;
        let mut minus = flat.clone();
        minus[i] -= eps;
        let f_plus = (&layer.forward(&Tensor::new(&plus, x.shape())).unwrap() * upstream).sum();
        let f_minus = (&layer.forward(&Tensor::new(&minus, x.shape())).unwrap() * upstream).sum();
        grad[i] = (f_plus - f_minus) / (2.0 * eps);
    }
    Tensor::new(&grad, x.shape())
}

/// 解析梯度与数值梯度逐元素比较
fn assert_grad_close(analytic: &Tensor, numeric: &Tensor, epsilon: f32) {
    assert_eq!(analytic.shape(), numeric.shape());
    for (a, n) in analytic.to_vec().iter().zip(numeric.to_vec()) {
        approx::assert_abs_diff_eq!(*a, n, epsilon = epsilon);
    }
}
