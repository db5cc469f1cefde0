/*
 * @Author       : 老董
 * @Date         : 2026-01-17
 * @Description  : Linear (全连接) 层
 *
 * PyTorch 风格的全连接层：`output = x @ W + b`
 * - 输入：[batch_size, in_features]
 * - 权重：[in_features, out_features]
 * - 偏置：[out_features]（可选）
 * - 输出：[batch_size, out_features]
 */

use rand::rngs::StdRng;

use super::{TraitLayer, check_upstream_shape, not_forwarded};
use crate::nn::{GraphError, Init, LayerDescriptor};
use crate::tensor::Tensor;

/// Linear (全连接) 层
#[derive(Debug, Clone)]
pub struct Linear {
    name: String,
    weights: Tensor,
    bias: Option<Tensor>,
    weights_grad: Tensor,
    bias_grad: Option<Tensor>,
    input: Option<Tensor>,
}

impl Linear {
    /// 以给定的权重和偏置创建 Linear 层
    pub fn new(name: &str, weights: Tensor, bias: Option<Tensor>) -> Result<Self, GraphError> {
        if weights.dimension() != 2 {
            return Err(GraphError::ShapeMismatch {
                expected: vec![0, 0],
                got: weights.shape().to_vec(),
                message: format!("{name}的权重必须是 2D [in_features, out_features]"),
            });
        }
        let out_features = weights.shape()[1];
        if let Some(b) = &bias {
            if b.shape() != [out_features] {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![out_features],
                    got: b.shape().to_vec(),
                    message: format!("{name}的偏置长度须等于输出特征维度"),
                });
            }
        }

        let weights_grad = Tensor::zeros(weights.shape());
        let bias_grad = bias.as_ref().map(|b| Tensor::zeros(b.shape()));
        Ok(Self {
            name: name.to_string(),
            weights,
            bias,
            weights_grad,
            bias_grad,
            input: None,
        })
    }

    /// 创建新的 Linear 层：权重 Kaiming 初始化，偏置零初始化
    pub fn init(
        name: &str,
        in_features: usize,
        out_features: usize,
        use_bias: bool,
        rng: &mut StdRng,
    ) -> Result<Self, GraphError> {
        let weights = Init::Kaiming.generate_with_rng(&[in_features, out_features], rng);
        let bias = use_bias.then(|| Tensor::zeros(&[out_features]));
        Self::new(name, weights, bias)
    }

    pub const fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub const fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    pub fn in_features(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn out_features(&self) -> usize {
        self.weights.shape()[1]
    }
}

impl TraitLayer for Linear {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, GraphError> {
        if input.dimension() != 2 || input.shape()[1] != self.in_features() {
            return Err(GraphError::ShapeMismatch {
                expected: vec![0, self.in_features()],
                got: input.shape().to_vec(),
                message: format!(
                    "{}的输入必须是 [batch, {}]，卷积特征请先经过 Flatten",
                    self.name,
                    self.in_features()
                ),
            });
        }

        let mut output = input.mat_mul(&self.weights);
        if let Some(bias) = &self.bias {
            // 偏置按行广播
            for b in 0..output.shape()[0] {
                for j in 0..self.out_features() {
                    output[[b, j]] += bias[[j]];
                }
            }
        }
        self.input = Some(input.clone());
        Ok(output)
    }

    /// - dL/dx = g @ W^T
    /// - dL/dW = x^T @ g
    /// - dL/db = sum(g, axis=0)
    fn backward(&mut self, upstream_grad: &Tensor) -> Result<Tensor, GraphError> {
        let input = self.input.as_ref().ok_or_else(|| not_forwarded(&self.name))?;
        let expected = [input.shape()[0], self.out_features()];
        check_upstream_shape(&self.name, &expected, upstream_grad)?;

        self.weights_grad += &input.transpose().mat_mul(upstream_grad);
        if let Some(bias_grad) = self.bias_grad.as_mut() {
            *bias_grad += &upstream_grad.sum_axis(0)?;
        }
        Ok(upstream_grad.mat_mul(&self.weights.transpose()))
    }

    fn zero_grad(&mut self) {
        self.weights_grad = Tensor::zeros(self.weights.shape());
        if let Some(bias) = &self.bias {
            self.bias_grad = Some(Tensor::zeros(bias.shape()));
        }
    }

    fn parameters(&self) -> Vec<&Tensor> {
        std::iter::once(&self.weights).chain(self.bias.as_ref()).collect()
    }

    fn grads(&self) -> Vec<&Tensor> {
        std::iter::once(&self.weights_grad)
            .chain(self.bias_grad.as_ref())
            .collect()
    }

    fn describe(&self) -> LayerDescriptor {
        LayerDescriptor::Linear {
            name: self.name.clone(),
            in_features: self.in_features(),
            out_features: self.out_features(),
            use_bias: self.bias.is_some(),
            weights: Some(self.weights.to_vec()),
            bias: self.bias.as_ref().map(Tensor::to_vec),
        }
    }
}
