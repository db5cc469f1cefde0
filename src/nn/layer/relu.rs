use super::{TraitLayer, check_upstream_shape, not_forwarded};
use crate::nn::{GraphError, LayerDescriptor};
use crate::tensor::Tensor;

/// ReLU 激活层（整流单元）
///
/// forward: f(x) = x if x > 0, else 0
/// backward: d(f)/dx = 1 if x > 0, else 0
#[derive(Debug, Clone)]
pub struct ReLU {
    name: String,
    /// 缓存输入（用于反向传播时判断梯度）
    input: Option<Tensor>,
}

impl ReLU {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input: None,
        }
    }
}

impl TraitLayer for ReLU {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_rectifier(&self) -> bool {
        true
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, GraphError> {
        let output = input.where_with_f32(|x| x > 0.0, |x| x, |_| 0.0);
        self.input = Some(input.clone());
        Ok(output)
    }

    fn backward(&mut self, upstream_grad: &Tensor) -> Result<Tensor, GraphError> {
        let input = self.input.as_ref().ok_or_else(|| not_forwarded(&self.name))?;
        check_upstream_shape(&self.name, input.shape(), upstream_grad)?;

        let local_grad = input.where_with_f32(|x| x > 0.0, |_| 1.0, |_| 0.0);
        Ok(upstream_grad * &local_grad)
    }

    fn describe(&self) -> LayerDescriptor {
        LayerDescriptor::ReLU {
            name: self.name.clone(),
        }
    }
}
