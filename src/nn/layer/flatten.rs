use super::{TraitLayer, check_upstream_shape, not_forwarded};
use crate::nn::{GraphError, LayerDescriptor};
use crate::tensor::Tensor;

/// 展平层：[batch, d1, d2, ...] -> [batch, d1*d2*...]
#[derive(Debug, Clone)]
pub struct Flatten {
    name: String,
    input_shape: Option<Vec<usize>>,
}

impl Flatten {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input_shape: None,
        }
    }
}

impl TraitLayer for Flatten {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, GraphError> {
        let shape = input.shape();
        if shape.is_empty() {
            return Err(GraphError::InvalidOperation(format!(
                "{}的输入至少需要1个（批）维度",
                self.name
            )));
        }
        let batch_size = shape[0];
        let features = shape[1..].iter().product::<usize>();
        self.input_shape = Some(shape.to_vec());
        Ok(input.reshape(&[batch_size, features]))
    }

    fn backward(&mut self, upstream_grad: &Tensor) -> Result<Tensor, GraphError> {
        let input_shape = self
            .input_shape
            .as_ref()
            .ok_or_else(|| not_forwarded(&self.name))?;
        let expected = [input_shape[0], input_shape[1..].iter().product::<usize>()];
        check_upstream_shape(&self.name, &expected, upstream_grad)?;
        Ok(upstream_grad.reshape(input_shape))
    }

    fn describe(&self) -> LayerDescriptor {
        LayerDescriptor::Flatten {
            name: self.name.clone(),
        }
    }
}
