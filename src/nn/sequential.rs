/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 顺序网络：按声明顺序前向、逆序反向，途中触发注册表中的观察者
 */

use super::hook::{ForwardEvent, HookRegistry};
use super::layer::{Layer, TraitLayer};
use super::{GraphError, Network};
use crate::tensor::Tensor;

/// 顺序网络（层序列）
#[derive(Debug, Clone, Default)]
pub struct Sequential {
    layers: Vec<Layer>,
}

impl Sequential {
    pub fn new() -> Self {
        Self::default()
    }

    /// 链式追加一层
    ///
    /// ```ignore
    /// let net = Sequential::new()
    ///     .with(Conv2d::init("conv1", 3, 8, (3, 3), (1, 1), (1, 1), true, &mut rng)?)
    ///     .with(ReLU::new("relu1"))
    ///     .with(Flatten::new("flatten"));
    /// ```
    #[must_use]
    pub fn with(mut self, layer: impl Into<Layer>) -> Self {
        self.add(layer);
        self
    }

    pub fn add(&mut self, layer: impl Into<Layer>) {
        self.layers.push(layer.into());
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Network for Sequential {
    fn features(&self) -> &[Layer] {
        &self.layers
    }

    fn forward_hooked<C, E: From<GraphError>>(
        &mut self,
        input: &Tensor,
        hooks: &HookRegistry<C, E>,
        ctx: &mut C,
    ) -> Result<Tensor, E> {
        let mut x = input.clone();
        for (unit, layer) in self.layers.iter_mut().enumerate() {
            let output = layer.forward(&x)?;
            let event = ForwardEvent {
                unit,
                layer_name: layer.name(),
                input: &x,
                output: &output,
            };
            hooks.fire_forward(&event, ctx)?;
            x = output;
        }
        Ok(x)
    }

    fn backward_hooked<C, E: From<GraphError>>(
        &mut self,
        seed_grad: &Tensor,
        hooks: &HookRegistry<C, E>,
        ctx: &mut C,
    ) -> Result<Tensor, E> {
        let mut grad = seed_grad.clone();
        for (unit, layer) in self.layers.iter_mut().enumerate().rev() {
            let grad_input = layer.backward(&grad)?;
            grad = hooks.fire_backward(unit, layer.name(), grad_input, &grad, ctx)?;
        }
        Ok(grad)
    }

    fn zero_grad(&mut self) {
        for layer in &mut self.layers {
            layer.zero_grad();
        }
    }
}
