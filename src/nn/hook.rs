/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 层观察者（hook）注册表
 *
 * 观察者按层序列中的位置（unit）注册，分为前向与反向两类：
 * - 前向观察者在该层输出计算完毕后触发，只读；
 * - 反向观察者在该层算出“对输入的梯度”后触发，可返回`Some(新梯度)`替换继续向前传播的梯度。
 *
 * 注册表本身不持有任何可变状态：观察者需要改写的状态（上下文`C`）由调用方拥有，
 * 在每次前向/反向传播时以`&mut C`传入。同一层上的观察者按注册顺序触发，
 * 前一个反向观察者的替换结果即后一个观察者看到的梯度。
 */

use super::GraphError;
use crate::tensor::Tensor;

/// 前向观察者看到的事件
pub struct ForwardEvent<'a> {
    pub unit: usize,
    pub layer_name: &'a str,
    pub input: &'a Tensor,
    pub output: &'a Tensor,
}

/// 反向观察者看到的事件
pub struct BackwardEvent<'a> {
    pub unit: usize,
    pub layer_name: &'a str,
    /// 对本层输入的梯度（若之前有观察者替换过，则为替换后的值）
    pub grad_input: &'a Tensor,
    /// 对本层输出的梯度（即上游梯度）
    pub grad_output: &'a Tensor,
}

pub type ForwardHook<C, E> = Box<dyn Fn(&ForwardEvent<'_>, &mut C) -> Result<(), E>>;
pub type BackwardHook<C, E> = Box<dyn Fn(&BackwardEvent<'_>, &mut C) -> Result<Option<Tensor>, E>>;

/// 按层位置组织的观察者注册表
pub struct HookRegistry<C, E = GraphError> {
    forward: Vec<Vec<ForwardHook<C, E>>>,
    backward: Vec<Vec<BackwardHook<C, E>>>,
}

impl<C, E> HookRegistry<C, E> {
    /// 为含`num_units`层的层序列创建空注册表
    pub fn new(num_units: usize) -> Self {
        tracing::debug!(num_units, "创建观察者注册表");
        Self {
            forward: (0..num_units).map(|_| Vec::new()).collect(),
            backward: (0..num_units).map(|_| Vec::new()).collect(),
        }
    }

    pub fn num_units(&self) -> usize {
        self.forward.len()
    }

    /// 已注册的观察者总数（前向 + 反向）
    pub fn hook_count(&self) -> usize {
        let forward = self.forward.iter().map(Vec::len).sum::<usize>();
        let backward = self.backward.iter().map(Vec::len).sum::<usize>();
        forward + backward
    }

    pub fn on_forward<F>(&mut self, unit: usize, hook: F) -> Result<(), GraphError>
    where
        F: Fn(&ForwardEvent<'_>, &mut C) -> Result<(), E> + 'static,
    {
        let len = self.num_units();
        self.forward
            .get_mut(unit)
            .ok_or(GraphError::HookUnitOutOfRange { unit, len })?
            .push(Box::new(hook));
        Ok(())
    }

    pub fn on_backward<F>(&mut self, unit: usize, hook: F) -> Result<(), GraphError>
    where
        F: Fn(&BackwardEvent<'_>, &mut C) -> Result<Option<Tensor>, E> + 'static,
    {
        let len = self.num_units();
        self.backward
            .get_mut(unit)
            .ok_or(GraphError::HookUnitOutOfRange { unit, len })?
            .push(Box::new(hook));
        Ok(())
    }

    pub(in crate::nn) fn fire_forward(&self, event: &ForwardEvent<'_>, ctx: &mut C) -> Result<(), E> {
        for hook in self.forward.get(event.unit).into_iter().flatten() {
            tracing::trace!(unit = event.unit, layer = event.layer_name, "触发前向观察者");
            hook(event, ctx)?;
        }
        Ok(())
    }

    /// 依次触发`unit`上的反向观察者，返回最终继续向前传播的梯度
    pub(in crate::nn) fn fire_backward(
        &self,
        unit: usize,
        layer_name: &str,
        grad_input: Tensor,
        grad_output: &Tensor,
        ctx: &mut C,
    ) -> Result<Tensor, E> {
        let mut grad_input = grad_input;
        for hook in self.backward.get(unit).into_iter().flatten() {
            tracing::trace!(unit, layer = layer_name, "触发反向观察者");
            let event = BackwardEvent {
                unit,
                layer_name,
                grad_input: &grad_input,
                grad_output,
            };
            if let Some(replaced) = hook(&event, ctx)? {
                grad_input = replaced;
            }
        }
        Ok(grad_input)
    }
}
