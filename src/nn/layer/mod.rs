/*
 * @Author       : 老董
 * @Date         : 2025-12-22
 * @Description  : Layer 模块 - 顺序网络中的各类层
 *
 * 每个层自己缓存前向传播所需的中间量，反向传播采用 VJP 模式：
 * 输入上游梯度（对本层输出的梯度），返回对本层输入的梯度，并累加参数梯度。
 * 所有图像类张量均为 Batch-First 格式 [batch, C, H, W]。
 */

mod conv2d;
mod flatten;
mod linear;
mod max_pool2d;
mod relu;

pub use conv2d::Conv2d;
pub use flatten::Flatten;
pub use linear::Linear;
pub use max_pool2d::MaxPool2d;
pub use relu::ReLU;

use enum_dispatch::enum_dispatch;

use super::{GraphError, LayerDescriptor};
use crate::tensor::Tensor;

#[enum_dispatch]
pub trait TraitLayer {
    fn name(&self) -> &str;

    /// 是否为整流单元（ReLU）。引导反向传播只改写这类层的梯度
    fn is_rectifier(&self) -> bool {
        false
    }

    /// 根据输入计算本层输出，并缓存反向传播所需的中间量
    fn forward(&mut self, input: &Tensor) -> Result<Tensor, GraphError>;

    /// 根据上游梯度计算对本层输入的梯度；若本层有参数，则将参数梯度累加到内部
    fn backward(&mut self, upstream_grad: &Tensor) -> Result<Tensor, GraphError>;

    /// 将累加的参数梯度清零
    fn zero_grad(&mut self) {}

    fn parameters(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    /// 与`parameters()`一一对应的累加梯度
    fn grads(&self) -> Vec<&Tensor> {
        Vec::new()
    }

    fn describe(&self) -> LayerDescriptor;
}

/// 顺序网络中的一层
#[enum_dispatch(TraitLayer)]
#[derive(Debug, Clone)]
pub enum Layer {
    Conv2d,
    ReLU,
    MaxPool2d,
    Flatten,
    Linear,
}

/// 校验上游梯度形状与本层上一次前向输出的形状一致
pub(in crate::nn) fn check_upstream_shape(
    layer_name: &str,
    expected: &[usize],
    upstream_grad: &Tensor,
) -> Result<(), GraphError> {
    if upstream_grad.shape() == expected {
        Ok(())
    } else {
        Err(GraphError::ShapeMismatch {
            expected: expected.to_vec(),
            got: upstream_grad.shape().to_vec(),
            message: format!("{layer_name}的上游梯度形状须与其前向输出一致"),
        })
    }
}

pub(in crate::nn) fn not_forwarded(layer_name: &str) -> GraphError {
    GraphError::ComputationError(format!("{layer_name}尚未执行前向传播，无法反向传播"))
}
