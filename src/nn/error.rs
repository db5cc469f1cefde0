/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @Description  : 网络（层序列）相关的错误类型
 */

use crate::errors::TensorError;
use thiserror::Error;

/// 网络构建、前向/反向传播以及观察者挂载时的错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("无效操作：{0}")]
    InvalidOperation(String),
    #[error("形状不匹配：期望{expected:?}，得到{got:?}。{message}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("计算错误：{0}")]
    ComputationError(String),
    #[error("观察者挂载位置{unit}超出层序列长度{len}")]
    HookUnitOutOfRange { unit: usize, len: usize },
    #[error(transparent)]
    Tensor(#[from] TensorError),
}
