/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 梯度解释（引导反向传播等）相关的错误类型
 */

use crate::errors::TensorError;
use crate::nn::GraphError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ExplainError {
    #[error("激活记录栈为空：整流单元的反向观察者触发时没有对应的前向记录")]
    EmptyStack,
    #[error("目标类别{target_class}超出范围，网络共有{num_classes}个类别")]
    OutOfRange {
        target_class: usize,
        num_classes: usize,
    },
    #[error("反向传播没有经过第一层，未捕获到对输入的梯度")]
    NoGradientCaptured,
    #[error("完整的前向+反向传播后，激活记录栈中仍剩{remaining}条记录")]
    UnbalancedStack { remaining: usize },
    #[error("无效输入：{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl From<TensorError> for ExplainError {
    fn from(err: TensorError) -> Self {
        Self::Graph(GraphError::from(err))
    }
}
