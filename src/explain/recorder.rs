use super::ExplainError;
use crate::tensor::Tensor;

/// 整流单元前向输出的记录栈（后进先出）
///
/// 前向传播时每经过一个整流单元就压入其输出；反向传播逆序经过这些单元，
/// 故每次弹出的恰好是当前单元的记录。一次完整的前向+反向传播后栈应为空。
#[derive(Debug, Clone, Default)]
pub struct ActivationRecorder {
    stack: Vec<Tensor>,
}

impl ActivationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, activation: Tensor) {
        self.stack.push(activation);
    }

    /// 弹出最近一条记录；栈为空时返回`EmptyStack`
    pub fn consume_last(&mut self) -> Result<Tensor, ExplainError> {
        self.stack.pop().ok_or(ExplainError::EmptyStack)
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// 激活的0/1存在掩码：输出大于0处为1，否则为0
pub fn presence_mask(activation: &Tensor) -> Tensor {
    activation.where_with_f32(|x| x > 0.0, |_| 1.0, |_| 0.0)
}
