/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 一次“前向 + 以独热向量为种子的反向”传播，并取回第一层捕获的输入梯度。
 *                 引导反向传播与普通反向传播共用，区别只在于安装的观察者
 */

use super::ExplainError;
use super::interceptor::{GradientInterceptor, InterceptMode, InterceptState};
use crate::nn::Network;
use crate::tensor::Tensor;

/// 控制器的生命周期：`Uninitialized`为安装观察者之前的状态，
/// 构造完成即为`Hooked`，每次生成结束后（无论成败）进入`Ready`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Hooked,
    Ready,
}

pub(super) struct BackpropSession<N: Network> {
    network: N,
    interceptor: GradientInterceptor,
    state: InterceptState,
    phase: ControllerState,
}

impl<N: Network> BackpropSession<N> {
    /// 观察者只在构造时安装一次
    pub(super) fn new(network: N, mode: InterceptMode) -> Result<Self, ExplainError> {
        let interceptor = GradientInterceptor::install(&network, mode)?;
        Ok(Self {
            network,
            interceptor,
            state: InterceptState::default(),
            phase: ControllerState::Hooked,
        })
    }

    pub(super) const fn phase(&self) -> ControllerState {
        self.phase
    }

    pub(super) const fn network(&self) -> &N {
        &self.network
    }

    pub(super) fn into_network(self) -> N {
        self.network
    }

    pub(super) const fn state(&self) -> &InterceptState {
        &self.state
    }

    pub(super) fn rectifier_units(&self) -> &[usize] {
        self.interceptor.rectifier_units()
    }

    /// 返回去掉批维度的[C, H, W]原始梯度。出错时清空激活记录与捕获槽位
    pub(super) fn generate_gradients(
        &mut self,
        image: &Tensor,
        target_class: usize,
    ) -> Result<Tensor, ExplainError> {
        let result = self.run(image, target_class);
        if result.is_err() {
            self.state.reset();
        }
        self.phase = ControllerState::Ready;
        result
    }

    fn run(&mut self, image: &Tensor, target_class: usize) -> Result<Tensor, ExplainError> {
        let hooks = self.interceptor.hooks();

        // 1. 每次生成都是独立的一轮
        self.state.reset();

        // 2. 前向传播，整流单元的输出被压入记录栈
        let input = batch_input(image)?;
        let scores = self.network.forward_hooked(&input, hooks, &mut self.state)?;

        // 3. 清零参数梯度
        self.network.zero_grad();

        // 4. 以目标类别的独热向量为种子
        let seed = one_hot_target(&scores, target_class)?;

        // 5. 反向传播，整流单元的梯度被改写，第一层的输入梯度被捕获
        self.network.backward_hooked(&seed, hooks, &mut self.state)?;

        // 6. 取回捕获的梯度
        let gradient = self.state.slot.take()?;

        // 7. 成对的前向+反向传播后记录栈必须为空
        if !self.state.recorder.is_empty() {
            return Err(ExplainError::UnbalancedStack {
                remaining: self.state.recorder.len(),
            });
        }

        // 8. 去掉批维度
        Ok(gradient.select(0, 0)?)
    }
}

/// 单张图像：[C, H, W]补上批维度，[1, C, H, W]原样使用，其余拒绝
fn batch_input(image: &Tensor) -> Result<Tensor, ExplainError> {
    match image.shape() {
        [_, _, _] => Ok(image.unsqueeze_first()),
        [1, _, _, _] => Ok(image.clone()),
        [batch, _, _, _] => Err(ExplainError::InvalidInput(format!(
            "一次只能解释一张图像，得到批大小{batch}"
        ))),
        shape => Err(ExplainError::InvalidInput(format!(
            "图像须为 [C, H, W] 或 [1, C, H, W]，得到形状{shape:?}"
        ))),
    }
}

/// 与网络输出[1, num_classes]同形的独热向量
fn one_hot_target(scores: &Tensor, target_class: usize) -> Result<Tensor, ExplainError> {
    let num_classes = match scores.shape() {
        [1, num_classes] => *num_classes,
        shape => {
            return Err(ExplainError::InvalidInput(format!(
                "网络输出须为 [1, num_classes]，得到形状{shape:?}"
            )));
        }
    };
    if target_class >= num_classes {
        return Err(ExplainError::OutOfRange {
            target_class,
            num_classes,
        });
    }
    Ok(Tensor::one_hot(target_class, scores.shape()))
}
