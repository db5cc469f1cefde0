/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 梯度拦截器：在网络的声明层序列上安装观察者
 *
 * 引导模式下安装两类观察者：
 * 1. 每个整流单元（按声明顺序）：前向时把输出压入激活记录栈；
 *    反向时弹出对应记录，用`(输出 > 0) * max(梯度, 0)`替换继续向前传播的梯度；
 * 2. 第一层：反向时把对其输入的梯度（即对网络输入的梯度）写入单槽位。
 * 整流单元的观察者先注册，第一层的捕获观察者最后注册，
 * 因而第一层本身是整流单元时，捕获到的是改写后的梯度。
 */

use super::ExplainError;
use super::recorder::{ActivationRecorder, presence_mask};
use crate::nn::{GraphError, HookRegistry, Network};
use crate::tensor::Tensor;

/// 观察者在一次前向+反向传播中改写的全部状态，由控制器持有
#[derive(Debug, Default)]
pub struct InterceptState {
    pub recorder: ActivationRecorder,
    pub slot: GradientSlot,
}

impl InterceptState {
    /// 开始新一轮传播前调用
    pub fn reset(&mut self) {
        self.recorder.clear();
        self.slot.reset();
    }
}

/// 单槽位：保存第一层反向观察者捕获的梯度，每次反向传播都会覆盖
#[derive(Debug, Default)]
pub struct GradientSlot {
    value: Option<Tensor>,
}

impl GradientSlot {
    pub fn reset(&mut self) {
        self.value = None;
    }

    pub fn store(&mut self, gradient: Tensor) {
        self.value = Some(gradient);
    }

    pub fn is_filled(&self) -> bool {
        self.value.is_some()
    }

    /// 取出捕获的梯度；观察者从未触发时返回`NoGradientCaptured`
    pub fn take(&mut self) -> Result<Tensor, ExplainError> {
        self.value.take().ok_or(ExplainError::NoGradientCaptured)
    }
}

/// 引导反向传播在整流单元处的梯度改写：`(activation > 0) * max(incoming, 0)`
pub fn guided_relu_gradient(incoming: &Tensor, activation: &Tensor) -> Result<Tensor, ExplainError> {
    if !incoming.is_same_shape(activation) {
        return Err(GraphError::ShapeMismatch {
            expected: activation.shape().to_vec(),
            got: incoming.shape().to_vec(),
            message: "整流单元的梯度形状须与其前向输出一致".to_string(),
        }
        .into());
    }
    Ok(&presence_mask(activation) * &incoming.clamp_min(0.0))
}

/// 观察者的安装方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptMode {
    /// 改写整流单元的梯度并捕获输入梯度
    Guided,
    /// 只捕获输入梯度（普通反向传播）
    CaptureOnly,
}

/// 已安装在某个网络上的观察者集合
pub struct GradientInterceptor {
    hooks: HookRegistry<InterceptState, ExplainError>,
    mode: InterceptMode,
    rectifier_units: Vec<usize>,
}

impl GradientInterceptor {
    pub fn install<N: Network>(network: &N, mode: InterceptMode) -> Result<Self, ExplainError> {
        let num_units = network.features().len();
        let mut hooks: HookRegistry<InterceptState, ExplainError> = HookRegistry::new(num_units);

        let rectifier_units = match mode {
            InterceptMode::Guided => network.rectifier_units(),
            InterceptMode::CaptureOnly => Vec::new(),
        };
        for &unit in &rectifier_units {
            hooks.on_forward(unit, |event, state: &mut InterceptState| {
                state.recorder.record(event.output.clone());
                Ok(())
            })?;
            hooks.on_backward(unit, |event, state: &mut InterceptState| {
                let activation = state.recorder.consume_last()?;
                guided_relu_gradient(event.grad_input, &activation).map(Some)
            })?;
        }

        if num_units > 0 {
            hooks.on_backward(0, |event, state: &mut InterceptState| {
                state.slot.store(event.grad_input.clone());
                Ok(None)
            })?;
        }

        tracing::debug!(
            ?mode,
            units = num_units,
            rectifiers = rectifier_units.len(),
            hooks = hooks.hook_count(),
            "安装梯度观察者"
        );
        Ok(Self {
            hooks,
            mode,
            rectifier_units,
        })
    }

    pub fn install_guided<N: Network>(network: &N) -> Result<Self, ExplainError> {
        Self::install(network, InterceptMode::Guided)
    }

    pub fn install_capture_only<N: Network>(network: &N) -> Result<Self, ExplainError> {
        Self::install(network, InterceptMode::CaptureOnly)
    }

    pub const fn hooks(&self) -> &HookRegistry<InterceptState, ExplainError> {
        &self.hooks
    }

    pub const fn mode(&self) -> InterceptMode {
        self.mode
    }

    /// 被改写梯度的整流单元位置
    pub fn rectifier_units(&self) -> &[usize] {
        &self.rectifier_units
    }
}
