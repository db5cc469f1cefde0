/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 引导反向传播（Guided Backpropagation）控制器
 *
 * 参考：Springenberg et al., "Striving for Simplicity: The All Convolutional Net"
 */

use super::bundle::GuidedGradients;
use super::interceptor::{InterceptMode, InterceptState};
use super::session::{BackpropSession, ControllerState};
use super::{ExplainError, GuidedBackpropConfig};
use crate::nn::Network;
use crate::tensor::Tensor;

/// 引导反向传播控制器
///
/// 构造时在网络的声明层序列上一次性安装观察者，之后每次`generate`都是独立的
/// 一轮“前向 + 反向”：整流单元处只保留正的梯度，且只在前向输出为正的位置保留，
/// 最终取回对输入图像的梯度并生成四张结果图。
///
/// # 示例
/// ```ignore
/// let net = NetworkDescriptor::from_json(json)?.build(42)?;
/// let mut guided = GuidedBackprop::new(net)?;
/// let maps = guided.generate(&image, 56)?;
/// let gray = maps.grayscale_guided_grads.to_gray_image()?;
/// ```
pub struct GuidedBackprop<N: Network> {
    session: BackpropSession<N>,
    config: GuidedBackpropConfig,
}

impl<N: Network> GuidedBackprop<N> {
    pub fn new(network: N) -> Result<Self, ExplainError> {
        Self::with_config(network, GuidedBackpropConfig::default())
    }

    pub fn with_config(network: N, config: GuidedBackpropConfig) -> Result<Self, ExplainError> {
        Ok(Self {
            session: BackpropSession::new(network, InterceptMode::Guided)?,
            config,
        })
    }

    pub const fn phase(&self) -> ControllerState {
        self.session.phase()
    }

    pub const fn config(&self) -> &GuidedBackpropConfig {
        &self.config
    }

    pub const fn network(&self) -> &N {
        self.session.network()
    }

    pub fn into_network(self) -> N {
        self.session.into_network()
    }

    /// 观察者改写的状态（激活记录栈与捕获槽位）
    pub const fn intercept_state(&self) -> &InterceptState {
        self.session.state()
    }

    /// 安装了引导观察者的整流单元位置
    pub fn hooked_rectifiers(&self) -> &[usize] {
        self.session.rectifier_units()
    }

    /// 对`target_class`的原始引导梯度，形状与去掉批维度的输入一致，即[C, H, W]
    pub fn generate_gradients(
        &mut self,
        image: &Tensor,
        target_class: usize,
    ) -> Result<Tensor, ExplainError> {
        self.session.generate_gradients(image, target_class)
    }

    /// 生成四张各自归一化到[0, 1]的结果图
    pub fn generate(
        &mut self,
        image: &Tensor,
        target_class: usize,
    ) -> Result<GuidedGradients, ExplainError> {
        let gradient = self.generate_gradients(image, target_class)?;
        GuidedGradients::from_gradient(&gradient, self.config.grayscale)
    }
}
