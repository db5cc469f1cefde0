use super::bundle::VanillaGradients;
use super::interceptor::InterceptMode;
use super::session::{BackpropSession, ControllerState};
use super::{ExplainError, GuidedBackpropConfig};
use crate::nn::Network;
use crate::tensor::Tensor;

/// 普通反向传播：不改写任何梯度，只捕获目标类别得分对输入图像的梯度
pub struct VanillaBackprop<N: Network> {
    session: BackpropSession<N>,
    config: GuidedBackpropConfig,
}

impl<N: Network> VanillaBackprop<N> {
    pub fn new(network: N) -> Result<Self, ExplainError> {
        Self::with_config(network, GuidedBackpropConfig::default())
    }

    pub fn with_config(network: N, config: GuidedBackpropConfig) -> Result<Self, ExplainError> {
        Ok(Self {
            session: BackpropSession::new(network, InterceptMode::CaptureOnly)?,
            config,
        })
    }

    pub const fn phase(&self) -> ControllerState {
        self.session.phase()
    }

    pub const fn network(&self) -> &N {
        self.session.network()
    }

    pub fn into_network(self) -> N {
        self.session.into_network()
    }

    pub fn generate_gradients(
        &mut self,
        image: &Tensor,
        target_class: usize,
    ) -> Result<Tensor, ExplainError> {
        self.session.generate_gradients(image, target_class)
    }

    pub fn generate(
        &mut self,
        image: &Tensor,
        target_class: usize,
    ) -> Result<VanillaGradients, ExplainError> {
        let gradient = self.generate_gradients(image, target_class)?;
        VanillaGradients::from_gradient(&gradient, self.config.grayscale)
    }
}
