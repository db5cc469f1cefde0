/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 基于梯度的预测解释（显著性图）：引导反向传播、普通反向传播及其结果的后处理
 */

mod aggregator;
mod bundle;
mod config;
mod error;
mod guided_backprop;
mod interceptor;
mod normalize;
mod recorder;
mod session;
mod vanilla_backprop;

pub use aggregator::{Explainer, GradientVisualization};
pub use bundle::{
    COLOR_GUIDED_GRADS, ExplanationMap, GRAYSCALE_GUIDED_GRADS, GuidedGradients,
    NEGATIVE_SALIENCY_MAPS, POSITIVE_SALIENCY_MAPS, VANILLA_COLOR_GRADS, VANILLA_GRAYSCALE_GRADS,
    VanillaGradients,
};
pub use config::{GrayscaleReduction, GuidedBackpropConfig};
pub use error::ExplainError;
pub use guided_backprop::GuidedBackprop;
pub use interceptor::{
    GradientInterceptor, GradientSlot, InterceptMode, InterceptState, guided_relu_gradient,
};
pub use normalize::{convert_to_grayscale, normalize, positive_negative_saliency};
pub use recorder::{ActivationRecorder, presence_mask};
pub use session::ControllerState;
pub use vanilla_backprop::VanillaBackprop;

#[cfg(test)]
mod tests;
