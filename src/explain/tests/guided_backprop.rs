/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 引导反向传播控制器的单元测试
 */

use approx::assert_abs_diff_eq;

use super::{checkerboard, toy_classifier};
use crate::assert_err;
use crate::explain::{
    ControllerState, ExplainError, GrayscaleReduction, GuidedBackprop, GuidedBackpropConfig,
    GuidedGradients, positive_negative_saliency,
};
use crate::nn::{
    Classifier, Flatten, GraphError, HookRegistry, Layer, Linear, Network, ReLU, Sequential,
};
use crate::tensor::Tensor;

#[test]
fn test_end_to_end_single_rectifier() -> Result<(), ExplainError> {
    let mut guided = GuidedBackprop::new(toy_classifier())?;
    assert_eq!(guided.phase(), ControllerState::Hooked);
    assert_eq!(guided.hooked_rectifiers(), &[1]);

    let raw = guided.generate_gradients(&checkerboard(), 0)?;
    assert_eq!(raw, Tensor::new(&[1.0, 0.0, 0.0, 4.0], &[1, 2, 2]));

    let maps = guided.generate(&checkerboard(), 0)?;
    assert_eq!(guided.phase(), ControllerState::Ready);

    // 输入为负处灰度图恰为0，为正处非0
    let gray = &maps.grayscale_guided_grads;
    assert_eq!(gray.shape(), &[1, 2, 2]);
    assert_eq!(gray[[0, 0, 1]], 0.0);
    assert_eq!(gray[[0, 1, 0]], 0.0);
    assert!(gray[[0, 0, 0]] > 0.0);
    assert!(gray[[0, 1, 1]] > 0.0);
    assert_abs_diff_eq!(gray[[0, 0, 0]], 0.25);
    assert_eq!(gray[[0, 1, 1]], 1.0);

    assert_eq!(maps.color_guided_grads, Tensor::new(&[0.25, 0.0, 0.0, 1.0], &[1, 2, 2]));
    assert_eq!(maps.positive_saliency_maps, maps.color_guided_grads);
    // 引导梯度非负，负显著性退化为全0
    assert_eq!(maps.negative_saliency_maps, Tensor::zeros(&[1, 2, 2]));
    Ok(())
}

#[test]
fn test_batched_and_unbatched_inputs_agree() -> Result<(), ExplainError> {
    let mut guided = GuidedBackprop::new(toy_classifier())?;
    let a = guided.generate(&checkerboard(), 1)?;
    let b = guided.generate(&checkerboard().unsqueeze_first(), 1)?;
    assert_eq!(a, b);
    assert_eq!(a.color_guided_grads, Tensor::new(&[0.0, 0.0, 0.0, 1.0], &[1, 2, 2]));
    Ok(())
}

#[test]
fn test_gradient_zero_where_rectifier_inactive() -> Result<(), ExplainError> {
    // 第一层即为整流单元：捕获到的梯度是改写后的梯度
    let features = Sequential::new().with(ReLU::new("relu"));
    let weights = Tensor::new(&[-2.0, 3.0, -1.0, 5.0, 0.5, -4.0], &[6, 1]);
    let head = Sequential::new()
        .with(Flatten::new("flatten"))
        .with(Linear::new("fc", weights, Some(Tensor::zeros(&[1])))?);
    let mut guided = GuidedBackprop::new(Classifier::new(features, head))?;

    let image = Tensor::new(&[1.0, -1.0, 0.0, 2.0, 3.0, -0.5], &[1, 2, 3]);
    let raw = guided.generate_gradients(&image, 0)?;
    // 输入 <= 0 处一律为0（无论上游梯度正负）；输入 > 0 处为 max(w, 0)
    assert_eq!(raw, Tensor::new(&[0.0, 0.0, 0.0, 5.0, 0.5, 0.0], &[1, 2, 3]));
    Ok(())
}

#[test]
fn test_hooks_installed_once_at_construction() -> Result<(), ExplainError> {
    let mut guided = GuidedBackprop::new(toy_classifier())?;
    assert_eq!(guided.phase(), ControllerState::Hooked);
    assert_eq!(guided.hooked_rectifiers(), &[1]);
    assert!(guided.intercept_state().recorder.is_empty());
    assert!(!guided.intercept_state().slot.is_filled());

    // 多次生成不会再次安装观察者：每轮恰好压入并弹出一次激活
    for _ in 0..3 {
        let raw = guided.generate_gradients(&checkerboard(), 0)?;
        assert_eq!(raw, Tensor::new(&[1.0, 0.0, 0.0, 4.0], &[1, 2, 2]));
        assert_eq!(guided.hooked_rectifiers(), &[1]);
        assert!(guided.intercept_state().recorder.is_empty());
        assert_eq!(guided.phase(), ControllerState::Ready);
    }
    Ok(())
}

#[test]
fn test_target_out_of_range() -> Result<(), ExplainError> {
    let mut guided = GuidedBackprop::new(toy_classifier())?;
    assert_err!(
        guided.generate(&checkerboard(), 2),
        ExplainError::OutOfRange {
            target_class: 2,
            num_classes: 2
        }
    );
    assert!(guided.intercept_state().recorder.is_empty());
    assert_eq!(guided.phase(), ControllerState::Ready);

    // 出错后控制器仍可继续使用
    assert!(guided.generate(&checkerboard(), 1).is_ok());
    Ok(())
}

#[test]
fn test_invalid_inputs() -> Result<(), ExplainError> {
    let mut guided = GuidedBackprop::new(toy_classifier())?;
    assert_err!(
        guided.generate(&Tensor::zeros(&[2, 1, 2, 2]), 0),
        ExplainError::InvalidInput(msg) if msg.contains("批大小2")
    );
    assert_err!(
        guided.generate(&Tensor::zeros(&[2, 2]), 0),
        ExplainError::InvalidInput(_)
    );
    // 通道数与卷积核不符
    assert_err!(
        guided.generate(&Tensor::zeros(&[3, 2, 2]), 0),
        ExplainError::Graph(GraphError::ShapeMismatch { .. })
    );
    Ok(())
}

#[test]
fn test_generate_is_idempotent() -> Result<(), ExplainError> {
    let mut guided = GuidedBackprop::new(toy_classifier())?;
    let image = Tensor::new(&[0.3, -1.2, 2.0, 0.7], &[1, 2, 2]);
    let first = guided.generate(&image, 0)?;
    let second = guided.generate(&image, 0)?;
    assert_eq!(first, second);
    assert!(guided.intercept_state().recorder.is_empty());
    Ok(())
}

#[test]
fn test_grayscale_reduction_config() -> Result<(), ExplainError> {
    let config = GuidedBackpropConfig::with_grayscale(GrayscaleReduction::SumAbs);
    let mut guided = GuidedBackprop::with_config(toy_classifier(), config)?;
    assert_eq!(guided.config().grayscale, GrayscaleReduction::SumAbs);

    // 单通道时两种归约方式一致
    let maps = guided.generate(&checkerboard(), 0)?;
    let expected = GuidedGradients::from_gradient(
        &Tensor::new(&[1.0, 0.0, 0.0, 4.0], &[1, 2, 2]),
        GrayscaleReduction::MaxAbs,
    )?;
    assert_eq!(maps, expected);
    Ok(())
}

#[test]
fn test_positive_negative_disjoint_on_raw_gradient() -> Result<(), ExplainError> {
    let mut guided = GuidedBackprop::new(toy_classifier())?;
    let raw = guided.generate_gradients(&Tensor::new(&[0.5, 2.0, -1.0, 1.5], &[1, 2, 2]), 1)?;
    let (pos, neg) = positive_negative_saliency(&raw);
    assert_eq!((&pos * &neg).abs().sum(), 0.0);
    Ok(())
}

#[test]
fn test_no_features_means_no_capture() -> Result<(), ExplainError> {
    let head = Sequential::new()
        .with(Flatten::new("flatten"))
        .with(Linear::new("fc", Tensor::ones(&[4, 2]), None)?);
    let mut guided = GuidedBackprop::new(Classifier::new(Sequential::new(), head))?;
    assert_err!(
        guided.generate(&checkerboard(), 0),
        ExplainError::NoGradientCaptured
    );
    Ok(())
}

/// 前向传播执行两遍，记录栈会多出一份
#[derive(Clone)]
struct DoubleForward(Classifier);

impl Network for DoubleForward {
    fn features(&self) -> &[Layer] {
        self.0.features()
    }

    fn forward_hooked<C, E: From<GraphError>>(
        &mut self,
        input: &Tensor,
        hooks: &HookRegistry<C, E>,
        ctx: &mut C,
    ) -> Result<Tensor, E> {
        self.0.forward_hooked(input, hooks, ctx)?;
        self.0.forward_hooked(input, hooks, ctx)
    }

    fn backward_hooked<C, E: From<GraphError>>(
        &mut self,
        seed_grad: &Tensor,
        hooks: &HookRegistry<C, E>,
        ctx: &mut C,
    ) -> Result<Tensor, E> {
        self.0.backward_hooked(seed_grad, hooks, ctx)
    }

    fn zero_grad(&mut self) {
        self.0.zero_grad();
    }
}

#[test]
fn test_unbalanced_stack() -> Result<(), ExplainError> {
    let mut guided = GuidedBackprop::new(DoubleForward(toy_classifier()))?;
    assert_err!(
        guided.generate(&checkerboard(), 0),
        ExplainError::UnbalancedStack { remaining: 1 }
    );
    // 出错后记录栈被清空
    assert!(guided.intercept_state().recorder.is_empty());
    Ok(())
}

/// 前向传播绕过观察者，反向传播时记录栈为空
struct UnhookedForward(Classifier);

impl Network for UnhookedForward {
    fn features(&self) -> &[Layer] {
        self.0.features()
    }

    fn forward_hooked<C, E: From<GraphError>>(
        &mut self,
        input: &Tensor,
        _hooks: &HookRegistry<C, E>,
        _ctx: &mut C,
    ) -> Result<Tensor, E> {
        Ok(self.0.forward(input)?)
    }

    fn backward_hooked<C, E: From<GraphError>>(
        &mut self,
        seed_grad: &Tensor,
        hooks: &HookRegistry<C, E>,
        ctx: &mut C,
    ) -> Result<Tensor, E> {
        self.0.backward_hooked(seed_grad, hooks, ctx)
    }

    fn zero_grad(&mut self) {
        self.0.zero_grad();
    }
}

#[test]
fn test_empty_stack_is_fatal() -> Result<(), ExplainError> {
    let mut guided = GuidedBackprop::new(UnhookedForward(toy_classifier()))?;
    assert_err!(guided.generate(&checkerboard(), 0), ExplainError::EmptyStack);
    assert!(!guided.intercept_state().slot.is_filled());
    assert_eq!(guided.phase(), ControllerState::Ready);
    Ok(())
}
