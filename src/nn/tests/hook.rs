/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : 观察者注册表与顺序网络/分类网络的挂载测试
 */

use crate::assert_err;
use crate::nn::{
    Classifier, Conv2d, Flatten, GraphError, HookRegistry, Linear, Network, ReLU, Sequential,
};
use crate::tensor::Tensor;

/// 1x1 卷积（权重1、偏置0） -> ReLU -> Flatten
fn identity_features() -> Sequential {
    Sequential::new()
        .with(
            Conv2d::new(
                "conv",
                Tensor::ones(&[1, 1, 1, 1]),
                Some(Tensor::zeros(&[1])),
                (1, 1),
                (0, 0),
            )
            .unwrap(),
        )
        .with(ReLU::new("relu"))
        .with(Flatten::new("flatten"))
}

#[test]
fn test_plain_forward_backward() -> Result<(), GraphError> {
    let mut net = identity_features();
    assert_eq!(net.len(), 3);
    assert_eq!(net.rectifier_units(), vec![1]);

    let x = Tensor::new(&[1.0, -1.0, -1.0, 1.0], &[1, 1, 2, 2]);
    let y = net.forward(&x)?;
    assert_eq!(y, Tensor::new(&[1.0, 0.0, 0.0, 1.0], &[1, 4]));

    let grad = net.backward(&Tensor::new(&[2.0, 2.0, 2.0, -2.0], &[1, 4]))?;
    assert_eq!(grad, Tensor::new(&[2.0, 0.0, 0.0, -2.0], &[1, 1, 2, 2]));
    Ok(())
}

#[test]
fn test_forward_hooks_fire_in_layer_order() -> Result<(), GraphError> {
    let mut net = identity_features();
    let mut hooks: HookRegistry<Vec<String>> = HookRegistry::new(net.len());
    for unit in 0..net.len() {
        hooks.on_forward(unit, |event, seen: &mut Vec<String>| {
            seen.push(format!("{}:{}", event.unit, event.layer_name));
            Ok(())
        })?;
    }
    assert_eq!(hooks.hook_count(), 3);

    let mut seen = Vec::new();
    net.forward_hooked(&Tensor::ones(&[1, 1, 2, 2]), &hooks, &mut seen)?;
    assert_eq!(seen, vec!["0:conv", "1:relu", "2:flatten"]);
    Ok(())
}

#[test]
fn test_forward_hook_sees_layer_output() -> Result<(), GraphError> {
    let mut net = identity_features();
    let mut hooks: HookRegistry<Option<Tensor>> = HookRegistry::new(net.len());
    hooks.on_forward(1, |event, out: &mut Option<Tensor>| {
        *out = Some(event.output.clone());
        Ok(())
    })?;

    let mut relu_output = None;
    let x = Tensor::new(&[3.0, -1.0, 0.5, -2.0], &[1, 1, 2, 2]);
    net.forward_hooked(&x, &hooks, &mut relu_output)?;
    assert_eq!(
        relu_output,
        Some(Tensor::new(&[3.0, 0.0, 0.5, 0.0], &[1, 1, 2, 2]))
    );
    Ok(())
}

#[test]
fn test_backward_hooks_replace_in_registration_order() -> Result<(), GraphError> {
    let mut net = identity_features();
    let mut hooks: HookRegistry<Vec<&'static str>> = HookRegistry::new(net.len());
    // 同一层上：第一个观察者把梯度加倍，第二个观察者看到的是加倍后的梯度
    hooks.on_backward(1, |event, log: &mut Vec<&'static str>| {
        log.push("double");
        Ok(Some(event.grad_input * 2.0))
    })?;
    hooks.on_backward(1, |event, log: &mut Vec<&'static str>| {
        log.push("observe");
        assert_eq!(event.grad_input.sum(), 4.0);
        Ok(None)
    })?;
    hooks.on_backward(0, |_, log: &mut Vec<&'static str>| {
        log.push("first-layer");
        Ok(None)
    })?;

    let mut log = Vec::new();
    net.forward_hooked(&Tensor::ones(&[1, 1, 2, 2]), &hooks, &mut log)?;
    let grad = net.backward_hooked(&Tensor::full(0.5, &[1, 4]), &hooks, &mut log)?;

    // 反向传播逆序经过各层
    assert_eq!(log, vec!["double", "observe", "first-layer"]);
    assert_eq!(grad, Tensor::ones(&[1, 1, 2, 2]));
    Ok(())
}

#[test]
fn test_hook_error_propagates() {
    let mut net = identity_features();
    let mut hooks: HookRegistry<()> = HookRegistry::new(net.len());
    hooks
        .on_forward(2, |_, _: &mut ()| {
            Err(GraphError::ComputationError("观察者失败".to_string()))
        })
        .unwrap();
    assert_err!(
        net.forward_hooked(&Tensor::ones(&[1, 1, 2, 2]), &hooks, &mut ()),
        GraphError::ComputationError("观察者失败")
    );
}

#[test]
fn test_hook_count_spans_forward_and_backward() -> Result<(), GraphError> {
    let mut hooks: HookRegistry<()> = HookRegistry::new(3);
    hooks.on_forward(0, |_, _: &mut ()| Ok(()))?;
    hooks.on_forward(1, |_, _: &mut ()| Ok(()))?;
    hooks.on_backward(1, |_, _: &mut ()| Ok(None))?;
    hooks.on_backward(1, |_, _: &mut ()| Ok(None))?;
    hooks.on_backward(2, |_, _: &mut ()| Ok(None))?;
    assert_eq!(hooks.num_units(), 3);
    assert_eq!(hooks.hook_count(), 5);
    Ok(())
}

#[test]
fn test_hook_unit_out_of_range() {
    let mut hooks: HookRegistry<()> = HookRegistry::new(3);
    assert_err!(
        hooks.on_forward(3, |_, _: &mut ()| Ok(())),
        GraphError::HookUnitOutOfRange { unit: 3, len: 3 }
    );
    assert_err!(
        hooks.on_backward(7, |_, _: &mut ()| Ok(None)),
        GraphError::HookUnitOutOfRange { unit: 7, len: 3 }
    );
    assert_eq!(hooks.hook_count(), 0);
}

#[test]
fn test_classifier_head_is_not_hooked() -> Result<(), GraphError> {
    let head = Sequential::new().with(
        Linear::new(
            "fc",
            Tensor::new(&[1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0], &[4, 2]),
            None,
        )?,
    );
    let mut net = Classifier::new(identity_features(), head.with(ReLU::new("head_relu")));
    assert_eq!(net.features().len(), 3);
    assert_eq!(net.classifier_layers().len(), 2);
    // 分类头里的 ReLU 不算作可观察的整流单元
    assert_eq!(net.rectifier_units(), vec![1]);

    let mut hooks: HookRegistry<usize> = HookRegistry::new(net.features().len());
    for unit in 0..net.features().len() {
        hooks.on_backward(unit, |_, count: &mut usize| {
            *count += 1;
            Ok(None)
        })?;
    }

    let mut count = 0;
    let x = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[1, 1, 2, 2]);
    let logits = net.forward_hooked(&x, &hooks, &mut count)?;
    assert_eq!(logits, Tensor::new(&[5.0, 5.0], &[1, 2]));

    let grad = net.backward_hooked(&Tensor::one_hot(1, &[1, 2]), &hooks, &mut count)?;
    assert_eq!(count, 3);
    assert_eq!(grad, Tensor::new(&[0.0, 1.0, 1.0, 0.0], &[1, 1, 2, 2]));
    Ok(())
}
