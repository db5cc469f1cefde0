/*
 * @Author       : 老董
 * @Date         : 2026-02-03
 * @Description  : Network trait 及分类网络（特征提取 + 分类头）
 */

use super::hook::HookRegistry;
use super::layer::{Layer, TraitLayer};
use super::{GraphError, Sequential};
use crate::tensor::Tensor;

/// 可被观察的可微网络
///
/// # 设计原则
/// - `features()` 是“声明的层序列”：观察者只能挂载在这些层上，位置即其下标
/// - 观察者需要改写的状态由调用方以`ctx`传入，网络本身不持有任何观察者状态
/// - 反向传播只做一次性的 VJP，参数梯度累加在各层内部，由`zero_grad()`清零
pub trait Network {
    fn features(&self) -> &[Layer];

    fn forward_hooked<C, E: From<GraphError>>(
        &mut self,
        input: &Tensor,
        hooks: &HookRegistry<C, E>,
        ctx: &mut C,
    ) -> Result<Tensor, E>;

    /// 以`seed_grad`（对网络输出的梯度）为起点反向传播，返回对网络输入的梯度
    fn backward_hooked<C, E: From<GraphError>>(
        &mut self,
        seed_grad: &Tensor,
        hooks: &HookRegistry<C, E>,
        ctx: &mut C,
    ) -> Result<Tensor, E>;

    fn zero_grad(&mut self);

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, GraphError> {
        let hooks = HookRegistry::<(), GraphError>::new(0);
        self.forward_hooked(input, &hooks, &mut ())
    }

    fn backward(&mut self, seed_grad: &Tensor) -> Result<Tensor, GraphError> {
        let hooks = HookRegistry::<(), GraphError>::new(0);
        self.backward_hooked(seed_grad, &hooks, &mut ())
    }

    /// 声明的层序列中所有整流单元的位置（按声明顺序）
    fn rectifier_units(&self) -> Vec<usize> {
        self.features()
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.is_rectifier())
            .map(|(unit, _)| unit)
            .collect()
    }
}

/// 分类网络：`features`为可观察的层序列，`classifier`为分类头（其中的层不会被挂载观察者）
#[derive(Debug, Clone)]
pub struct Classifier {
    features: Sequential,
    classifier: Sequential,
}

impl Classifier {
    pub fn new(features: Sequential, classifier: Sequential) -> Self {
        Self {
            features,
            classifier,
        }
    }

    pub fn feature_layers(&self) -> &Sequential {
        &self.features
    }

    pub fn classifier_layers(&self) -> &Sequential {
        &self.classifier
    }

    /// 生成可序列化的描述（含权重）
    pub fn describe(&self, name: &str) -> super::NetworkDescriptor {
        super::NetworkDescriptor::new(
            name,
            self.features.layers().iter().map(TraitLayer::describe).collect(),
            self.classifier.layers().iter().map(TraitLayer::describe).collect(),
        )
    }
}

impl Network for Classifier {
    fn features(&self) -> &[Layer] {
        self.features.layers()
    }

    fn forward_hooked<C, E: From<GraphError>>(
        &mut self,
        input: &Tensor,
        hooks: &HookRegistry<C, E>,
        ctx: &mut C,
    ) -> Result<Tensor, E> {
        let features = self.features.forward_hooked(input, hooks, ctx)?;
        Ok(self.classifier.forward(&features)?)
    }

    fn backward_hooked<C, E: From<GraphError>>(
        &mut self,
        seed_grad: &Tensor,
        hooks: &HookRegistry<C, E>,
        ctx: &mut C,
    ) -> Result<Tensor, E> {
        let features_grad = self.classifier.backward(seed_grad)?;
        self.features.backward_hooked(&features_grad, hooks, ctx)
    }

    fn zero_grad(&mut self) {
        self.features.zero_grad();
        self.classifier.zero_grad();
    }
}
