/*
 * @Author       : 老董
 * @Date         : 2026-02-06
 * @Description  : 把多种解释技术作用于同一张图像，并把各自的结果图合并到一个映射中
 */

use super::bundle::ExplanationMap;
use super::{ExplainError, GuidedBackprop, GuidedBackpropConfig, VanillaBackprop};
use crate::nn::Network;
use crate::tensor::Tensor;

/// 一种解释技术
pub trait Explainer {
    fn name(&self) -> &str;

    fn explain(&mut self, image: &Tensor, target_class: usize)
    -> Result<ExplanationMap, ExplainError>;
}

impl<N: Network> Explainer for GuidedBackprop<N> {
    fn name(&self) -> &str {
        "guided_backprop"
    }

    fn explain(
        &mut self,
        image: &Tensor,
        target_class: usize,
    ) -> Result<ExplanationMap, ExplainError> {
        Ok(self.generate(image, target_class)?.into_map())
    }
}

impl<N: Network> Explainer for VanillaBackprop<N> {
    fn name(&self) -> &str {
        "vanilla_backprop"
    }

    fn explain(
        &mut self,
        image: &Tensor,
        target_class: usize,
    ) -> Result<ExplanationMap, ExplainError> {
        Ok(self.generate(image, target_class)?.into_map())
    }
}

/// 按加入顺序依次运行各解释技术；键冲突时后者覆盖前者
#[derive(Default)]
pub struct GradientVisualization {
    explainers: Vec<Box<dyn Explainer>>,
}

impl GradientVisualization {
    /// 默认技术组合：引导反向传播 + 普通反向传播，各自持有一份网络的拷贝
    pub fn new<N>(network: &N) -> Result<Self, ExplainError>
    where
        N: Network + Clone + 'static,
    {
        Self::with_config(network, GuidedBackpropConfig::default())
    }

    pub fn with_config<N>(network: &N, config: GuidedBackpropConfig) -> Result<Self, ExplainError>
    where
        N: Network + Clone + 'static,
    {
        Ok(Self::empty()
            .with(GuidedBackprop::with_config(network.clone(), config.clone())?)
            .with(VanillaBackprop::with_config(network.clone(), config)?))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, explainer: impl Explainer + 'static) -> Self {
        self.push(Box::new(explainer));
        self
    }

    pub fn push(&mut self, explainer: Box<dyn Explainer>) {
        self.explainers.push(explainer);
    }

    pub fn names(&self) -> Vec<&str> {
        self.explainers.iter().map(|e| e.name()).collect()
    }

    pub fn generate(
        &mut self,
        image: &Tensor,
        target_class: usize,
    ) -> Result<ExplanationMap, ExplainError> {
        let mut merged = ExplanationMap::new();
        for explainer in &mut self.explainers {
            let maps = explainer.explain(image, target_class)?;
            tracing::debug!(
                technique = explainer.name(),
                keys = ?maps.keys().collect::<Vec<_>>(),
                "合并解释结果"
            );
            merged.extend(maps);
        }
        Ok(merged)
    }
}
