//! # Guided Saliency
//!
//! `guided_saliency`用纯rust为图像分类网络的预测生成基于梯度的视觉解释（显著性图）。
//! 核心是[引导反向传播](https://arxiv.org/abs/1412.6806)：
//! 在网络的整流单元（ReLU）上挂载观察者，前向时记录哪些单元被激活，
//! 反向时只让正的梯度经过被激活的单元，最终取回对输入图像的梯度，
//! 并将其渲染为彩色、灰度以及正/负显著性图。
//!
//! 模块划分：
//! - [`tensor`]：基于`ndarray`的张量；
//! - [`nn`]：顺序网络的各类层、观察者注册表以及网络描述；
//! - [`explain`]：引导反向传播、普通反向传播及其结果的后处理与聚合。
//!

pub mod errors;
pub mod explain;
pub mod nn;
pub mod tensor;
pub mod utils;
