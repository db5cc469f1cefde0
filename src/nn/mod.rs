/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-02-03 21:10:45
 * @Description  : 负责神经网络（neural network）的构建：层、顺序网络、观察者挂载及网络描述
 */

mod descriptor;
mod error;
mod hook;
mod init;
pub mod layer;
mod network;
mod sequential;

pub use descriptor::{LayerDescriptor, NetworkDescriptor};
pub use error::GraphError;
pub use hook::{BackwardEvent, BackwardHook, ForwardEvent, ForwardHook, HookRegistry};
pub use init::Init;
pub use layer::{Conv2d, Flatten, Layer, Linear, MaxPool2d, ReLU, TraitLayer};
pub use network::{Classifier, Network};
pub use sequential::Sequential;

#[cfg(test)]
mod tests;
