mod guided_backprop;

use crate::nn::{Classifier, Conv2d, Flatten, Linear, ReLU, Sequential};
use crate::tensor::Tensor;

/// 单通道 2x2 输入：[[1, -1], [-1, 1]]
fn checkerboard() -> Tensor {
    Tensor::new(&[1.0, -1.0, -1.0, 1.0], &[1, 2, 2])
}

/// 特征部分：1x1 卷积（权重1、偏置0） -> ReLU；
/// 分类头：Flatten -> Linear(4 -> 2)，第0类权重全为正，第1类权重有正有负
fn toy_classifier() -> Classifier {
    let features = Sequential::new()
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
        .with(ReLU::new("relu"));
    // 权重 [in=4, out=2]：第0列 [1, 2, 3, 4]，第1列 [-1, 0.5, -2, 1]
    let weights = Tensor::new(&[1.0, -1.0, 2.0, 0.5, 3.0, -2.0, 4.0, 1.0], &[4, 2]);
    let head = Sequential::new()
        .with(Flatten::new("flatten"))
        .with(Linear::new("fc", weights, None).unwrap());
    Classifier::new(features, head)
}
