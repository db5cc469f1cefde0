/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @Description  : 张量层面的错误类型
 */

use thiserror::Error;
mod ops;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },

    #[error("数据长度{data_len}与形状{shape:?}所需的元素个数不符")]
    DataShapeMismatch { data_len: usize, shape: Vec<usize> },
    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("维度{axis}超出张量的阶数{dimension}")]
    AxisOutOfRange { axis: usize, dimension: usize },
    #[error("索引{index}超出维度{axis}的长度{len}")]
    IndexOutOfRange { index: usize, axis: usize, len: usize },

    // 图像相关
    #[error("图像张量的形状须为{expected}，得到{got:?}")]
    NotAnImage { expected: String, got: Vec<usize> },
    #[error("检测到像素值{0}：显著图的每个值必须在[0,1]之间")]
    PixelOutOfRange(String),
}
