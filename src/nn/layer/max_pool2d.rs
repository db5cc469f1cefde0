/*
 * @Author       : 老董
 * @Date         : 2025-12-22
 * @Description  : 2D 最大池化层（PyTorch 风格）
 *
 * 设计决策：
 * - 记录最大值位置用于反向传播（稀疏梯度）
 * - Batch-First 格式：输入必须是 4D [batch, C, H, W]
 * - 输出格式：[batch, C, H', W']
 */

use super::{TraitLayer, check_upstream_shape, not_forwarded};
use crate::nn::{GraphError, LayerDescriptor};
use crate::tensor::Tensor;

/// 2D 最大池化层
#[derive(Debug, Clone)]
pub struct MaxPool2d {
    name: String,
    kernel_size: (usize, usize), // (kH, kW)
    stride: (usize, usize),      // (sH, sW)

    // 缓存（用于反向传播）
    // 每个输出位置对应的最大值在输入平面中的展平索引（ih * W + iw）
    max_indices: Option<Vec<usize>>,
    input_shape: Vec<usize>,
    output_shape: Vec<usize>,
}

impl MaxPool2d {
    /// 创建 `MaxPool2d` 层
    ///
    /// # 参数
    /// - `kernel_size`: 池化窗口大小 (kH, kW)
    /// - `stride`: 步长 (sH, sW)，默认等于 `kernel_size`
    pub fn new(
        name: &str,
        kernel_size: (usize, usize),
        stride: Option<(usize, usize)>,
    ) -> Result<Self, GraphError> {
        let stride = stride.unwrap_or(kernel_size);
        if kernel_size.0 == 0 || kernel_size.1 == 0 || stride.0 == 0 || stride.1 == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "{name}的池化窗口与步长须大于0，得到窗口{kernel_size:?}、步长{stride:?}"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            kernel_size,
            stride,
            max_indices: None,
            input_shape: Vec::new(),
            output_shape: Vec::new(),
        })
    }

    pub const fn kernel_size(&self) -> (usize, usize) {
        self.kernel_size
    }

    pub const fn stride(&self) -> (usize, usize) {
        self.stride
    }
}

impl TraitLayer for MaxPool2d {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, GraphError> {
        let input_shape = input.shape();
        if input_shape.len() != 4 {
            return Err(GraphError::ShapeMismatch {
                expected: vec![0, 0, 0, 0],
                got: input_shape.to_vec(),
                message: format!(
                    "{}的输入必须是 4D [batch, C, H, W]。单样本请使用 [1, C, H, W]",
                    self.name
                ),
            });
        }
        let (batch_size, channels, in_h, in_w) =
            (input_shape[0], input_shape[1], input_shape[2], input_shape[3]);

        let (k_h, k_w) = self.kernel_size;
        let (s_h, s_w) = self.stride;
        if k_h > in_h || k_w > in_w {
            return Err(GraphError::InvalidOperation(format!(
                "{}的池化窗口 {k_h}x{k_w} 超出输入尺寸 {in_h}x{in_w}",
                self.name
            )));
        }
        let out_h = (in_h - k_h) / s_h + 1;
        let out_w = (in_w - k_w) / s_w + 1;

        let mut output = Tensor::zeros(&[batch_size, channels, out_h, out_w]);
        let mut max_indices = Vec::with_capacity(output.size());
        for b in 0..batch_size {
            for c in 0..channels {
                for oh in 0..out_h {
                    for ow in 0..out_w {
                        let h_start = oh * s_h;
                        let w_start = ow * s_w;

                        let mut max_val = f32::NEG_INFINITY;
                        let mut max_idx = h_start * in_w + w_start;
                        for kh in 0..k_h {
                            for kw in 0..k_w {
                                let (ih, iw) = (h_start + kh, w_start + kw);
                                let val = input[[b, c, ih, iw]];
                                if val > max_val {
                                    max_val = val;
                                    max_idx = ih * in_w + iw;
                                }
                            }
                        }

                        output[[b, c, oh, ow]] = max_val;
                        max_indices.push(max_idx);
                    }
                }
            }
        }

        self.input_shape = input_shape.to_vec();
        self.output_shape = output.shape().to_vec();
        self.max_indices = Some(max_indices);
        Ok(output)
    }

    /// `MaxPool` 的梯度：
    /// - 最大值位置：梯度 = `upstream_grad`
    /// - 其他位置：梯度 = 0
    fn backward(&mut self, upstream_grad: &Tensor) -> Result<Tensor, GraphError> {
        let max_indices = self
            .max_indices
            .as_ref()
            .ok_or_else(|| not_forwarded(&self.name))?;
        check_upstream_shape(&self.name, &self.output_shape, upstream_grad)?;

        let in_w = self.input_shape[3];
        let (batch_size, channels, out_h, out_w) = (
            self.output_shape[0],
            self.output_shape[1],
            self.output_shape[2],
            self.output_shape[3],
        );

        let mut input_grad = Tensor::zeros(&self.input_shape);
        let mut cursor = 0;
        for b in 0..batch_size {
            for c in 0..channels {
                for oh in 0..out_h {
                    for ow in 0..out_w {
                        let max_pos = max_indices[cursor];
                        cursor += 1;
                        input_grad[[b, c, max_pos / in_w, max_pos % in_w]] +=
                            upstream_grad[[b, c, oh, ow]];
                    }
                }
            }
        }
        Ok(input_grad)
    }

    fn describe(&self) -> LayerDescriptor {
        LayerDescriptor::MaxPool2d {
            name: self.name.clone(),
            kernel_size: self.kernel_size,
            stride: self.stride,
        }
    }
}
