/*
 * @Author       : 老董
 * @Date         : 2025-12-22
 * @Description  : Conv2d (2D 卷积) 层 - PyTorch 风格
 *
 * 输入/输出形状：
 * - 输入：[batch_size, in_channels, H, W]
 * - 卷积核：[out_channels, in_channels, kH, kW]
 * - 偏置：[out_channels]（可选）
 * - 输出：[batch_size, out_channels, H', W']
 *
 * 输出尺寸计算：
 * H' = (H + 2*padding_h - kernel_h) / stride_h + 1
 * W' = (W + 2*padding_w - kernel_w) / stride_w + 1
 */

use rand::rngs::StdRng;

use super::{TraitLayer, check_upstream_shape, not_forwarded};
use crate::nn::{GraphError, Init, LayerDescriptor};
use crate::tensor::Tensor;

/// 2D 卷积层
#[derive(Debug, Clone)]
pub struct Conv2d {
    name: String,
    kernel: Tensor,
    bias: Option<Tensor>,
    stride: (usize, usize),
    padding: (usize, usize),

    kernel_grad: Tensor,
    bias_grad: Option<Tensor>,

    // 缓存（用于反向传播）
    padded_input: Option<Tensor>,
    input_shape: Vec<usize>,
    output_shape: Vec<usize>,
}

impl Conv2d {
    /// 以给定的卷积核和偏置创建 Conv2d 层
    ///
    /// # 参数
    /// - `kernel`: [`C_out`, `C_in`, kH, kW]
    /// - `bias`: [`C_out`]，可选
    /// - `stride`: 步长 (sH, sW)，各分量须大于0
    /// - `padding`: 零填充 (pH, pW)
    pub fn new(
        name: &str,
        kernel: Tensor,
        bias: Option<Tensor>,
        stride: (usize, usize),
        padding: (usize, usize),
    ) -> Result<Self, GraphError> {
        // 1. 验证卷积核形状：必须是 4D [C_out, C_in, kH, kW]
        if kernel.dimension() != 4 || kernel.size() == 0 {
            return Err(GraphError::ShapeMismatch {
                expected: vec![0, 0, 0, 0], // 占位
                got: kernel.shape().to_vec(),
                message: format!("{name}的卷积核必须是非空的 4D [C_out, C_in, kH, kW]"),
            });
        }
        let out_channels = kernel.shape()[0];

        // 2. 验证偏置形状
        if let Some(b) = &bias {
            if b.shape() != [out_channels] {
                return Err(GraphError::ShapeMismatch {
                    expected: vec![out_channels],
                    got: b.shape().to_vec(),
                    message: format!("{name}的偏置长度须等于输出通道数"),
                });
            }
        }

        // 3. 验证步长
        if stride.0 == 0 || stride.1 == 0 {
            return Err(GraphError::InvalidOperation(format!(
                "{name}的步长须大于0，得到{stride:?}"
            )));
        }

        let kernel_grad = Tensor::zeros(kernel.shape());
        let bias_grad = bias.as_ref().map(|b| Tensor::zeros(b.shape()));
        Ok(Self {
            name: name.to_string(),
            kernel,
            bias,
            stride,
            padding,
            kernel_grad,
            bias_grad,
            padded_input: None,
            input_shape: Vec::new(),
            output_shape: Vec::new(),
        })
    }

    /// 创建新的 Conv2d 层：卷积核 Kaiming 初始化，偏置零初始化
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        name: &str,
        in_channels: usize,
        out_channels: usize,
        kernel_size: (usize, usize),
        stride: (usize, usize),
        padding: (usize, usize),
        use_bias: bool,
        rng: &mut StdRng,
    ) -> Result<Self, GraphError> {
        let (k_h, k_w) = kernel_size;
        let kernel = Init::Kaiming.generate_with_rng(&[out_channels, in_channels, k_h, k_w], rng);
        let bias = use_bias.then(|| Tensor::zeros(&[out_channels]));
        Self::new(name, kernel, bias, stride, padding)
    }

    pub const fn kernel(&self) -> &Tensor {
        &self.kernel
    }

    pub const fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    pub const fn stride(&self) -> (usize, usize) {
        self.stride
    }

    pub const fn padding(&self) -> (usize, usize) {
        self.padding
    }

    /// (kH, kW)
    pub fn kernel_size(&self) -> (usize, usize) {
        (self.kernel.shape()[2], self.kernel.shape()[3])
    }

    /// 对输入进行零填充
    /// 输入必须是 4D [batch, C, H, W]
    fn pad_input(&self, input: &Tensor) -> Tensor {
        let (pad_h, pad_w) = self.padding;
        if pad_h == 0 && pad_w == 0 {
            return input.clone();
        }

        let shape = input.shape();
        let (batch_size, c, h, w) = (shape[0], shape[1], shape[2], shape[3]);
        let mut padded = Tensor::zeros(&[batch_size, c, h + 2 * pad_h, w + 2 * pad_w]);
        for bi in 0..batch_size {
            for ci in 0..c {
                for hi in 0..h {
                    for wi in 0..w {
                        padded[[bi, ci, hi + pad_h, wi + pad_w]] = input[[bi, ci, hi, wi]];
                    }
                }
            }
        }
        padded
    }

    /// 在已填充的输入上执行卷积
    fn convolve(&self, padded: &Tensor) -> Tensor {
        let shape = padded.shape();
        let (batch_size, in_c, in_h, in_w) = (shape[0], shape[1], shape[2], shape[3]);
        let out_c = self.kernel.shape()[0];
        let (k_h, k_w) = self.kernel_size();
        let (stride_h, stride_w) = self.stride;
        let out_h = (in_h - k_h) / stride_h + 1;
        let out_w = (in_w - k_w) / stride_w + 1;

        let mut output = Tensor::zeros(&[batch_size, out_c, out_h, out_w]);
        for b in 0..batch_size {
            for oc in 0..out_c {
                let bias = self.bias.as_ref().map_or(0.0, |bias| bias[[oc]]);
                for oh in 0..out_h {
                    for ow in 0..out_w {
                        let h_start = oh * stride_h;
                        let w_start = ow * stride_w;
                        let mut sum = bias;
                        for ic in 0..in_c {
                            for kh in 0..k_h {
                                for kw in 0..k_w {
                                    sum += padded[[b, ic, h_start + kh, w_start + kw]]
                                        * self.kernel[[oc, ic, kh, kw]];
                                }
                            }
                        }
                        output[[b, oc, oh, ow]] = sum;
                    }
                }
            }
        }
        output
    }
}

impl TraitLayer for Conv2d {
    fn name(&self) -> &str {
        &self.name
    }

    fn forward(&mut self, input: &Tensor) -> Result<Tensor, GraphError> {
        // 1. 输入必须是 4D [batch, C_in, H, W]（Batch-First）
        let input_shape = input.shape();
        if input_shape.len() != 4 {
            return Err(GraphError::ShapeMismatch {
                expected: vec![0, 0, 0, 0], // 占位
                got: input_shape.to_vec(),
                message: format!(
                    "{}的输入必须是 4D [batch, C_in, H, W]。单样本请使用 [1, C_in, H, W]",
                    self.name
                ),
            });
        }

        // 2. 通道数匹配
        let in_channels = self.kernel.shape()[1];
        if input_shape[1] != in_channels {
            return Err(GraphError::ShapeMismatch {
                expected: vec![in_channels],
                got: vec![input_shape[1]],
                message: format!(
                    "{}的输入通道数 {} 与卷积核输入通道数 {in_channels} 不匹配",
                    self.name, input_shape[1]
                ),
            });
        }

        // 3. 卷积核不能超出填充后的输入
        let (k_h, k_w) = self.kernel_size();
        let (pad_h, pad_w) = self.padding;
        let (padded_h, padded_w) = (input_shape[2] + 2 * pad_h, input_shape[3] + 2 * pad_w);
        if k_h > padded_h || k_w > padded_w {
            return Err(GraphError::InvalidOperation(format!(
                "{}的卷积核 {k_h}x{k_w} 超出填充后的输入尺寸 {padded_h}x{padded_w}",
                self.name
            )));
        }

        let padded = self.pad_input(input);
        let output = self.convolve(&padded);

        self.input_shape = input_shape.to_vec();
        self.output_shape = output.shape().to_vec();
        self.padded_input = Some(padded);
        Ok(output)
    }

    /// 对于 Y = conv(X, K) + b:
    /// - dL/dX: 转置卷积（把每个输出位置的梯度按卷积核散回输入，落在填充区的丢弃）
    /// - dL/dK: 输入与上游梯度的相关运算，跨 batch 累加
    /// - dL/db: 上游梯度按通道求和
    fn backward(&mut self, upstream_grad: &Tensor) -> Result<Tensor, GraphError> {
        let padded_input = self
            .padded_input
            .as_ref()
            .ok_or_else(|| not_forwarded(&self.name))?;
        check_upstream_shape(&self.name, &self.output_shape, upstream_grad)?;

        let grad_shape = upstream_grad.shape();
        let (batch_size, out_c, out_h, out_w) =
            (grad_shape[0], grad_shape[1], grad_shape[2], grad_shape[3]);
        let in_c = self.kernel.shape()[1];
        let (k_h, k_w) = self.kernel_size();
        let (stride_h, stride_w) = self.stride;
        let (pad_h, pad_w) = self.padding;
        let (orig_in_h, orig_in_w) = (self.input_shape[2], self.input_shape[3]);

        let mut input_grad = Tensor::zeros(&self.input_shape);
        for b in 0..batch_size {
            for oc in 0..out_c {
                for oh in 0..out_h {
                    for ow in 0..out_w {
                        let grad_val = upstream_grad[[b, oc, oh, ow]];
                        if let Some(bias_grad) = self.bias_grad.as_mut() {
                            bias_grad[[oc]] += grad_val;
                        }
                        let h_start = oh * stride_h;
                        let w_start = ow * stride_w;

                        for ic in 0..in_c {
                            for kh in 0..k_h {
                                for kw in 0..k_w {
                                    let (ph, pw) = (h_start + kh, w_start + kw);
                                    self.kernel_grad[[oc, ic, kh, kw]] +=
                                        grad_val * padded_input[[b, ic, ph, pw]];

                                    // 落在填充区的位置对原始输入没有梯度
                                    if ph >= pad_h
                                        && ph - pad_h < orig_in_h
                                        && pw >= pad_w
                                        && pw - pad_w < orig_in_w
                                    {
                                        input_grad[[b, ic, ph - pad_h, pw - pad_w]] +=
                                            grad_val * self.kernel[[oc, ic, kh, kw]];
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        Ok(input_grad)
    }

    fn zero_grad(&mut self) {
        self.kernel_grad = Tensor::zeros(self.kernel.shape());
        if let Some(bias) = &self.bias {
            self.bias_grad = Some(Tensor::zeros(bias.shape()));
        }
    }

    fn parameters(&self) -> Vec<&Tensor> {
        std::iter::once(&self.kernel).chain(self.bias.as_ref()).collect()
    }

    fn grads(&self) -> Vec<&Tensor> {
        std::iter::once(&self.kernel_grad)
            .chain(self.bias_grad.as_ref())
            .collect()
    }

    fn describe(&self) -> LayerDescriptor {
        let shape = self.kernel.shape();
        LayerDescriptor::Conv2d {
            name: self.name.clone(),
            in_channels: shape[1],
            out_channels: shape[0],
            kernel_size: (shape[2], shape[3]),
            stride: self.stride,
            padding: self.padding,
            use_bias: self.bias.is_some(),
            kernel: Some(self.kernel.to_vec()),
            bias: self.bias.as_ref().map(Tensor::to_vec),
        }
    }
}
