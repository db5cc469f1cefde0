/*
 * @Author       : 老董
 * @Date         : 2023-08-30 19:16:48
 * @Description  : 将取值在[0,1]的显著图张量渲染为`image`库的图像缓冲（不负责写盘）。
 *                 张量为通道优先：灰度图为[H, W]或[1, H, W]，彩色图为[3, H, W]
 */

use super::Tensor;
use crate::errors::TensorError;
use image::{GrayImage, Luma, Rgb, RgbImage};

impl Tensor {
    /// 将[H, W]或[1, H, W]的显著图转换为8位灰度图像，像素值 = round(x * 255)
    pub fn to_gray_image(&self) -> Result<GrayImage, TensorError> {
        let (height, width) = match self.shape() {
            [h, w] | [1, h, w] => (*h, *w),
            other => {
                return Err(TensorError::NotAnImage {
                    expected: "[H, W]或[1, H, W]".to_string(),
                    got: other.to_vec(),
                });
            }
        };
        self.check_unit_range()?;

        let plane = self.reshape(&[height, width]);
        Ok(GrayImage::from_fn(width as u32, height as u32, |x, y| {
            Luma([to_u8(plane[[y as usize, x as usize]])])
        }))
    }

    /// 将[3, H, W]的显著图转换为8位RGB图像（CHW -> HWC）
    pub fn to_rgb_image(&self) -> Result<RgbImage, TensorError> {
        let (height, width) = match self.shape() {
            [3, h, w] => (*h, *w),
            other => {
                return Err(TensorError::NotAnImage {
                    expected: "[3, H, W]".to_string(),
                    got: other.to_vec(),
                });
            }
        };
        self.check_unit_range()?;

        Ok(RgbImage::from_fn(width as u32, height as u32, |x, y| {
            let (y, x) = (y as usize, x as usize);
            Rgb([
                to_u8(self[[0, y, x]]),
                to_u8(self[[1, y, x]]),
                to_u8(self[[2, y, x]]),
            ])
        }))
    }

    fn check_unit_range(&self) -> Result<(), TensorError> {
        match self
            .view()
            .iter()
            .find(|x| x.is_nan() || **x < 0.0 || **x > 1.0)
        {
            Some(pixel) => Err(TensorError::PixelOutOfRange(pixel.to_string())),
            None => Ok(()),
        }
    }
}

fn to_u8(value: f32) -> u8 {
    (value * 255.0).round() as u8
}
