use crate::tensor::Tensor;
use std::ops::{Index, IndexMut};

// 引用式索引：`t[[b, c, h, w]]`，索引个数须与张量阶数一致，越界则panic
impl<const N: usize> Index<[usize; N]> for Tensor {
    type Output = f32;

    fn index(&self, indices: [usize; N]) -> &f32 {
        &self.data[&indices[..]]
    }
}

impl<const N: usize> IndexMut<[usize; N]> for Tensor {
    fn index_mut(&mut self, indices: [usize; N]) -> &mut f32 {
        &mut self.data[&indices[..]]
    }
}
