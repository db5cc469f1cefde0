use super::Tensor;

impl Tensor {
    /// 通用的条件过滤函数，可以灵活处理张量中的元素
    ///
    /// # 参数
    /// * `condition` - 条件函数，接收元素值并返回bool
    /// * `true_fn` - 当条件为true时的值转换函数
    /// * `false_fn` - 当条件为false时的值转换函数
    ///
    /// NaN元素保持为NaN，不参与条件判断。
    ///
    /// # 示例
    /// ```
    /// use guided_saliency::tensor::Tensor;
    /// let t = Tensor::new(&[-1.0, 0.0, 1.0], &[3]);
    ///
    /// // 类似 np.where(x > 0.0, 1.0, 0.0)
    /// let mask = t.where_with_f32(|x| x > 0.0, |_| 1.0, |_| 0.0);
    /// assert_eq!(mask, Tensor::new(&[0.0, 0.0, 1.0], &[3]));
    /// ```
    pub fn where_with_f32<F, T, U>(&self, condition: F, true_fn: T, false_fn: U) -> Self
    where
        F: Fn(f32) -> bool,
        T: Fn(f32) -> f32,
        U: Fn(f32) -> f32,
    {
        Self::from_array(self.data.mapv(|x| {
            if x.is_nan() {
                f32::NAN
            } else if condition(x) {
                true_fn(x)
            } else {
                false_fn(x)
            }
        }))
    }

    /// 基于另一个同形张量的逐元素条件过滤
    ///
    /// # 参数
    /// * `other` - 用于比较的张量，其形状必须与当前张量相同，否则panic
    /// * `condition` - 接收两个张量对应元素值并返回bool
    /// * `true_fn` / `false_fn` - 同样接收两个张量的对应元素值
    pub fn where_with_tensor<F, T, U>(
        &self,
        other: &Self,
        condition: F,
        true_fn: T,
        false_fn: U,
    ) -> Self
    where
        F: Fn(f32, f32) -> bool,
        T: Fn(f32, f32) -> f32,
        U: Fn(f32, f32) -> f32,
    {
        assert!(
            self.is_same_shape(other),
            "两个张量的形状必须相同，当前张量形状为{:?}，比较张量形状为{:?}",
            self.shape(),
            other.shape()
        );

        let mut result = self.data.clone();
        result.zip_mut_with(&other.data, |x, &y| {
            *x = if x.is_nan() || y.is_nan() {
                f32::NAN
            } else if condition(*x, y) {
                true_fn(*x, y)
            } else {
                false_fn(*x, y)
            };
        });
        Self::from_array(result)
    }

    /// 逐元素映射
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Self {
        Self::from_array(self.data.mapv(f))
    }

    /// 逐元素下限截断，即`max(x, min)`
    pub fn clamp_min(&self, min: f32) -> Self {
        self.map(|x| x.max(min))
    }

    pub fn abs(&self) -> Self {
        self.map(f32::abs)
    }
}
