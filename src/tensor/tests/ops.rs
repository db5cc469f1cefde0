use approx::assert_abs_diff_eq;

use crate::tensor::Tensor;

#[test]
fn test_elementwise_ops() {
    let a = Tensor::new(&[1.0, -2.0, 3.0, -4.0], &[2, 2]);
    let b = Tensor::new(&[0.5, 0.5, 2.0, -1.0], &[2, 2]);

    assert_eq!(&a + &b, Tensor::new(&[1.5, -1.5, 5.0, -5.0], &[2, 2]));
    assert_eq!(&a - &b, Tensor::new(&[0.5, -2.5, 1.0, -3.0], &[2, 2]));
    assert_eq!(&a * &b, Tensor::new(&[0.5, -1.0, 6.0, 4.0], &[2, 2]));
    assert_eq!(&a * 2.0, Tensor::new(&[2.0, -4.0, 6.0, -8.0], &[2, 2]));
    assert_eq!(-&a, Tensor::new(&[-1.0, 2.0, -3.0, 4.0], &[2, 2]));

    let mut acc = Tensor::zeros(&[2, 2]);
    acc += &a;
    acc += &a;
    assert_eq!(acc, &a * 2.0);
}

#[test]
#[should_panic(expected = "形状不一致，故无法相乘")]
fn test_mul_shape_mismatch_panics() {
    let a = Tensor::new(&[1.0, 2.0], &[2]);
    let b = Tensor::new(&[1.0, 2.0], &[1, 2]);
    let _ = &a * &b;
}

#[test]
fn test_mat_mul_and_transpose() {
    // [[1, 2, 3], [4, 5, 6]] x [[1, 0], [0, 1], [1, 1]]
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let b = Tensor::new(&[1.0, 0.0, 0.0, 1.0, 1.0, 1.0], &[3, 2]);
    assert_eq!(a.mat_mul(&b), Tensor::new(&[4.0, 5.0, 10.0, 11.0], &[2, 2]));

    let t = a.transpose();
    assert_eq!(t.shape(), &[3, 2]);
    assert_eq!(t.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
}

#[test]
fn test_reductions() {
    let t = Tensor::new(&[1.0, -5.0, 2.0, 0.5, 3.0, -1.0], &[2, 3]);
    assert_abs_diff_eq!(t.sum(), 0.5);
    assert_eq!(t.max_value(), 3.0);
    assert_eq!(t.min_value(), -5.0);

    let col_sum = t.sum_axis(0).unwrap();
    assert_eq!(col_sum, Tensor::new(&[1.5, -2.0, 1.0], &[3]));

    let max_abs = t.fold_axis(1, 0.0, |acc, x| acc.max(x.abs())).unwrap();
    assert_eq!(max_abs, Tensor::new(&[5.0, 3.0], &[2]));

    assert!(t.fold_axis(2, 0.0, f32::max).is_err());
}

#[test]
fn test_index() {
    let mut t = Tensor::zeros(&[1, 2, 2, 2]);
    t[[0, 1, 0, 1]] = 7.0;
    assert_eq!(t[[0, 1, 0, 1]], 7.0);
    assert_eq!(t.sum(), 7.0);
}

#[test]
fn test_one_hot() {
    let t = Tensor::one_hot(2, &[1, 4]);
    assert_eq!(t, Tensor::new(&[0.0, 0.0, 1.0, 0.0], &[1, 4]));
}
