use crate::tensor::Tensor;

#[test]
fn test_where_with_f32() {
    let t = Tensor::new(&[-1.0, 0.0, 2.0, f32::NAN], &[4]);
    let mask = t.where_with_f32(|x| x > 0.0, |_| 1.0, |_| 0.0);
    let v = mask.to_vec();
    assert_eq!(&v[..3], &[0.0, 0.0, 1.0]);
    assert!(v[3].is_nan());
}

#[test]
fn test_where_with_tensor() {
    let x = Tensor::new(&[-1.0, 0.0, 1.0], &[3]);
    let y = Tensor::new(&[0.0, 0.0, 0.0], &[3]);

    // 类似 np.where(x >= y, x + y, x - y)
    let result = x.where_with_tensor(&y, |x, y| x >= y, |x, y| x + y, |x, y| x - y);
    assert_eq!(result, Tensor::new(&[-1.0, 0.0, 1.0], &[3]));
}

#[test]
fn test_clamp_min_and_abs() {
    let t = Tensor::new(&[-2.0, -0.5, 0.0, 1.5], &[2, 2]);
    assert_eq!(t.clamp_min(0.0), Tensor::new(&[0.0, 0.0, 0.0, 1.5], &[2, 2]));
    assert_eq!(t.abs(), Tensor::new(&[2.0, 0.5, 0.0, 1.5], &[2, 2]));
}
