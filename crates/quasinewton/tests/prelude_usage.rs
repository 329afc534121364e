//! Smoke tests for the umbrella prelude.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use quasinewton::prelude::*;

#[test]
fn test_quadratic_form_through_prelude() {
    let a = DMatrix::from_row_slice(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 0.5, 0.0, 0.5, 2.0]);
    let b = [1.0, -2.0, 0.5];
    let problem = QuadraticForm::new(&a, &b).unwrap();

    let config = LBFGSConfig::new().with_gradient_tolerance(1e-6).with_delta(0.0);
    let minimum = minimize(&problem, &[0.0; 3], config).unwrap();
    assert!(minimum.converged(), "{:?}", minimum.result);

    let expected = a.lu().solve(&DVector::from_column_slice(&b)).unwrap();
    for i in 0..3 {
        assert_relative_eq!(minimum.point[i], expected[i], epsilon = 1e-5);
    }
}

#[test]
fn test_in_place_run_on_caller_storage() {
    let problem = ExtendedRosenbrock::new(6).unwrap();
    let mut storage = vec![0.0; padded_len::<f64>(6)];
    storage[..6].copy_from_slice(&problem.starting_point::<f64>());

    let mut x = VectorViewMut::new(&mut storage, 6).unwrap();
    let result = LBFGS::new(LBFGSConfig::new().with_gradient_tolerance(1e-8).with_delta(1e-10))
        .optimize(&problem, &mut x)
        .unwrap();

    assert!(result.converged);
    for &xi in &storage[..6] {
        assert_relative_eq!(xi, 1.0, epsilon = 1e-4);
    }
    assert_eq!(storage.len(), 8);
    assert!(storage[6..].iter().all(|&v| v == 0.0));
}

#[test]
fn test_booth_reaches_known_minimizer() {
    let minimum = minimize(&Booth, &[0.0, 0.0], LBFGSConfig::new().with_gradient_tolerance(1e-9)).unwrap();
    assert_eq!(
        minimum.point.iter().map(|v: &f64| v.round() as i64).collect::<Vec<_>>(),
        vec![1, 3]
    );
}
