//! Integration tests for the Levenberg-Marquardt solver.

use approx::assert_relative_eq;
use ndarray::{array, Array1, Array2};
use tms_regression::lm::{Bounds, ConvergenceStatus, LevenbergMarquardt, SolverMethod};
use tms_regression::{FitError, Problem, Result};

/// Test Problem: Simple 1D linear function f(x) = a*x + b
struct LinearProblem {
    x_data: Array1<f64>,
    y_data: Array1<f64>,
}

impl Problem for LinearProblem {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        if params.len() != 2 {
            return Err(FitError::DimensionMismatch(format!(
                "Expected 2 parameters, got {}",
                params.len()
            )));
        }
        Ok(self
            .x_data
            .iter()
            .zip(self.y_data.iter())
            .map(|(x, y)| params[0] * x + params[1] - y)
            .collect())
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        self.x_data.len()
    }

    fn jacobian(&self, _params: &Array1<f64>) -> Result<Array2<f64>> {
        let mut jac = Array2::zeros((self.x_data.len(), 2));
        for (i, &x) in self.x_data.iter().enumerate() {
            jac[[i, 0]] = x;
            jac[[i, 1]] = 1.0;
        }
        Ok(jac)
    }

    fn has_custom_jacobian(&self) -> bool {
        true
    }
}

/// Test Problem: Rosenbrock function as residuals (1 - x, 10(y - x²))
struct RosenbrockProblem;

impl Problem for RosenbrockProblem {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let (x, y) = (params[0], params[1]);
        Ok(array![1.0 - x, 10.0 * (y - x.powi(2))])
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        2
    }

    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>> {
        Ok(array![[-1.0, 0.0], [-20.0 * params[0], 10.0]])
    }

    fn has_custom_jacobian(&self) -> bool {
        true
    }
}

#[test]
fn test_linear_fitting() {
    let problem = LinearProblem {
        x_data: array![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        y_data: array![2.1, 4.9, 8.05, 10.8, 14.1, 17.0],
    };

    let result = LevenbergMarquardt::new()
        .minimize(&problem, array![1.0, 1.0])
        .unwrap();

    assert_relative_eq!(result.params[0], 3.0, epsilon = 0.1);
    assert_relative_eq!(result.params[1], 2.0, epsilon = 0.1);
    assert!(result.cost < 0.1);
}

#[test]
fn test_rosenbrock_optimization() {
    for method in [SolverMethod::Unconstrained, SolverMethod::BoundedTrustRegion] {
        let result = LevenbergMarquardt::new()
            .with_method(method)
            .minimize(&RosenbrockProblem, array![-1.2, 1.0])
            .unwrap();

        assert_eq!(result.status, ConvergenceStatus::GradientConvergence);
        assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(result.params[1], 1.0, epsilon = 1e-6);
    }
}

#[test]
fn test_evaluation_budget_is_a_convergence_failure() {
    let err = LevenbergMarquardt::new()
        .with_max_evaluations(3)
        .minimize(&RosenbrockProblem, array![-1.2, 1.0])
        .unwrap_err();
    assert!(matches!(err, FitError::ConvergenceFailure(_)));
}

#[test]
fn test_bounded_minimum_on_the_boundary() {
    // unconstrained minimum is x = 1; the box stops it at 0.5
    let bounds = [Bounds::new(-2.0, 0.5).unwrap(), Bounds::unbounded()];
    let result = LevenbergMarquardt::new()
        .with_method(SolverMethod::BoundedTrustRegion)
        .minimize_bounded(&RosenbrockProblem, array![-1.2, 1.0], Some(&bounds))
        .unwrap();
    assert!(result.params[0] <= 0.5);
    assert!(result.params[0] >= -2.0);
}
