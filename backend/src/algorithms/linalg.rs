//! Dense symmetric positive-definite solves for small regression problems.

/// Row-major square matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareMatrix {
    dim: usize,
    data: Vec<f64>,
}

impl SquareMatrix {
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            data: vec![0.0; dim * dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.dim + col]
    }

    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.dim + col] += value;
    }
}

/// Accumulates the normal equations `(XᵀX + Λ) β = Xᵀy` one row at a time.
#[derive(Debug, Clone)]
pub struct NormalEquations {
    gram: SquareMatrix,
    rhs: Vec<f64>,
}

impl NormalEquations {
    pub fn new(dim: usize) -> Self {
        Self {
            gram: SquareMatrix::zeros(dim),
            rhs: vec![0.0; dim],
        }
    }

    pub fn add_row(&mut self, row: &[f64], target: f64) {
        let dim = self.gram.dim();
        for i in 0..dim {
            if row[i] == 0.0 {
                continue;
            }
            self.rhs[i] += row[i] * target;
            for j in 0..dim {
                self.gram.add(i, j, row[i] * row[j]);
            }
        }
    }

    /// Add a ridge penalty to one coefficient.
    pub fn add_penalty(&mut self, coef: usize, lambda: f64) {
        self.gram.add(coef, coef, lambda);
    }

    /// Solve for the coefficients. `None` if the system is not positive definite.
    pub fn solve(&self) -> Option<Vec<f64>> {
        cholesky_solve(&self.gram, &self.rhs)
    }
}

/// Solve `A x = b` for symmetric positive-definite `A`.
pub fn cholesky_solve(a: &SquareMatrix, b: &[f64]) -> Option<Vec<f64>> {
    let n = a.dim();
    if b.len() != n {
        return None;
    }

    // Lower-triangular factor, row-major
    let mut l = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a.get(i, j);
            for k in 0..j {
                sum -= l[i * n + k] * l[j * n + k];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i * n + i] = sum.sqrt();
            } else {
                l[i * n + j] = sum / l[j * n + j];
            }
        }
    }

    // L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[i * n + k] * z[k];
        }
        z[i] = sum / l[i * n + i];
    }

    // Lᵀ x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[k * n + i] * x[k];
        }
        x[i] = sum / l[i * n + i];
    }

    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}
