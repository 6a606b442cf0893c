use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

/// Matrix-vector multiplication.
pub(crate) fn mat_vec_multiply(mat: &[Vec<Decimal>], v: &[Decimal]) -> Vec<Decimal> {
    mat.iter().map(|row| vec_dot(row, v)).collect()
}

/// Dot product.
pub(crate) fn vec_dot(a: &[Decimal], b: &[Decimal]) -> Decimal {
    a.iter().zip(b.iter()).map(|(x, y)| *x * *y).sum()
}

/// Quadratic form w' * M * w.
pub(crate) fn quadratic_form(w: &[Decimal], mat: &[Vec<Decimal>]) -> Decimal {
    let mw = mat_vec_multiply(mat, w);
    vec_dot(w, &mw)
}

pub(crate) fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    val.sqrt().unwrap_or(Decimal::ZERO)
}

/// Diagonal pivots of an LDL' factorization, stopping at the first pivot
/// below `-tolerance`. Zero pivots are skipped, so semi-definite input
/// factorizes fully.
#[allow(clippy::needless_range_loop)]
pub(crate) fn ldl_pivots(mat: &[Vec<Decimal>], tolerance: Decimal) -> Vec<Decimal> {
    let n = mat.len();
    let mut l = vec![vec![Decimal::ZERO; n]; n];
    let mut d: Vec<Decimal> = Vec::with_capacity(n);

    for j in 0..n {
        let mut dj = mat[j][j];
        for k in 0..j {
            dj -= l[j][k] * l[j][k] * d[k];
        }
        d.push(dj);
        if dj < -tolerance {
            return d;
        }
        l[j][j] = Decimal::ONE;
        for i in (j + 1)..n {
            let mut v = mat[i][j];
            for k in 0..j {
                v -= l[i][k] * l[j][k] * d[k];
            }
            l[i][j] = if dj.abs() <= tolerance {
                Decimal::ZERO
            } else {
                v / dj
            };
        }
    }
    d
}
