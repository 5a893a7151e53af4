//! Polyline helpers: gap splitting and monotone smoothing.

/// Split a sequence of optional points into runs of consecutive present points.
pub fn split_gaps(points: &[(f64, Option<f64>)]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for &(x, y) in points {
        match y.filter(|v| v.is_finite()) {
            Some(y) => current.push((x, y)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Monotone cubic (Fritsch-Carlson) interpolation through `points`.
///
/// `x` must be strictly increasing. Each segment is sampled `samples` times;
/// the curve never leaves the vertical span of the two knots it joins.
pub fn monotone_path(points: &[(f64, f64)], samples: usize) -> Vec<(f64, f64)> {
    let n = points.len();
    if n < 3 || samples < 2 {
        return points.to_vec();
    }

    let secants: Vec<f64> = points
        .windows(2)
        .map(|w| (w[1].1 - w[0].1) / (w[1].0 - w[0].0))
        .collect();

    let mut tangents = vec![0.0; n];
    tangents[0] = secants[0];
    tangents[n - 1] = secants[n - 2];
    for k in 1..n - 1 {
        let (a, b) = (secants[k - 1], secants[k]);
        tangents[k] = if a * b <= 0.0 { 0.0 } else { (a + b) / 2.0 };
    }

    for k in 0..n - 1 {
        let d = secants[k];
        if d == 0.0 {
            tangents[k] = 0.0;
            tangents[k + 1] = 0.0;
            continue;
        }
        let alpha = tangents[k] / d;
        let beta = tangents[k + 1] / d;
        let norm = alpha * alpha + beta * beta;
        if norm > 9.0 {
            let tau = 3.0 / norm.sqrt();
            tangents[k] = tau * alpha * d;
            tangents[k + 1] = tau * beta * d;
        }
    }

    let mut out = Vec::with_capacity((n - 1) * samples + 1);
    out.push(points[0]);
    for k in 0..n - 1 {
        let (x0, y0) = points[k];
        let (x1, y1) = points[k + 1];
        let h = x1 - x0;
        for s in 1..=samples {
            let t = s as f64 / samples as f64;
            let t2 = t * t;
            let t3 = t2 * t;
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            let y = h00 * y0 + h10 * h * tangents[k] + h01 * y1 + h11 * h * tangents[k + 1];
            out.push((x0 + t * h, y));
        }
    }
    out
}
