// Small numeric kernels shared by the interpolation, scoring and trend stages.
//
// Missing observations are `None` everywhere; these helpers never invent a
// value where there is not enough data.

pub fn mean(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    Some(v.iter().sum::<f64>() / v.len() as f64)
}

/// Standard deviation with the population denominator (n).
pub fn population_std(v: &[f64]) -> Option<f64> {
    let m = mean(v)?;
    let var = v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / v.len() as f64;
    Some(var.sqrt())
}

/// Standard deviation with the sample denominator (n - 1).
pub fn sample_std(v: &[f64]) -> Option<f64> {
    if v.len() < 2 {
        return None;
    }
    let m = mean(v)?;
    let var = v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (v.len() - 1) as f64;
    Some(var.sqrt())
}

/// Ordinary least-squares slope of `ys` against `xs`, using only the pairs
/// where `ys` is present. Needs at least two such points with distinct x.
pub fn ols_slope(xs: &[f64], ys: &[Option<f64>]) -> Option<f64> {
    let pts: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| y.map(|y| (*x, y)))
        .collect();
    if pts.len() < 2 {
        return None;
    }
    let n = pts.len() as f64;
    let mx = pts.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pts.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = pts.iter().map(|p| (p.0 - mx).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = pts.iter().map(|p| (p.0 - mx) * (p.1 - my)).sum();
    Some(sxy / sxx)
}

/// Fill interior gaps of `ys` by linear interpolation on `xs`.
///
/// Values before the first and after the last observation stay missing.
/// `xs` must be sorted ascending.
pub fn interpolate_interior(xs: &[f64], ys: &mut [Option<f64>]) {
    let known: Vec<usize> = (0..ys.len()).filter(|&i| ys[i].is_some()).collect();
    for pair in known.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b - a < 2 {
            continue;
        }
        let (Some(ya), Some(yb)) = (ys[a], ys[b]) else { continue };
        let span = xs[b] - xs[a];
        for i in a + 1..b {
            let t = if span == 0.0 { 0.0 } else { (xs[i] - xs[a]) / span };
            ys[i] = Some(ya + t * (yb - ya));
        }
    }
}

/// Trailing rolling sample standard deviation over `window` observations,
/// requiring at least `min_periods` present values inside the window.
pub fn rolling_sample_std(ys: &[Option<f64>], window: usize, min_periods: usize) -> Vec<Option<f64>> {
    (0..ys.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let present: Vec<f64> = ys[start..=i].iter().flatten().copied().collect();
            if present.len() < min_periods.max(2) {
                return None;
            }
            sample_std(&present)
        })
        .collect()
}
