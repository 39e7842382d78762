//! One-sentence analyst comment for a rated country.
use crate::indicators::z_column;
use crate::outlook::Outlook;
use std::collections::BTreeMap;

/// Pillars compared for the strength/weakness call-out, in tie-break order.
pub const COMMENT_PILLARS: &[&str] = &[
    "Croissance_PIB",
    "PIB_par_habitant",
    "Dette_publique_PIB",
    "Inflation",
    "BalanceCourante_PIB",
    "Efficacite_Gouvernement",
];

/// Rank value of a missing pillar; never displayed.
const MISSING_RANK: f64 = -999.0;

fn fmt2(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

/// Strongest and weakest pillar as ((name, value), (name, value)).
///
/// Ties resolve to the earlier pillar for the strength and the later one for
/// the weakness.
pub fn extremal_pillars(z: &BTreeMap<String, f64>) -> ((String, Option<f64>), (String, Option<f64>)) {
    let mut pillars: Vec<(String, Option<f64>)> = COMMENT_PILLARS
        .iter()
        .map(|p| {
            let name = z_column(p);
            let v = z.get(&name).copied().filter(|v| v.is_finite());
            (name, v)
        })
        .collect();
    let rank = |v: &Option<f64>| v.unwrap_or(MISSING_RANK);
    // stable sort keeps list order among equal values
    pillars.sort_by(|a, b| rank(&b.1).total_cmp(&rank(&a.1)));
    let best = pillars[0].clone();
    let worst = pillars[pillars.len() - 1].clone();
    (best, worst)
}

/// Render the comment: score, grade, outlook, best and worst pillar.
pub fn make_comment(
    score: Option<f64>,
    rating: Option<&str>,
    outlook: Option<Outlook>,
    z: &BTreeMap<String, f64>,
) -> String {
    let (best, worst) = extremal_pillars(z);
    format!(
        "Final score: {} ({}, outlook {}). Strength: {} ({}). Weakness: {} ({}).",
        fmt2(score),
        rating.unwrap_or("N/A"),
        outlook.map(|o| o.name()).unwrap_or("N/A"),
        best.0,
        fmt2(best.1),
        worst.0,
        fmt2(worst.1),
    )
}
