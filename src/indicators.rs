//! Indicator catalog: series codes for each source, the canonical column
//! names they land in, and the fixed lists the scoring stages rely on.

/// Series codes looked up in the local wide file, as (column, code).
/// Codes are matched as case-insensitive substrings of `SERIES_CODE`.
pub const LOCAL_SERIES: &[(&str, &str)] = &[
    ("Solde_budgetaire_PIB", "GGXCNL_NGDP"),
    ("Dette_publique_PIB", "GGXWDG_NGDP"),
    ("Recettes_publiques", "GGR_NGDP"),
    ("Depenses_publiques", "GGXONLB_NGDP"),
    ("Balance_courante_PIB", "BCA_NGDPD"),
    ("Taux_change", "PPPEX"),
    ("Reserves_change", "TMG_RPCH"),
    ("Balance_commerciale", "BCA"),
];

/// Macro indicators fetched from the remote API, as (code, column).
pub const REMOTE_MACRO: &[(&str, &str)] = &[
    ("NY.GDP.MKTP.CD", "PIB_total_$"),
    ("NY.GDP.MKTP.KD.ZG", "Croissance_PIB"),
    ("NY.GDP.PCAP.CD", "PIB_par_habitant"),
    ("FP.CPI.TOTL.ZG", "Inflation"),
    ("GC.BAL.CASH.GD.ZS", "Deficit_budgetaire_PIB"),
    ("GC.REV.XGRT.GD.ZS", "Recettes_publiques_PIB"),
    ("GC.XPN.TOTL.GD.ZS", "Depenses_publiques_PIB"),
    ("BN.CAB.XOKA.GD.ZS", "BalanceCourante_PIB"),
    ("FI.RES.TOTL.CD", "Reserves_change_$"),
    ("NE.IMP.GNFS.CD", "Importations_$"),
    ("GC.DOD.TOTL.GD.ZS", "Dette_publique_PIB"),
];

/// Governance indicators fetched from the remote API, as (code, column).
pub const REMOTE_GOVERNANCE: &[(&str, &str)] = &[
    ("PV.EST", "Stabilite_Politique"),
    ("GE.EST", "Efficacite_Gouvernement"),
    ("CC.EST", "Corruption"),
    ("RL.EST", "Etat_de_droit"),
    ("VA.EST", "Voix_responsabilisation"),
];

/// Columns produced by both sources. The local column wins and is renamed to
/// the canonical name; the remote column of that name is dropped.
/// Entries are (local column, canonical column).
pub const LOCAL_PRECEDENCE: &[(&str, &str)] = &[
    ("Dette_publique_PIB", "Dette_publique_PIB"),
    ("Depenses_publiques", "Depenses_publiques_PIB"),
    ("Recettes_publiques", "Recettes_publiques_PIB"),
    ("Balance_courante_PIB", "BalanceCourante_PIB"),
];

pub const RESERVES: &str = "Reserves_change_$";
pub const IMPORTS: &str = "Importations_$";
pub const GROWTH: &str = "Croissance_PIB";
pub const INFLATION: &str = "Inflation";
pub const DEBT: &str = "Dette_publique_PIB";

pub const RESERVES_TO_IMPORTS: &str = "Reserves_sur_Importations";
pub const GROWTH_VOLATILITY: &str = "Volatilite_Croissance";
pub const INFLATION_VOLATILITY: &str = "Volatilite_Inflation";

/// Raw features standardized by the scorer, in output order.
pub const FEATURES: &[&str] = &[
    "PIB_par_habitant",
    "Croissance_PIB",
    "Inflation",
    "Deficit_budgetaire_PIB",
    "Recettes_publiques_PIB",
    "Depenses_publiques_PIB",
    "BalanceCourante_PIB",
    "Reserves_sur_Importations",
    "Stabilite_Politique",
    "Efficacite_Gouvernement",
    "Corruption",
    "Etat_de_droit",
    "Voix_responsabilisation",
    "Volatilite_Croissance",
    "Volatilite_Inflation",
    "Dette_publique_PIB",
    "Solde_budgetaire_PIB",
    "Balance_commerciale",
    "PIB_total_$",
];

/// Indicators whose full-history trend feeds the rule-based outlook.
pub const TREND_INDICATORS: &[&str] = &[GROWTH, DEBT, INFLATION, RESERVES_TO_IMPORTS];

/// Indicators accepted by the time-series view.
pub const VALID_INDICATORS: &[&str] = &[
    "BalanceCourante_PIB",
    "Corruption",
    "Croissance_PIB",
    "Depenses_publiques_PIB",
    "Dette_publique_PIB",
    "Efficacite_Gouvernement",
    "Etat_de_droit",
    "Importations_$",
    "Inflation",
    "PIB_par_habitant",
    "PIB_total_$",
    "Recettes_publiques_PIB",
    "Reserves_change_$",
    "Stabilite_Politique",
    "Voix_responsabilisation",
    "Reserves_sur_Importations",
    "Volatilite_Croissance",
    "Volatilite_Inflation",
];

/// Name of the standardized column for a raw feature.
pub fn z_column(feature: &str) -> String {
    format!("{}_z", feature)
}

/// Every remote indicator, macro first, as (code, column).
pub fn remote_indicators() -> impl Iterator<Item = (&'static str, &'static str)> {
    REMOTE_MACRO.iter().chain(REMOTE_GOVERNANCE.iter()).copied()
}

pub fn is_valid_indicator(name: &str) -> bool {
    VALID_INDICATORS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_list_has_nineteen_unique_entries() {
        let mut seen = std::collections::HashSet::new();
        for f in FEATURES {
            assert!(seen.insert(*f), "duplicate feature {}", f);
        }
        assert_eq!(FEATURES.len(), 19);
    }

    #[test]
    fn sixteen_remote_indicators() {
        assert_eq!(remote_indicators().count(), 16);
    }

    #[test]
    fn precedence_targets_are_remote_columns() {
        for (_, canonical) in LOCAL_PRECEDENCE {
            assert!(remote_indicators().any(|(_, col)| col == *canonical));
        }
    }

    #[test]
    fn z_column_appends_suffix() {
        assert_eq!(z_column("PIB_total_$"), "PIB_total_$_z");
    }
}
