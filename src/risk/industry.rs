//! Industry sub-score, looked up from a fixed per-sector table.
//!
//! Sector names outside the table are scored with the agriculture profile.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{EstimateError, RiskComponent, RiskLevel, SubScore};

/// Factor added when an unknown sector is scored as agriculture.
pub const FALLBACK_FACTOR: &str = "unknown sector, agriculture profile assumed";

/// Sectors SafeBridge has hazard profiles for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Agriculture,
    Fishery,
    Construction,
    Manufacturing,
}

/// Static hazard profile of a sector.
#[derive(Debug, PartialEq, Eq)]
pub struct SectorProfile {
    pub base_risk: RiskLevel,
    pub seasonal_risks: &'static [&'static str],
    pub equipment_risks: &'static [&'static str],
    pub recommendations: &'static [&'static str],
}

static AGRICULTURE: SectorProfile = SectorProfile {
    base_risk: RiskLevel::Moderate,
    seasonal_risks: &["heat wave", "drought", "pests"],
    equipment_risks: &["farm machinery accidents", "chemical exposure"],
    recommendations: &[
        "take regular breaks",
        "wear protective equipment",
        "inspect farm machinery",
    ],
};

static FISHERY: SectorProfile = SectorProfile {
    base_risk: RiskLevel::High,
    seasonal_risks: &["typhoon", "rough seas", "strong tidal currents"],
    equipment_risks: &["vessel accidents", "fishing gear accidents", "drowning"],
    recommendations: &[
        "check the weather",
        "wear a life jacket",
        "inspect communication equipment",
    ],
};

static CONSTRUCTION: SectorProfile = SectorProfile {
    base_risk: RiskLevel::High,
    seasonal_risks: &["heat wave", "strong wind", "icing"],
    equipment_risks: &["falls", "heavy machinery accidents", "electrocution"],
    recommendations: &[
        "wear a hard hat",
        "wear a safety harness",
        "inspect equipment",
    ],
};

static MANUFACTURING: SectorProfile = SectorProfile {
    base_risk: RiskLevel::Moderate,
    seasonal_risks: &["power outage", "fire"],
    equipment_risks: &["machinery accidents", "chemical exposure", "fire"],
    recommendations: &[
        "wear protective equipment",
        "perform regular inspections",
        "know the emergency plan",
    ],
};

impl Sector {
    pub const ALL: [Self; 4] = [
        Self::Agriculture,
        Self::Fishery,
        Self::Construction,
        Self::Manufacturing,
    ];

    #[must_use]
    pub fn profile(self) -> &'static SectorProfile {
        match self {
            Self::Agriculture => &AGRICULTURE,
            Self::Fishery => &FISHERY,
            Self::Construction => &CONSTRUCTION,
            Self::Manufacturing => &MANUFACTURING,
        }
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agriculture => write!(f, "agriculture"),
            Self::Fishery => write!(f, "fishery"),
            Self::Construction => write!(f, "construction"),
            Self::Manufacturing => write!(f, "manufacturing"),
        }
    }
}

impl std::str::FromStr for Sector {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "agriculture" | "farming" => Ok(Self::Agriculture),
            "fishery" | "fisheries" | "fishing" => Ok(Self::Fishery),
            "construction" => Ok(Self::Construction),
            "manufacturing" => Ok(Self::Manufacturing),
            _ => Err(EstimateError::UnknownSector(s.to_string())),
        }
    }
}

/// Scores a known sector. Never falls back.
#[must_use]
pub fn estimate_sector(sector: Sector) -> SubScore {
    let profile = sector.profile();
    SubScore::measured(RiskComponent::Industry, profile.base_risk)
        .with_factors(profile.seasonal_risks.iter().map(|s| s.to_string()).collect())
        .with_recommendations(
            profile
                .recommendations
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
}

/// Scores a sector by name.
///
/// # Errors
///
/// Returns [`EstimateError::UnknownSector`] if the name matches no profile.
pub fn try_estimate_industry(sector: &str) -> Result<SubScore, EstimateError> {
    let sector: Sector = sector.parse()?;
    Ok(estimate_sector(sector))
}

/// Scores a sector by name, using the agriculture profile for unknown
/// sectors.
#[must_use]
pub fn estimate_industry(sector: &str) -> SubScore {
    match try_estimate_industry(sector) {
        Ok(score) => score,
        Err(e) => {
            warn!("{}, scoring as agriculture", e);
            let mut score = estimate_sector(Sector::Agriculture);
            score.factors.insert(0, FALLBACK_FACTOR.to_string());
            score
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_risk_table() {
        assert_eq!(Sector::Fishery.profile().base_risk, RiskLevel::High);
        assert_eq!(Sector::Construction.profile().base_risk, RiskLevel::High);
        assert_eq!(Sector::Agriculture.profile().base_risk, RiskLevel::Moderate);
        assert_eq!(Sector::Manufacturing.profile().base_risk, RiskLevel::Moderate);
    }

    #[test]
    fn test_every_sector_has_three_recommendations() {
        for sector in Sector::ALL {
            assert_eq!(sector.profile().recommendations.len(), 3, "{}", sector);
            assert!(!sector.profile().seasonal_risks.is_empty(), "{}", sector);
        }
    }

    #[test]
    fn test_estimate_fishery() {
        let score = estimate_industry("fishery");
        assert_eq!(score.score, RiskLevel::High);
        assert!(score.data_available);
        assert_eq!(score.factors, vec!["typhoon", "rough seas", "strong tidal currents"]);
        assert_eq!(score.recommendations[1], "wear a life jacket");
    }

    #[test]
    fn test_sector_aliases() {
        assert_eq!("Farming".parse::<Sector>(), Ok(Sector::Agriculture));
        assert_eq!(" fishing ".parse::<Sector>(), Ok(Sector::Fishery));
        assert_eq!("CONSTRUCTION".parse::<Sector>(), Ok(Sector::Construction));
    }

    #[test]
    fn test_unknown_sector_falls_back() {
        let err = try_estimate_industry("mining").unwrap_err();
        assert_eq!(err, EstimateError::UnknownSector("mining".into()));

        let score = estimate_industry("mining");
        assert!(!score.is_insufficient());
        assert!(score.data_available);
        assert_eq!(score.score, RiskLevel::Moderate);
        assert_eq!(score.factors[0], FALLBACK_FACTOR);
        assert_eq!(
            score.recommendations,
            estimate_sector(Sector::Agriculture).recommendations
        );
    }

    #[test]
    fn test_sector_display_round_trips_through_parse() {
        for sector in Sector::ALL {
            assert_eq!(sector.to_string().parse::<Sector>(), Ok(sector));
        }
    }
}
