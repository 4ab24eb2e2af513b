//! Continuity-risk classification rule
//!
//! One pure function decides the derived fields of a substitution plan and
//! its mirrored succession record. Plan creation, plan update and the sync
//! routine all go through [`classify_replacement`] so the two tables can
//! never diverge on how a replacement value is judged.
//!
//! # Rule
//!
//! A replacement is valid when, after trimming, it is non-empty and its
//! uppercase form is not `NO APLICA`. Valid replacement means low risk;
//! anything else marks the position critical with high risk and priority.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Continuity risk level (`riesgo_continuidad`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Riesgo {
    Alto,
    Medio,
    Bajo,
}

/// Succession priority (`prioridad_sucesion`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prioridad {
    Alta,
    Media,
    Baja,
}

impl Riesgo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Riesgo::Alto => "Alto",
            Riesgo::Medio => "Medio",
            Riesgo::Bajo => "Bajo",
        }
    }
}

impl Prioridad {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prioridad::Alta => "Alta",
            Prioridad::Media => "Media",
            Prioridad::Baja => "Baja",
        }
    }
}

impl fmt::Display for Riesgo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Prioridad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Riesgo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Alto" => Ok(Riesgo::Alto),
            "Medio" => Ok(Riesgo::Medio),
            "Bajo" => Ok(Riesgo::Bajo),
            other => Err(format!("Nivel de riesgo desconocido: {}", other)),
        }
    }
}

impl FromStr for Prioridad {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Alta" => Ok(Prioridad::Alta),
            "Media" => Ok(Prioridad::Media),
            "Baja" => Ok(Prioridad::Baja),
            other => Err(format!("Prioridad desconocida: {}", other)),
        }
    }
}

/// Derived risk fields for a plan or succession record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub riesgo: Riesgo,
    pub prioridad: Prioridad,
    /// `Si` when the position has no valid replacement
    pub critico: bool,
}

impl RiskProfile {
    /// `critico` column value (`Si`/`No`)
    pub fn critico_str(&self) -> &'static str {
        if self.critico {
            "Si"
        } else {
            "No"
        }
    }
}

/// True when the replacement field names an actual replacement
///
/// # Examples
///
/// ```
/// use relevo_common::risk::has_valid_replacement;
///
/// assert!(has_valid_replacement("Maria Garcia"));
/// assert!(!has_valid_replacement(""));
/// assert!(!has_valid_replacement("   "));
/// assert!(!has_valid_replacement("no aplica"));
/// assert!(!has_valid_replacement("  NO APLICA  "));
/// ```
pub fn has_valid_replacement(reemplazo: &str) -> bool {
    let trimmed = reemplazo.trim();
    !trimmed.is_empty() && trimmed.to_uppercase() != "NO APLICA"
}

/// Classify a replacement value into the derived risk fields
///
/// Valid replacement → Bajo/Baja/No; missing or `NO APLICA` → Alto/Alta/Si.
pub fn classify_replacement(reemplazo: &str) -> RiskProfile {
    if has_valid_replacement(reemplazo) {
        RiskProfile {
            riesgo: Riesgo::Bajo,
            prioridad: Prioridad::Baja,
            critico: false,
        }
    } else {
        RiskProfile {
            riesgo: Riesgo::Alto,
            prioridad: Prioridad::Alta,
            critico: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_replacement_is_high_risk() {
        let profile = classify_replacement("");
        assert_eq!(profile.riesgo, Riesgo::Alto);
        assert_eq!(profile.prioridad, Prioridad::Alta);
        assert!(profile.critico);
        assert_eq!(profile.critico_str(), "Si");
    }

    #[test]
    fn test_whitespace_only_is_high_risk() {
        let profile = classify_replacement("   \t ");
        assert_eq!(profile.riesgo, Riesgo::Alto);
        assert!(profile.critico);
    }

    #[test]
    fn test_no_aplica_is_high_risk_any_case() {
        for value in ["NO APLICA", "no aplica", "No Aplica", "  no APLICA  "] {
            let profile = classify_replacement(value);
            assert_eq!(profile.riesgo, Riesgo::Alto, "value: {:?}", value);
            assert_eq!(profile.prioridad, Prioridad::Alta);
            assert!(profile.critico);
        }
    }

    #[test]
    fn test_named_replacement_is_low_risk() {
        let profile = classify_replacement("Maria Garcia");
        assert_eq!(profile.riesgo, Riesgo::Bajo);
        assert_eq!(profile.prioridad, Prioridad::Baja);
        assert!(!profile.critico);
        assert_eq!(profile.critico_str(), "No");
    }

    #[test]
    fn test_replacement_containing_no_aplica_is_valid() {
        // Only the exact phrase (after trim) disqualifies
        let profile = classify_replacement("NO APLICA - pendiente de revision");
        assert_eq!(profile.riesgo, Riesgo::Bajo);
    }

    #[test]
    fn test_level_round_trip() {
        for riesgo in [Riesgo::Alto, Riesgo::Medio, Riesgo::Bajo] {
            assert_eq!(riesgo.as_str().parse::<Riesgo>().unwrap(), riesgo);
        }
        for prioridad in [Prioridad::Alta, Prioridad::Media, Prioridad::Baja] {
            assert_eq!(prioridad.as_str().parse::<Prioridad>().unwrap(), prioridad);
        }
    }

    #[test]
    fn test_unknown_level_rejected() {
        assert!("Critico".parse::<Riesgo>().is_err());
        assert!("Urgente".parse::<Prioridad>().is_err());
    }
}
