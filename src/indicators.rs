//! Secondary risk indicators derived from raw patient fields.
//!
//! Fixed clinical thresholds, no configuration. Everything here is a pure
//! function of its input.

use serde::Serialize;

use crate::models::{PatientRecord, RiskLabel};

// ═══════════════════════════════════════════════════════════
// Thresholds
// ═══════════════════════════════════════════════════════════

/// Age above which risk is elevated (years, exclusive).
pub const AGE_ELEVATED_ABOVE: u8 = 45;
/// BMI above which a patient is overweight (exclusive).
pub const BMI_OVERWEIGHT_ABOVE: f64 = 25.0;
/// BMI above which a patient is obese (exclusive).
pub const BMI_OBESE_ABOVE: f64 = 30.0;
/// HbA1c above which the level is borderline (percent, exclusive).
pub const A1C_BORDERLINE_ABOVE: f64 = 5.6;
/// HbA1c above which the level is high (percent, exclusive).
pub const A1C_HIGH_ABOVE: f64 = 6.4;
/// HbA1c from which the reference band is prediabetes (percent, inclusive).
pub const A1C_PREDIABETES_FROM: f64 = 5.7;
/// HbA1c from which the reference band is diabetes (percent, inclusive).
pub const A1C_DIABETES_FROM: f64 = 6.5;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeRisk {
    Normal,
    Elevated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiStatus {
    Normal,
    Overweight,
    Obese,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum A1cStatus {
    Normal,
    Borderline,
    High,
}

/// HbA1c reference band (ADA diagnostic ranges).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum A1cBand {
    /// Below 5.7%
    Normal,
    /// 5.7% to 6.4%
    Prediabetes,
    /// 6.5% and above
    Diabetes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskIndicators {
    pub age_risk: AgeRisk,
    pub bmi_status: BmiStatus,
    pub a1c_status: A1cStatus,
}

/// One recommended follow-up shown next to a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionItem {
    pub title: &'static str,
    pub description: &'static str,
}

impl AgeRisk {
    pub fn label(self) -> &'static str {
        match self {
            AgeRisk::Normal => "Normal",
            AgeRisk::Elevated => "Elevated",
        }
    }
}

impl BmiStatus {
    pub fn label(self) -> &'static str {
        match self {
            BmiStatus::Normal => "Normal",
            BmiStatus::Overweight => "Overweight",
            BmiStatus::Obese => "Obese",
        }
    }
}

impl A1cStatus {
    pub fn label(self) -> &'static str {
        match self {
            A1cStatus::Normal => "Normal",
            A1cStatus::Borderline => "Borderline",
            A1cStatus::High => "High",
        }
    }
}

impl A1cBand {
    pub fn label(self) -> &'static str {
        match self {
            A1cBand::Normal => "Normal",
            A1cBand::Prediabetes => "Prediabetes",
            A1cBand::Diabetes => "Diabetes",
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Derivation
// ═══════════════════════════════════════════════════════════

pub fn age_risk(age: u8) -> AgeRisk {
    if age > AGE_ELEVATED_ABOVE {
        AgeRisk::Elevated
    } else {
        AgeRisk::Normal
    }
}

pub fn bmi_status(bmi: f64) -> BmiStatus {
    if bmi > BMI_OBESE_ABOVE {
        BmiStatus::Obese
    } else if bmi > BMI_OVERWEIGHT_ABOVE {
        BmiStatus::Overweight
    } else {
        BmiStatus::Normal
    }
}

pub fn a1c_status(hba1c: f64) -> A1cStatus {
    if hba1c > A1C_HIGH_ABOVE {
        A1cStatus::High
    } else if hba1c > A1C_BORDERLINE_ABOVE {
        A1cStatus::Borderline
    } else {
        A1cStatus::Normal
    }
}

pub fn a1c_band(hba1c: f64) -> A1cBand {
    if hba1c >= A1C_DIABETES_FROM {
        A1cBand::Diabetes
    } else if hba1c >= A1C_PREDIABETES_FROM {
        A1cBand::Prediabetes
    } else {
        A1cBand::Normal
    }
}

/// Derive all three indicators for a record.
pub fn derive_indicators(record: &PatientRecord) -> RiskIndicators {
    RiskIndicators {
        age_risk: age_risk(record.age()),
        bmi_status: bmi_status(record.bmi()),
        a1c_status: a1c_status(record.hba1c_level()),
    }
}

const HIGH_RISK_ACTIONS: [ActionItem; 3] = [
    ActionItem {
        title: "High Blood Glucose",
        description: "Fasting glucose > 126 mg/dL",
    },
    ActionItem {
        title: "Elevated HbA1c",
        description: "A1c level > 6.5%",
    },
    ActionItem {
        title: "Medical Review",
        description: "Consult healthcare provider",
    },
];

const LOW_RISK_ACTIONS: [ActionItem; 3] = [
    ActionItem {
        title: "Normal Glucose",
        description: "Fasting glucose < 100 mg/dL",
    },
    ActionItem {
        title: "Healthy A1c",
        description: "A1c level < 5.7%",
    },
    ActionItem {
        title: "Continue Monitoring",
        description: "Annual screening recommended",
    },
];

/// Fixed follow-up list for a prediction label.
pub fn derive_action_items(label: RiskLabel) -> &'static [ActionItem; 3] {
    match label {
        RiskLabel::High => &HIGH_RISK_ACTIONS,
        RiskLabel::Low => &LOW_RISK_ACTIONS,
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
