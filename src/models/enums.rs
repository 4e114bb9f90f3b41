use serde::{Deserialize, Serialize};

/// Raised when a string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value for {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Macro to generate enum with as_str + label + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => ($s:literal, $label:literal)),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            /// Machine name, as used on the wire.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// Human-readable label, as shown in exports and reports.
            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        kind: stringify!($name),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Gender {
    Female => ("female", "Female"),
    Male => ("male", "Male"),
});

str_enum!(SmokingHistory {
    Never => ("never", "Never"),
    Current => ("current", "Current"),
    Former => ("former", "Former"),
    Ever => ("ever", "Ever"),
    NotCurrent => ("not_current", "Not Current"),
});

str_enum!(PatientField {
    Gender => ("gender", "Gender"),
    Age => ("age", "Age"),
    Hypertension => ("hypertension", "Hypertension"),
    HeartDisease => ("heart_disease", "Heart Disease"),
    Bmi => ("bmi", "BMI"),
    Hba1cLevel => ("HbA1c_level", "HbA1c Level"),
    BloodGlucoseLevel => ("blood_glucose_level", "Blood Glucose"),
    SmokingHistory => ("smoking_history", "Smoking Status"),
});

impl Gender {
    /// Wire code: female = 0, male = 1.
    pub fn code(self) -> u8 {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Gender::Female),
            1 => Some(Gender::Male),
            _ => None,
        }
    }
}

impl SmokingHistory {
    /// Selection order offered to the user.
    pub const ALL: [SmokingHistory; 5] = [
        SmokingHistory::Never,
        SmokingHistory::Current,
        SmokingHistory::Former,
        SmokingHistory::Ever,
        SmokingHistory::NotCurrent,
    ];

    /// Resolution order when a flat flag set carries more than one flag.
    /// First set flag wins; an empty set resolves to `Never`.
    pub const PRECEDENCE: [SmokingHistory; 5] = [
        SmokingHistory::Current,
        SmokingHistory::Former,
        SmokingHistory::Ever,
        SmokingHistory::NotCurrent,
        SmokingHistory::Never,
    ];
}
