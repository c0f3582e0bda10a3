use crate::intelligence::InterpretError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InterpretError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InterpretError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// Variant order is the severity order: Normal < Borderline < Abnormal.
str_enum!(Tier {
    Normal => "normal",
    Borderline => "borderline",
    Abnormal => "abnormal",
});

impl Tier {
    /// Capitalized label used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Borderline => "Borderline",
            Self::Abnormal => "Abnormal",
        }
    }

    pub fn is_normal(&self) -> bool {
        *self == Self::Normal
    }
}

str_enum!(Gender {
    Male => "male",
    Female => "female",
    Default => "default",
});

impl Default for Gender {
    fn default() -> Self {
        Self::Default
    }
}

str_enum!(AgeGroup {
    Adult => "adult",
    Child => "child",
    Default => "default",
});

impl Default for AgeGroup {
    fn default() -> Self {
        Self::Default
    }
}

/// Age below which the child reference strata apply.
pub const ADULT_AGE_YEARS: u32 = 18;

impl AgeGroup {
    pub fn from_years(age: u32) -> Self {
        if age < ADULT_AGE_YEARS {
            Self::Child
        } else {
            Self::Adult
        }
    }
}

// Urgent entries are listed first in a report.
str_enum!(Priority {
    Urgent => "urgent",
    Consult => "consult",
    Monitor => "monitor",
});

str_enum!(SkipReason {
    EmptyName => "empty_name",
    NonNumeric => "non_numeric",
    NonFinite => "non_finite",
    Negative => "negative",
    ImplausiblyLarge => "implausibly_large",
});
