use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
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

str_enum!(Gender {
    Male => "Male",
    Female => "Female",
    Other => "Other",
    Unspecified => "Unspecified",
});

str_enum!(Modality {
    XRay => "X-ray",
    Mri => "MRI",
    Ct => "CT scan",
    Ultrasound => "Ultrasound",
    Microscopy => "Microscopy",
    Other => "Other medical image",
});

str_enum!(AnatomicalRegion {
    Brain => "Brain",
    Chest => "Chest",
    Abdomen => "Abdomen",
    Pelvis => "Pelvis",
    Spine => "Spine",
    Extremity => "Extremity",
    Cardiac => "Cardiac",
    Other => "Other",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn modality_round_trips_through_str() {
        for m in [
            Modality::XRay,
            Modality::Mri,
            Modality::Ct,
            Modality::Ultrasound,
            Modality::Microscopy,
            Modality::Other,
        ] {
            assert_eq!(Modality::from_str(m.as_str()).unwrap(), m);
        }
    }

    #[test]
    fn unknown_value_is_rejected_with_field_name() {
        let err = Gender::from_str("N/A").unwrap_err();
        match err {
            ModelError::InvalidEnum { field, value } => {
                assert_eq!(field, "Gender");
                assert_eq!(value, "N/A");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
