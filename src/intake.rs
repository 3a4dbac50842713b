use std::ops::RangeInclusive;

use anyhow::Result;
use postura_vision::report::patient_label;

pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 50.0..=250.0;

/// Patient details entered alongside the photograph.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub name: String,
    pub height_cm: f64,
}

impl Patient {
    pub fn new(name: Option<&str>, height_cm: f64) -> Result<Self> {
        if !HEIGHT_RANGE_CM.contains(&height_cm) {
            anyhow::bail!(
                "height must be between {} and {} cm, got {}",
                HEIGHT_RANGE_CM.start(),
                HEIGHT_RANGE_CM.end(),
                height_cm
            );
        }
        Ok(Self {
            name: patient_label(name.unwrap_or_default()),
            height_cm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_bounds() {
        assert!(Patient::new(None, 50.0).is_ok());
        assert!(Patient::new(None, 250.0).is_ok());
        assert!(Patient::new(None, 49.9).is_err());
        assert!(Patient::new(None, 250.1).is_err());
        assert!(Patient::new(None, f64::NAN).is_err());
    }

    #[test]
    fn test_blank_name_is_anonymous() {
        assert_eq!(Patient::new(None, 170.0).unwrap().name, "Anonyme");
        assert_eq!(Patient::new(Some("  "), 170.0).unwrap().name, "Anonyme");
        assert_eq!(Patient::new(Some("Jean Dupont"), 170.0).unwrap().name, "Jean Dupont");
    }
}
