use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::foundation::error::{ComposeError, ComposeResult};

/// Output frame size, written `"<width>x<height>"` on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> ComposeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ComposeError::invalid_resolution(format!(
                "width/height must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ComposeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('x').collect();
        let [w, h] = parts.as_slice() else {
            return Err(ComposeError::invalid_resolution(format!(
                "'{s}' must have the form <width>x<height>"
            )));
        };

        // `u32::from_str` alone would accept a leading `+`.
        let parse = |part: &str, what: &str| {
            let non_numeric =
                || ComposeError::invalid_resolution(format!("'{s}' has a non-numeric {what}"));
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(non_numeric());
            }
            part.parse::<u32>().map_err(|_| non_numeric())
        };
        Self::new(parse(*w, "width")?, parse(*h, "height")?)
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_width_by_height() {
        let r: Resolution = "1920x1080".parse().unwrap();
        assert_eq!(r, Resolution::new(1920, 1080).unwrap());
        assert_eq!(r.to_string(), "1920x1080");
    }

    #[test]
    fn default_is_720p() {
        assert_eq!(Resolution::default().to_string(), "1280x720");
    }

    #[test]
    fn rejects_missing_or_extra_separators() {
        for bad in ["1280", "1280x720x2", "", "x"] {
            assert!(bad.parse::<Resolution>().is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn rejects_non_positive_and_non_numeric() {
        for bad in [
            "0x720",
            "1280x0",
            "-1x720",
            "wide x tall",
            "1280X720",
            " 1280x720",
            "+1280x720",
            "1280x+720",
            "99999999999x720",
        ] {
            assert!(bad.parse::<Resolution>().is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn serde_uses_string_form() {
        let r: Resolution = serde_json::from_str("\"640x480\"").unwrap();
        assert_eq!(r.width, 640);
        assert_eq!(serde_json::to_string(&r).unwrap(), "\"640x480\"");
        assert!(serde_json::from_str::<Resolution>("\"640\"").is_err());
    }
}
