use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::Display;
use thiserror::Error;

/// Container format carrying a price list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    #[default]
    Zip,
    Tar,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported archive type: {0}")]
pub struct UnsupportedArchiveKind(pub String);

impl ArchiveKind {
    /// File extension used when naming a packed container.
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Tar => "tar",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ArchiveKind::Zip => "application/zip",
            ArchiveKind::Tar => "application/x-tar",
        }
    }
}

impl FromStr for ArchiveKind {
    type Err = UnsupportedArchiveKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zip" => Ok(ArchiveKind::Zip),
            "tar" => Ok(ArchiveKind::Tar),
            other => Err(UnsupportedArchiveKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_kinds_only() {
        assert_eq!("zip".parse::<ArchiveKind>(), Ok(ArchiveKind::Zip));
        assert_eq!("tar".parse::<ArchiveKind>(), Ok(ArchiveKind::Tar));
        assert!("rar".parse::<ArchiveKind>().is_err());
        assert!("ZIP".parse::<ArchiveKind>().is_err());
        assert_eq!(ArchiveKind::default(), ArchiveKind::Zip);
        assert_eq!(ArchiveKind::Tar.to_string(), "tar");
    }
}
