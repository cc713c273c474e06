//! Store roles and sync direction.
//!
//! The dashboard always talks to exactly two stores, "stage" and "prod".
//! A [`SyncDirection`] picks which of them is read from and which is
//! written to for one request.

use serde::{Deserialize, Serialize};

/// Role of a configured store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreRole {
    /// The staging store.
    Stage,
    /// The production store.
    Prod,
}

impl std::fmt::Display for StoreRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stage => write!(f, "stage"),
            Self::Prod => write!(f, "prod"),
        }
    }
}

impl std::str::FromStr for StoreRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stage" | "staging" => Ok(Self::Stage),
            "prod" | "production" => Ok(Self::Prod),
            _ => Err(format!("invalid store role: {s}")),
        }
    }
}

/// Direction of a sync.
///
/// Serialized as `"stage-to-prod"` / `"prod-to-stage"`, which is what the
/// dashboard front end sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SyncDirection {
    /// Read from stage, write to prod.
    #[default]
    #[serde(rename = "stage-to-prod")]
    StageToProd,
    /// Read from prod, write to stage.
    #[serde(rename = "prod-to-stage")]
    ProdToStage,
}

impl SyncDirection {
    /// Role read from.
    #[must_use]
    pub const fn source_role(self) -> StoreRole {
        match self {
            Self::StageToProd => StoreRole::Stage,
            Self::ProdToStage => StoreRole::Prod,
        }
    }

    /// Role written to.
    #[must_use]
    pub const fn target_role(self) -> StoreRole {
        match self {
            Self::StageToProd => StoreRole::Prod,
            Self::ProdToStage => StoreRole::Stage,
        }
    }

    /// Wire form of the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StageToProd => "stage-to-prod",
            Self::ProdToStage => "prod-to-stage",
        }
    }

    /// Human-readable arrow form used in report messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::StageToProd => "Staging → Production",
            Self::ProdToStage => "Production → Staging",
        }
    }
}

impl std::fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SyncDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stage-to-prod" => Ok(Self::StageToProd),
            "prod-to-stage" => Ok(Self::ProdToStage),
            _ => Err(format!("invalid sync direction: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_roles_are_swapped() {
        let forward = SyncDirection::StageToProd;
        let backward = SyncDirection::ProdToStage;

        assert_eq!(forward.source_role(), backward.target_role());
        assert_eq!(forward.target_role(), backward.source_role());
        assert_eq!(forward.source_role(), StoreRole::Stage);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(
            "stage-to-prod".parse::<SyncDirection>().unwrap(),
            SyncDirection::StageToProd
        );
        assert_eq!(
            " Prod-To-Stage ".parse::<SyncDirection>().unwrap(),
            SyncDirection::ProdToStage
        );
        assert!("sideways".parse::<SyncDirection>().is_err());
    }

    #[test]
    fn test_direction_serde_uses_wire_names() {
        let json = serde_json::to_string(&SyncDirection::ProdToStage).unwrap();
        assert_eq!(json, "\"prod-to-stage\"");

        let parsed: SyncDirection = serde_json::from_str("\"stage-to-prod\"").unwrap();
        assert_eq!(parsed, SyncDirection::StageToProd);
    }

    #[test]
    fn test_default_direction() {
        assert_eq!(SyncDirection::default(), SyncDirection::StageToProd);
    }

    #[test]
    fn test_role_parse_accepts_long_names() {
        assert_eq!("production".parse::<StoreRole>().unwrap(), StoreRole::Prod);
        assert_eq!("stage".parse::<StoreRole>().unwrap(), StoreRole::Stage);
        assert!("dev".parse::<StoreRole>().is_err());
    }
}
