use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default batch size for multi-row inserts.
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Named volume presets plus the caller-defined `custom` size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SeedSize {
    Small,
    Medium,
    Large,
    Stress,
    Custom,
}

impl SeedSize {
    pub const ALL: [SeedSize; 5] = [
        SeedSize::Small,
        SeedSize::Medium,
        SeedSize::Large,
        SeedSize::Stress,
        SeedSize::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeedSize::Small => "small",
            SeedSize::Medium => "medium",
            SeedSize::Large => "large",
            SeedSize::Stress => "stress",
            SeedSize::Custom => "custom",
        }
    }
}

impl fmt::Display for SeedSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeedSize {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "small" => Ok(SeedSize::Small),
            "medium" => Ok(SeedSize::Medium),
            "large" => Ok(SeedSize::Large),
            "stress" => Ok(SeedSize::Stress),
            "custom" => Ok(SeedSize::Custom),
            other => Err(Error::Configuration(format!("unknown seed size '{other}'"))),
        }
    }
}

/// Target record counts per entity plus the insert batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeedProfile {
    pub products_count: usize,
    pub clients_count: usize,
    pub entries_count: usize,
    pub distributions_count: usize,
    pub sales_count: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl SeedProfile {
    const fn new(
        products_count: usize,
        clients_count: usize,
        entries_count: usize,
        distributions_count: usize,
        sales_count: usize,
        batch_size: usize,
    ) -> Self {
        Self {
            products_count,
            clients_count,
            entries_count,
            distributions_count,
            sales_count,
            batch_size,
        }
    }

    /// Preset for a named size. `Custom` starts from the medium preset.
    pub fn preset(size: SeedSize) -> Self {
        match size {
            SeedSize::Small => Self::new(50, 20, 20, 15, 30, DEFAULT_BATCH_SIZE),
            SeedSize::Medium | SeedSize::Custom => {
                Self::new(500, 100, 200, 150, 300, DEFAULT_BATCH_SIZE)
            }
            SeedSize::Large => Self::new(5000, 1000, 2000, 1500, 3000, DEFAULT_BATCH_SIZE),
            SeedSize::Stress => Self::new(50000, 10000, 20000, 15000, 30000, 1000),
        }
    }

    /// Resolve the profile for a run. Overrides only apply to `Custom`.
    pub fn resolve(size: SeedSize, overrides: &ProfileOverrides) -> Result<Self, Error> {
        let mut profile = Self::preset(size);
        if size != SeedSize::Custom {
            return Ok(profile);
        }

        if let Some(value) = overrides.products_count {
            profile.products_count = value;
        }
        if let Some(value) = overrides.clients_count {
            profile.clients_count = value;
        }
        if let Some(value) = overrides.entries_count {
            profile.entries_count = value;
        }
        if let Some(value) = overrides.distributions_count {
            profile.distributions_count = value;
        }
        if let Some(value) = overrides.sales_count {
            profile.sales_count = value;
        }
        if let Some(value) = overrides.batch_size {
            profile.batch_size = value;
        }

        if profile.batch_size == 0 {
            return Err(Error::Configuration(
                "batch_size must be greater than zero".to_string(),
            ));
        }

        Ok(profile)
    }
}

/// Per-entity overrides for the `custom` profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProfileOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clients_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distributions_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
}

impl ProfileOverrides {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(&self, other: &ProfileOverrides) -> ProfileOverrides {
        ProfileOverrides {
            products_count: other.products_count.or(self.products_count),
            clients_count: other.clients_count.or(self.clients_count),
            entries_count: other.entries_count.or(self.entries_count),
            distributions_count: other.distributions_count.or(self.distributions_count),
            sales_count: other.sales_count.or(self.sales_count),
            batch_size: other.batch_size.or(self.batch_size),
        }
    }
}
