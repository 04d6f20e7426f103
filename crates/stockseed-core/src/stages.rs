use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Named step of the seed pipeline.
///
/// Variant order is the canonical execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Products,
    Clients,
    Entries,
    Distributions,
    Sales,
}

impl StageName {
    pub const ALL: [StageName; 5] = [
        StageName::Products,
        StageName::Clients,
        StageName::Entries,
        StageName::Distributions,
        StageName::Sales,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Products => "products",
            StageName::Clients => "clients",
            StageName::Entries => "entries",
            StageName::Distributions => "distributions",
            StageName::Sales => "sales",
        }
    }

    /// Display label used by presentation layers.
    pub fn label(&self) -> &'static str {
        match self {
            StageName::Products => "Produtos",
            StageName::Clients => "Clientes",
            StageName::Entries => "Entradas",
            StageName::Distributions => "Distribuições",
            StageName::Sales => "Vendas",
        }
    }

    /// Stages that must have run before this one.
    pub fn dependencies(&self) -> &'static [StageName] {
        STAGE_DEPENDENCIES
            .iter()
            .find(|(stage, _)| stage == self)
            .map(|(_, deps)| *deps)
            .unwrap_or(&[])
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageName {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_lowercase();
        StageName::ALL
            .into_iter()
            .find(|stage| stage.as_str() == value)
            .ok_or(Error::UnknownStage(value))
    }
}

/// `stage -> stages it reads from`. Stages absent here have no dependencies.
pub const STAGE_DEPENDENCIES: &[(StageName, &[StageName])] = &[
    (StageName::Entries, &[StageName::Products]),
    (StageName::Distributions, &[StageName::Products]),
    (StageName::Sales, &[StageName::Products, StageName::Clients]),
];

/// Filter the canonical order down to `selected`, dropping duplicates.
pub fn order_selection(selected: &[StageName]) -> Vec<StageName> {
    let selected: BTreeSet<StageName> = selected.iter().copied().collect();
    crate::graph::canonical_order()
        .into_iter()
        .filter(|stage| selected.contains(stage))
        .collect()
}

/// Dependencies that `selected` needs but does not include.
pub fn missing_dependencies(selected: &[StageName]) -> BTreeMap<StageName, Vec<StageName>> {
    let chosen: BTreeSet<StageName> = selected.iter().copied().collect();
    let mut missing = BTreeMap::new();

    for stage in &chosen {
        let absent: Vec<StageName> = stage
            .dependencies()
            .iter()
            .copied()
            .filter(|dep| !chosen.contains(dep))
            .collect();
        if !absent.is_empty() {
            missing.insert(*stage, absent);
        }
    }

    missing
}

/// Human-readable report of missing dependencies, or `None` when complete.
pub fn describe_missing(selected: &[StageName]) -> Option<String> {
    let missing = missing_dependencies(selected);
    if missing.is_empty() {
        return None;
    }

    let lines: Vec<String> = missing
        .iter()
        .map(|(stage, deps)| {
            let labels: Vec<&str> = deps.iter().map(StageName::label).collect();
            format!("{} depends on: {}", stage.label(), labels.join(", "))
        })
        .collect();
    Some(lines.join("\n"))
}

/// Close `selected` over its dependencies, in canonical order.
pub fn resolve_with_dependencies(selected: &[StageName]) -> Vec<StageName> {
    let mut required: BTreeSet<StageName> = BTreeSet::new();
    let mut pending: Vec<StageName> = selected.to_vec();

    while let Some(stage) = pending.pop() {
        if required.insert(stage) {
            pending.extend(stage.dependencies().iter().copied());
        }
    }

    let required: Vec<StageName> = required.into_iter().collect();
    order_selection(&required)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!("Sales".parse::<StageName>().ok(), Some(StageName::Sales));
        assert!(matches!(
            "refunds".parse::<StageName>(),
            Err(Error::UnknownStage(name)) if name == "refunds"
        ));
    }

    #[test]
    fn selection_keeps_canonical_order() {
        let ordered = order_selection(&[StageName::Sales, StageName::Products, StageName::Sales]);
        assert_eq!(ordered, vec![StageName::Products, StageName::Sales]);
    }

    #[test]
    fn reports_missing_dependencies() {
        let missing = missing_dependencies(&[StageName::Sales, StageName::Products]);
        assert_eq!(missing.get(&StageName::Sales), Some(&vec![StageName::Clients]));
        assert_eq!(missing.len(), 1);
        assert!(describe_missing(&StageName::ALL).is_none());
        let message = describe_missing(&[StageName::Entries]).expect("message");
        assert!(message.contains("Entradas depends on: Produtos"));
    }

    #[test]
    fn resolves_transitive_dependencies() {
        let resolved = resolve_with_dependencies(&[StageName::Sales]);
        assert_eq!(
            resolved,
            vec![StageName::Products, StageName::Clients, StageName::Sales]
        );
    }
}
