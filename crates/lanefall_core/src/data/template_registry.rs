//! Read-only lookup of unit templates and cards by name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::card_data::CardTemplate;
use super::unit_data::UnitTemplate;
use crate::error::{GameError, Result};

/// Registry of all unit templates and cards in a match.
///
/// Built once at match setup and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRegistry {
    units: BTreeMap<String, UnitTemplate>,
    cards: BTreeMap<String, CardTemplate>,
}

impl TemplateRegistry {
    /// Build a registry, rejecting duplicate names and dangling references.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] for duplicates and
    /// [`GameError::UnknownTemplate`] when a summon card names a unit that
    /// does not exist.
    pub fn new(units: &[UnitTemplate], cards: &[CardTemplate]) -> Result<Self> {
        let mut registry = Self::default();
        let mut duplicates = Vec::new();

        for unit in units {
            if registry
                .units
                .insert(unit.name.clone(), unit.clone())
                .is_some()
            {
                duplicates.push(format!("Duplicate unit template '{}'", unit.name));
            }
        }
        for card in cards {
            if registry
                .cards
                .insert(card.card_type.clone(), card.clone())
                .is_some()
            {
                duplicates.push(format!("Duplicate card type '{}'", card.card_type));
            }
        }
        if !duplicates.is_empty() {
            return Err(GameError::InvalidConfig(duplicates));
        }

        for card in registry.cards.values() {
            if let Some(unit) = card.summoned_unit() {
                registry.template_by_name(unit)?;
            }
        }

        Ok(registry)
    }

    /// Look up a unit template.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownTemplate`] if no template has this name.
    pub fn template_by_name(&self, name: &str) -> Result<&UnitTemplate> {
        self.units
            .get(name)
            .ok_or_else(|| GameError::UnknownTemplate(name.to_string()))
    }

    /// Look up a card.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownCard`] if no card has this type.
    pub fn card_by_type(&self, card_type: &str) -> Result<&CardTemplate> {
        self.cards
            .get(card_type)
            .ok_or_else(|| GameError::UnknownCard(card_type.to_string()))
    }

    /// All unit templates by name.
    pub fn units(&self) -> impl Iterator<Item = &UnitTemplate> {
        self.units.values()
    }

    /// All cards by type.
    pub fn cards(&self) -> impl Iterator<Item = &CardTemplate> {
        self.cards.values()
    }
}
