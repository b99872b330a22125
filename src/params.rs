//! Recognized query fields and the domains of the enum-constrained ones.

use crate::error::{LookupError, LookupResult};
use std::fmt;
use std::str::FromStr;

/// Field names accepted by the card info endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Name,
    Archetype,
    Level,
    Attribute,
    Banlist,
    Cardset,
    Fname,
    Race,
    Format,
    Linkmarker,
    Misc,
    Staple,
    Startdate,
    Enddate,
    Type,
    Language,
}

impl Field {
    /// Every recognized field, in upstream documentation order
    pub const ALL: [Field; 16] = [
        Field::Name,
        Field::Archetype,
        Field::Level,
        Field::Attribute,
        Field::Banlist,
        Field::Cardset,
        Field::Fname,
        Field::Race,
        Field::Format,
        Field::Linkmarker,
        Field::Misc,
        Field::Staple,
        Field::Startdate,
        Field::Enddate,
        Field::Type,
        Field::Language,
    ];

    /// Query-string name of the field (e.g. "fname", "startdate")
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Archetype => "archetype",
            Field::Level => "level",
            Field::Attribute => "attribute",
            Field::Banlist => "banlist",
            Field::Cardset => "cardset",
            Field::Fname => "fname",
            Field::Race => "race",
            Field::Format => "format",
            Field::Linkmarker => "linkmarker",
            Field::Misc => "misc",
            Field::Staple => "staple",
            Field::Startdate => "startdate",
            Field::Enddate => "enddate",
            Field::Type => "type",
            Field::Language => "language",
        }
    }

    /// `name` and `fname` anchor a lookup and are mutually exclusive
    pub fn is_selector(&self) -> bool {
        matches!(self, Field::Name | Field::Fname)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = LookupError;

    /// Unrecognized names are rejected, never ignored
    fn from_str(s: &str) -> LookupResult<Self> {
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| LookupError::UnknownField(s.to_string()))
    }
}

/// Card type labels accepted for `type`
pub const CARD_TYPES: &[&str] = &[
    "Effect Monster",
    "Flip Effect Monster",
    "Flip Tuner Effect Monster",
    "Gemini Monster",
    "Normal Monster",
    "Normal Tuner Monster",
    "Pendulum Effect Monster",
    "Pendulum Effect Ritual Monster",
    "Pendulum Flip Effect Monster",
    "Pendulum Normal Monster",
    "Pendulum Tuner Effect Monster",
    "Ritual Effect Monster",
    "Ritual Monster",
    "Spell Card",
    "Spirit Monster",
    "Toon Monster",
    "Trap Card",
    "Tuner Monster",
    "Union Effect Monster",
    // Extra Deck
    "Fusion Monster",
    "Link Monster",
    "Pendulum Effect Fusion Monster",
    "Synchro Monster",
    "Synchro Pendulum Effect Monster",
    "Synchro Tuner Monster",
    "XYZ Monster",
    "XYZ Pendulum Effect Monster",
    // Other
    "Skill Card",
    "Token",
];

/// Race labels accepted for `race`. Spell and trap sub-types share the
/// field, so "Normal" and "Continuous" appear once per category.
pub const RACES: &[&str] = &[
    "Aqua",
    "Beast",
    "Beast-Warrior",
    "Creator-God",
    "Cyberse",
    "Dinosaur",
    "Divine-Beast",
    "Dragon",
    "Fairy",
    "Fiend",
    "Fish",
    "Insect",
    "Machine",
    "Plant",
    "Psychic",
    "Pyro",
    "Reptile",
    "Rock",
    "Sea Serpent",
    "Spellcaster",
    "Thunder",
    "Warrior",
    "Winged Beast",
    "Wyrm",
    "Zombie",
    // Spell cards
    "Normal",
    "Field",
    "Equip",
    "Continuous",
    "Quick-Play",
    "Ritual",
    // Trap cards
    "Normal",
    "Continuous",
    "Counter",
];

/// Language codes accepted for `language`
pub const LANGUAGES: &[&str] = &["fr", "de", "it", "pt"];

/// Checks field values against the fixed domains of `type`, `race` and
/// `language`. Every other field is accepted as-is.
#[derive(Debug, Clone)]
pub struct ParameterValidator {
    card_types: Vec<String>,
    races: Vec<String>,
    languages: Vec<String>,
}

impl Default for ParameterValidator {
    fn default() -> Self {
        Self::with_domains(CARD_TYPES, RACES, LANGUAGES)
    }
}

impl ParameterValidator {
    /// Build a validator over custom domains
    pub fn with_domains<S: AsRef<str>>(card_types: &[S], races: &[S], languages: &[S]) -> Self {
        let owned = |values: &[S]| values.iter().map(|v| v.as_ref().to_string()).collect();
        Self {
            card_types: owned(card_types),
            races: owned(races),
            languages: owned(languages),
        }
    }

    /// Domain of an enum-constrained field, `None` for unconstrained fields
    pub fn domain(&self, field: Field) -> Option<&[String]> {
        match field {
            Field::Type => Some(&self.card_types),
            Field::Race => Some(&self.races),
            Field::Language => Some(&self.languages),
            _ => None,
        }
    }

    /// Validate a single field value.
    ///
    /// Numeric ranges, dates and free text are deliberately left unchecked.
    pub fn validate(&self, field: Field, value: &str) -> LookupResult<()> {
        match self.domain(field) {
            Some(domain) if !domain.iter().any(|allowed| allowed == value) => {
                log::debug!("Rejected {}={} (not in domain)", field, value);
                Err(LookupError::invalid(field.as_str(), value))
            }
            _ => Ok(()),
        }
    }
}
