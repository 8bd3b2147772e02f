//! Composition enveloppe × adressage

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use super::{AddressingVersion, EnvelopeVersion};
use crate::errors::{MessageError, Result};

/// Paires (enveloppe, adressage) autorisées, avec leur nom de constante.
///
/// `EnvelopeVersion::None` n'accepte que `AddressingVersion::None` : sans
/// enveloppe il n'y a pas d'en-têtes où porter l'adressage.
pub const SUPPORTED_VERSIONS: [(&str, EnvelopeVersion, AddressingVersion); 7] = [
    ("None", EnvelopeVersion::None, AddressingVersion::None),
    ("Soap11", EnvelopeVersion::Soap11, AddressingVersion::None),
    ("Soap12", EnvelopeVersion::Soap12, AddressingVersion::None),
    (
        "Soap11WSAddressing10",
        EnvelopeVersion::Soap11,
        AddressingVersion::WSAddressing10,
    ),
    (
        "Soap12WSAddressing10",
        EnvelopeVersion::Soap12,
        AddressingVersion::WSAddressing10,
    ),
    (
        "Soap11WSAddressingAugust2004",
        EnvelopeVersion::Soap11,
        AddressingVersion::WSAddressingAugust2004,
    ),
    (
        "Soap12WSAddressingAugust2004",
        EnvelopeVersion::Soap12,
        AddressingVersion::WSAddressingAugust2004,
    ),
];

/// Version de message : une enveloppe et une version d'adressage.
///
/// Valeur immuable, comparée structurellement. Les seules instances
/// constructibles sont celles de [`SUPPORTED_VERSIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageVersion {
    envelope: EnvelopeVersion,
    addressing: AddressingVersion,
}

impl MessageVersion {
    pub const NONE: MessageVersion = Self::pair(EnvelopeVersion::None, AddressingVersion::None);
    pub const SOAP11: MessageVersion = Self::pair(EnvelopeVersion::Soap11, AddressingVersion::None);
    pub const SOAP12: MessageVersion = Self::pair(EnvelopeVersion::Soap12, AddressingVersion::None);
    pub const SOAP11_WSADDRESSING10: MessageVersion =
        Self::pair(EnvelopeVersion::Soap11, AddressingVersion::WSAddressing10);
    pub const SOAP12_WSADDRESSING10: MessageVersion =
        Self::pair(EnvelopeVersion::Soap12, AddressingVersion::WSAddressing10);
    pub const SOAP11_WSADDRESSING_AUGUST2004: MessageVersion = Self::pair(
        EnvelopeVersion::Soap11,
        AddressingVersion::WSAddressingAugust2004,
    );
    pub const SOAP12_WSADDRESSING_AUGUST2004: MessageVersion = Self::pair(
        EnvelopeVersion::Soap12,
        AddressingVersion::WSAddressingAugust2004,
    );
    pub const DEFAULT: MessageVersion = Self::SOAP12_WSADDRESSING10;

    const fn pair(envelope: EnvelopeVersion, addressing: AddressingVersion) -> Self {
        Self {
            envelope,
            addressing,
        }
    }

    /// Construit une version en validant la paire contre [`SUPPORTED_VERSIONS`]
    pub fn create(envelope: EnvelopeVersion, addressing: AddressingVersion) -> Result<Self> {
        if Self::is_supported(envelope, addressing) {
            Ok(Self::pair(envelope, addressing))
        } else {
            warn!(%envelope, %addressing, "Rejected unsupported message version");
            Err(MessageError::InvalidVersionCombination {
                envelope,
                addressing,
            })
        }
    }

    /// Version SOAP sans adressage
    pub fn create_for_envelope(envelope: EnvelopeVersion) -> Self {
        Self::pair(envelope, AddressingVersion::None)
    }

    pub fn is_supported(envelope: EnvelopeVersion, addressing: AddressingVersion) -> bool {
        SUPPORTED_VERSIONS
            .iter()
            .any(|(_, e, a)| *e == envelope && *a == addressing)
    }

    pub fn envelope(&self) -> EnvelopeVersion {
        self.envelope
    }

    pub fn addressing(&self) -> AddressingVersion {
        self.addressing
    }

    /// Nom de la constante correspondante (ex: `Soap12WSAddressing10`)
    pub fn name(&self) -> &'static str {
        SUPPORTED_VERSIONS
            .iter()
            .find(|(_, e, a)| *e == self.envelope && *a == self.addressing)
            .map(|(name, _, _)| *name)
            .unwrap_or("Unknown")
    }

    /// Itère sur toutes les versions supportées
    pub fn all() -> impl Iterator<Item = MessageVersion> {
        SUPPORTED_VERSIONS
            .iter()
            .map(|(_, e, a)| Self::pair(*e, *a))
    }
}

impl Default for MessageVersion {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for MessageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.envelope, self.addressing)
    }
}

impl FromStr for MessageVersion {
    type Err = MessageError;

    /// Accepte les noms de constantes, insensible à la casse, ainsi que `Default`
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("default") {
            return Ok(Self::DEFAULT);
        }
        SUPPORTED_VERSIONS
            .iter()
            .find(|(n, _, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, e, a)| Self::pair(*e, *a))
            .ok_or_else(|| MessageError::UnknownMessageVersion(s.to_string()))
    }
}
