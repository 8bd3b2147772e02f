//! Versions WS-Addressing

use std::fmt;

/// Variante WS-Addressing supportée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingVersion {
    /// WS-Addressing 1.0 (W3C, 2005/08)
    WSAddressing10,
    /// WS-Addressing soumission membre (2004/08)
    WSAddressingAugust2004,
    /// Aucun en-tête WS-Addressing
    None,
}

impl AddressingVersion {
    pub const WSADDRESSING10_NAMESPACE: &'static str = "http://www.w3.org/2005/08/addressing";
    pub const WSADDRESSING_AUGUST2004_NAMESPACE: &'static str =
        "http://schemas.xmlsoap.org/ws/2004/08/addressing";
    pub const NONE_NAMESPACE: &'static str =
        "http://schemas.microsoft.com/ws/2005/05/addressing/none";

    pub const fn namespace(&self) -> &'static str {
        match self {
            AddressingVersion::WSAddressing10 => Self::WSADDRESSING10_NAMESPACE,
            AddressingVersion::WSAddressingAugust2004 => Self::WSADDRESSING_AUGUST2004_NAMESPACE,
            AddressingVersion::None => Self::NONE_NAMESPACE,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            AddressingVersion::WSAddressing10 => "Addressing10",
            AddressingVersion::WSAddressingAugust2004 => "Addressing200408",
            AddressingVersion::None => "AddressingNone",
        }
    }

    /// `false` pour [`AddressingVersion::None`] : les en-têtes d'adressage
    /// ne sont pas sérialisés
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, AddressingVersion::None)
    }
}

impl fmt::Display for AddressingVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.namespace())
    }
}
