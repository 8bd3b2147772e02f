//! Versions d'enveloppe SOAP

use std::fmt;

/// Variante d'enveloppe SOAP supportée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeVersion {
    /// SOAP 1.1
    Soap11,
    /// SOAP 1.2
    Soap12,
    /// Pas d'enveloppe (POX, messages bruts)
    None,
}

impl EnvelopeVersion {
    pub const SOAP11_NAMESPACE: &'static str = "http://schemas.xmlsoap.org/soap/envelope/";
    pub const SOAP12_NAMESPACE: &'static str = "http://www.w3.org/2003/05/soap-envelope";
    pub const NONE_NAMESPACE: &'static str = "http://schemas.microsoft.com/ws/2005/05/envelope/none";

    /// Namespace canonique de l'enveloppe
    pub const fn namespace(&self) -> &'static str {
        match self {
            EnvelopeVersion::Soap11 => Self::SOAP11_NAMESPACE,
            EnvelopeVersion::Soap12 => Self::SOAP12_NAMESPACE,
            EnvelopeVersion::None => Self::NONE_NAMESPACE,
        }
    }

    /// Libellé affiché dans la forme canonique
    pub const fn label(&self) -> &'static str {
        match self {
            EnvelopeVersion::Soap11 => "Soap11",
            EnvelopeVersion::Soap12 => "Soap12",
            EnvelopeVersion::None => "EnvelopeNone",
        }
    }

    /// `true` si les messages de cette version sont encadrés par
    /// `Envelope`/`Header`/`Body`
    pub const fn has_envelope(&self) -> bool {
        !matches!(self, EnvelopeVersion::None)
    }
}

impl fmt::Display for EnvelopeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.namespace())
    }
}
