use thiserror::Error;

use crate::version::{AddressingVersion, EnvelopeVersion};

/// Erreurs du modèle de message SOAP
///
/// Toutes les erreurs sont locales et synchrones : elles signalent une
/// violation de contrat côté appelant, jamais une faute transitoire.
#[derive(Error, Debug)]
pub enum MessageError {
    #[error("Invalid version combination: {envelope} with {addressing}")]
    InvalidVersionCombination {
        envelope: EnvelopeVersion,
        addressing: AddressingVersion,
    },

    #[error("Unknown message version: {0}")]
    UnknownMessageVersion(String),

    #[error("Body writer has already been consumed")]
    BodyAlreadyConsumed,

    #[error("Message body has already been consumed")]
    MessageBodyConsumed,

    #[error("Message body is empty")]
    MessageBodyEmpty,

    #[error("Message is closed")]
    MessageClosed,

    #[error("No message version found in binding element chain")]
    NoMessageVersionFound,

    #[error("XML writer error: {0}")]
    XmlWriter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    #[error("XML reader error: {0}")]
    XmlReader(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MessageError {
    pub fn xml_writer(message: &str) -> Self {
        MessageError::XmlWriter(message.to_string())
    }

    pub fn malformed_xml(message: &str) -> Self {
        MessageError::MalformedXml(message.to_string())
    }

    pub fn serialization(message: impl std::fmt::Display) -> Self {
        MessageError::Serialization(message.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MessageError>;
