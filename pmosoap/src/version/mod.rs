//! # Versions de message
//!
//! - [`EnvelopeVersion`] : Soap11, Soap12 ou pas d'enveloppe
//! - [`AddressingVersion`] : WS-Addressing 1.0, 2004/08 ou aucun
//! - [`MessageVersion`] : paire validée des deux, avec forme canonique
//!
//! ```
//! use pmosoap::version::{AddressingVersion, EnvelopeVersion, MessageVersion};
//!
//! let version = MessageVersion::create(EnvelopeVersion::Soap12, AddressingVersion::WSAddressing10)?;
//! assert_eq!(version, MessageVersion::SOAP12_WSADDRESSING10);
//! # Ok::<(), pmosoap::MessageError>(())
//! ```

mod addressing;
mod envelope;
mod message_version;

pub use addressing::AddressingVersion;
pub use envelope::EnvelopeVersion;
pub use message_version::{MessageVersion, SUPPORTED_VERSIONS};
