//! # pmosoap - Modèle de message SOAP
//!
//! Représentation d'un message SOAP (enveloppe, en-têtes, corps)
//! indépendante du transport.
//!
//! ## Fonctionnalités
//!
//! - ✅ Versions d'enveloppe (Soap11, Soap12, aucune) et d'adressage
//!   (WS-Addressing 1.0, 2004/08, aucun)
//! - ✅ [`MessageVersion`] validée contre une table de paires autorisées
//! - ✅ En-têtes ordonnés avec accès typé à `Action`
//! - ✅ Corps paresseux : vide, objet typé ou écrivain personnalisé,
//!   consommé au plus une fois
//! - ✅ Résolution de la version depuis une chaîne d'éléments de liaison
//!
//! ## Architecture
//!
//! - [`version`] : [`EnvelopeVersion`], [`AddressingVersion`], [`MessageVersion`]
//! - [`message`] : [`Message`], [`MessageHeaders`], [`BodyWriter`]
//! - [`xml`] : puits d'écriture et curseur de lecture XML
//! - [`channels`] : éléments de liaison et [`CustomBinding`]
//! - [`config`], [`logging`] : configuration YAML et traces
//!
//! ## Example
//!
//! ```
//! use pmosoap::channels::{CustomBinding, HttpTransportBindingElement, TextMessageEncodingBindingElement};
//! use pmosoap::message::Message;
//!
//! let binding = CustomBinding::default()
//!     .push(TextMessageEncodingBindingElement::default())
//!     .push(HttpTransportBindingElement::default());
//! let version = binding.message_version()?;
//!
//! let message = Message::create(version, "http://tempuri.org/someserviceendpoint");
//! assert!(message.is_empty());
//! assert_eq!(message.headers().action(), Some("http://tempuri.org/someserviceendpoint"));
//! # Ok::<(), pmosoap::MessageError>(())
//! ```

pub mod channels;
pub mod config;
pub mod errors;
pub mod logging;
pub mod message;
pub mod version;
pub mod xml;

pub use channels::{BindingElement, CustomBinding};
pub use errors::{MessageError, Result};
pub use message::{BodyWriter, CustomBodyWriter, Message, MessageHeaders, MessageState};
pub use version::{AddressingVersion, EnvelopeVersion, MessageVersion};
