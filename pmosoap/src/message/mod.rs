//! # Module message
//!
//! - [`Message`] : version, en-têtes et corps consommable une seule fois
//! - [`MessageHeaders`] : en-têtes ordonnés, accès typé à `Action`
//! - [`BodyWriter`] : corps vide, objet typé ou écrivain personnalisé
//! - [`ObjectSerializer`] : stratégie de projection objet → XML
//!
//! ## Example
//!
//! ```
//! use pmosoap::message::Message;
//! use pmosoap::version::MessageVersion;
//!
//! let message = Message::create_with_body(
//!     MessageVersion::SOAP12_WSADDRESSING10,
//!     "http://tempuri.org/someserviceendpoint",
//!     "Hello",
//! )?;
//! assert!(!message.is_empty());
//!
//! let mut reader = message.get_reader_at_body_contents()?;
//! assert_eq!(reader.read_content_as_string(), "Hello");
//! # Ok::<(), pmosoap::MessageError>(())
//! ```

mod body_writer;
mod headers;
#[allow(clippy::module_inception)]
mod message;
mod serializer;

pub use body_writer::{BodyContent, BodyWriter, CustomBodyWriter};
pub use headers::{MessageHeader, MessageHeaders, new_message_id};
pub use message::{Message, MessageState};
pub use serializer::{
    DataContractSerializer, ObjectSerializer, SERIALIZATION_NAMESPACE, TypedPayload,
    XmlSerdeSerializer, serializer_from_config,
};
