//! # Liaisons
//!
//! Chaînes d'éléments de liaison (encodage + transport) et résolution de la
//! [`MessageVersion`](crate::version::MessageVersion) effective.

mod binding_element;
mod custom_binding;
mod encoding;
mod transport;

pub use binding_element::{BindingElement, resolve_message_version};
pub use custom_binding::CustomBinding;
pub use encoding::TextMessageEncodingBindingElement;
pub use transport::{HttpTransportBindingElement, HttpsTransportBindingElement};
