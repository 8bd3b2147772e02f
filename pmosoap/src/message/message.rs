use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use super::body_writer::{BodyWriter, CustomBodyWriter};
use super::headers::MessageHeaders;
use super::serializer::ObjectSerializer;
use crate::errors::{MessageError, Result};
use crate::version::{AddressingVersion, MessageVersion};
use crate::xml::{XmlBodyReader, XmlBodyWriter};

const ENVELOPE_PREFIX: &str = "s";

/// État du corps d'un message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    /// Corps jamais lu
    Created,
    /// Lecture ou écriture du corps en cours
    BodyReading,
    /// Corps consommé (avec succès ou non)
    BodyConsumed,
    /// Message fermé
    Closed,
}

#[derive(Debug)]
struct BodySlot {
    state: MessageState,
    writer: Option<BodyWriter>,
}

/// Message SOAP indépendant du transport.
///
/// Le corps est consommé au plus une fois : lecture via
/// [`Message::get_reader_at_body_contents`] ou écriture via
/// [`Message::write_message`] / [`Message::write_body_contents`]. La
/// transition d'état est protégée par un verrou : entre plusieurs appels
/// concurrents, un seul obtient le corps.
#[derive(Debug)]
pub struct Message {
    version: MessageVersion,
    headers: MessageHeaders,
    is_empty: bool,
    body: Mutex<BodySlot>,
}

impl Message {
    /// Message sans corps, en-tête `Action` renseigné
    pub fn create(version: MessageVersion, action: &str) -> Self {
        Self::create_with_body_writer(version, action, BodyWriter::empty())
    }

    /// Message dont le corps est un instantané de `payload`, sérialisé par
    /// le sérialiseur « data contract » par défaut
    pub fn create_with_body<T: Serialize + ?Sized>(
        version: MessageVersion,
        action: &str,
        payload: &T,
    ) -> Result<Self> {
        Ok(Self::create_with_body_writer(
            version,
            action,
            BodyWriter::typed(payload)?,
        ))
    }

    /// Comme [`Message::create_with_body`] avec un sérialiseur injecté
    pub fn create_with_serializer<T: Serialize + ?Sized>(
        version: MessageVersion,
        action: &str,
        payload: &T,
        serializer: Arc<dyn ObjectSerializer>,
    ) -> Result<Self> {
        Ok(Self::create_with_body_writer(
            version,
            action,
            BodyWriter::typed_with_serializer(payload, serializer)?,
        ))
    }

    /// Message dont le corps est produit par un écrivain personnalisé
    pub fn create_with_custom_writer<W: CustomBodyWriter + 'static>(
        version: MessageVersion,
        action: &str,
        writer: W,
    ) -> Self {
        Self::create_with_body_writer(version, action, BodyWriter::custom(writer))
    }

    pub fn create_with_body_writer(
        version: MessageVersion,
        action: &str,
        body: BodyWriter,
    ) -> Self {
        let mut headers = MessageHeaders::new(version.addressing());
        headers.set_action(action);

        debug!(version = version.name(), action, empty = body.is_empty(), "Created message");
        Self {
            version,
            headers,
            is_empty: body.is_empty(),
            body: Mutex::new(BodySlot {
                state: MessageState::Created,
                writer: Some(body),
            }),
        }
    }

    pub fn version(&self) -> MessageVersion {
        self.version
    }

    pub fn headers(&self) -> &MessageHeaders {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut MessageHeaders {
        &mut self.headers
    }

    /// Fixé à la création ; ne change pas après consommation du corps
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn state(&self) -> MessageState {
        self.body.lock().state
    }

    /// Ferme le message ; tout accès ultérieur au corps échoue
    pub fn close(&self) {
        let mut slot = self.body.lock();
        if slot.state != MessageState::Closed {
            debug!(action = ?self.headers.action(), "Closing message");
            slot.state = MessageState::Closed;
            slot.writer = None;
        }
    }

    /// Renvoie un curseur positionné sur le premier nœud du contenu du
    /// corps, sans les éléments `Envelope`/`Body` englobants.
    ///
    /// Échoue avec [`MessageError::MessageBodyEmpty`] si le message n'a pas
    /// de corps ; le corps est alors tout de même considéré consommé.
    pub fn get_reader_at_body_contents(&self) -> Result<XmlBodyReader> {
        let mut body = self.begin_body_access()?;
        let result = self.read_body(&mut body);
        self.end_body_access();
        result
    }

    fn read_body(&self, body: &mut BodyWriter) -> Result<XmlBodyReader> {
        if self.is_empty {
            warn!(action = ?self.headers.action(), "Attempted to read an empty body");
            return Err(MessageError::MessageBodyEmpty);
        }

        let envelope_ns = self.version.envelope().namespace();
        let mut writer = XmlBodyWriter::new();
        writer.write_start_element(Some(ENVELOPE_PREFIX), "Body", Some(envelope_ns))?;
        body.write_to(&mut writer)?;
        writer.write_end_element()?;

        let xml = writer.into_bytes()?;
        XmlBodyReader::from_wrapped(&xml)
    }

    /// Écrit uniquement le contenu du corps dans `writer`
    pub fn write_body_contents(&self, writer: &mut XmlBodyWriter) -> Result<()> {
        let mut body = self.begin_body_access()?;
        let result = body.write_to(writer);
        self.end_body_access();
        result
    }

    /// Écrit le message complet (`Envelope`, `Header`, `Body`).
    ///
    /// Sans enveloppe ([`crate::version::EnvelopeVersion::None`]) seul le
    /// contenu du corps est écrit.
    pub fn write_message(&self, writer: &mut XmlBodyWriter) -> Result<()> {
        let mut body = self.begin_body_access()?;
        let result = self.write_envelope(&mut body, writer);
        self.end_body_access();
        result
    }

    fn write_envelope(&self, body: &mut BodyWriter, writer: &mut XmlBodyWriter) -> Result<()> {
        let envelope = self.version.envelope();
        if !envelope.has_envelope() {
            return body.write_to(writer);
        }

        let ns = Some(envelope.namespace());
        writer.write_start_element(Some(ENVELOPE_PREFIX), "Envelope", ns)?;

        let has_headers = self
            .headers
            .iter()
            .any(|h| h.namespace != AddressingVersion::NONE_NAMESPACE);
        if has_headers {
            writer.write_start_element(Some(ENVELOPE_PREFIX), "Header", ns)?;
            self.headers.write_to(writer, ENVELOPE_PREFIX)?;
            writer.write_end_element()?;
        }

        writer.write_start_element(Some(ENVELOPE_PREFIX), "Body", ns)?;
        body.write_to(writer)?;
        writer.write_end_element()?;
        writer.write_end_element()
    }

    /// Message complet sous forme de chaîne, sans indentation
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = XmlBodyWriter::new();
        self.write_message(&mut writer)?;
        writer.into_string()
    }

    fn begin_body_access(&self) -> Result<BodyWriter> {
        let mut slot = self.body.lock();
        match slot.state {
            MessageState::Created => {
                slot.state = MessageState::BodyReading;
                slot.writer.take().ok_or(MessageError::MessageBodyConsumed)
            }
            MessageState::Closed => {
                warn!(action = ?self.headers.action(), "Body access on closed message");
                Err(MessageError::MessageClosed)
            }
            MessageState::BodyReading | MessageState::BodyConsumed => {
                warn!(action = ?self.headers.action(), "Message body accessed twice");
                Err(MessageError::MessageBodyConsumed)
            }
        }
    }

    fn end_body_access(&self) {
        let mut slot = self.body.lock();
        if slot.state == MessageState::BodyReading {
            slot.state = MessageState::BodyConsumed;
        }
        debug!(state = ?slot.state, "Body access finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTION: &str = "http://tempuri.org/someserviceendpoint";

    #[test]
    fn test_state_transitions() {
        let message = Message::create_with_body(MessageVersion::SOAP12, ACTION, "x").unwrap();
        assert_eq!(message.state(), MessageState::Created);

        message.get_reader_at_body_contents().unwrap();
        assert_eq!(message.state(), MessageState::BodyConsumed);

        message.close();
        assert_eq!(message.state(), MessageState::Closed);
        assert!(matches!(
            message.get_reader_at_body_contents(),
            Err(MessageError::MessageClosed)
        ));
        // en-têtes et version restent accessibles
        assert_eq!(message.headers().action(), Some(ACTION));
        assert_eq!(message.version(), MessageVersion::SOAP12);
    }

    #[test]
    fn test_empty_body_read_fails_and_consumes() {
        let message = Message::create(MessageVersion::SOAP11, ACTION);
        assert!(matches!(
            message.get_reader_at_body_contents(),
            Err(MessageError::MessageBodyEmpty)
        ));
        assert_eq!(message.state(), MessageState::BodyConsumed);
        assert!(message.is_empty());
    }

    #[test]
    fn test_write_message_soap12_addressing10() {
        let message = Message::create_with_custom_writer(
            MessageVersion::SOAP12_WSADDRESSING10,
            "urn:act",
            |writer: &mut XmlBodyWriter| writer.write_element_string(None, "ping", Some("urn:p"), "1"),
        );

        let xml = message.to_xml_string().unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">"#,
                r#"<s:Header><a:Action xmlns:a="http://www.w3.org/2005/08/addressing" s:mustUnderstand="1">urn:act</a:Action></s:Header>"#,
                r#"<s:Body><ping xmlns="urn:p">1</ping></s:Body>"#,
                r#"</s:Envelope>"#
            )
        );
        assert!(matches!(
            message.to_xml_string(),
            Err(MessageError::MessageBodyConsumed)
        ));
    }

    #[test]
    fn test_write_message_without_addressing() {
        let message = Message::create(MessageVersion::SOAP11, "urn:act");
        assert_eq!(
            message.to_xml_string().unwrap(),
            r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body/></s:Envelope>"#
        );
    }

    #[test]
    fn test_write_message_without_envelope() {
        let message = Message::create_with_body(MessageVersion::NONE, "urn:act", &true).unwrap();
        assert_eq!(
            message.to_xml_string().unwrap(),
            r#"<boolean xmlns="http://schemas.microsoft.com/2003/10/Serialization/">true</boolean>"#
        );
    }

    #[test]
    fn test_write_body_contents() {
        let message = Message::create_with_body(MessageVersion::SOAP12, ACTION, "Hi").unwrap();
        let mut writer = XmlBodyWriter::new();
        message.write_body_contents(&mut writer).unwrap();
        assert!(writer.into_string().unwrap().contains(">Hi</string>"));
        assert!(matches!(
            message.get_reader_at_body_contents(),
            Err(MessageError::MessageBodyConsumed)
        ));
    }

    #[test]
    fn test_custom_writer_cannot_close_body() {
        let message = Message::create_with_custom_writer(
            MessageVersion::SOAP12,
            ACTION,
            |writer: &mut XmlBodyWriter| {
                writer.write_end_element()?;
                writer.write_element_string(None, "evil", None, "")?;
                writer.write_start_element(Some("s"), "Body", None)
            },
        );
        assert!(matches!(
            message.get_reader_at_body_contents(),
            Err(MessageError::XmlWriter(_))
        ));
        assert_eq!(message.state(), MessageState::BodyConsumed);
    }

    #[test]
    fn test_raw_content_outside_body_is_rejected() {
        let message = Message::create_with_custom_writer(
            MessageVersion::SOAP12,
            ACTION,
            |writer: &mut XmlBodyWriter| writer.write_raw("</s:Body><evil/><s:Body>"),
        );
        assert!(matches!(
            message.get_reader_at_body_contents(),
            Err(MessageError::MalformedXml(_))
        ));
    }

    #[test]
    fn test_write_body_contents_keeps_caller_element() {
        let message = Message::create_with_custom_writer(
            MessageVersion::SOAP12,
            ACTION,
            |writer: &mut XmlBodyWriter| writer.write_end_element(),
        );

        let mut writer = XmlBodyWriter::new();
        writer.write_start_element(None, "outer", None).unwrap();
        assert!(matches!(
            message.write_body_contents(&mut writer),
            Err(MessageError::XmlWriter(_))
        ));
        assert_eq!(writer.depth(), 1);
        writer.write_end_element().unwrap();
        assert_eq!(writer.into_string().unwrap(), "<outer/>");
    }

    #[test]
    fn test_unbalanced_custom_writer_fails_write_message() {
        let message = Message::create_with_custom_writer(
            MessageVersion::SOAP11,
            ACTION,
            |writer: &mut XmlBodyWriter| writer.write_start_element(None, "unclosed", None),
        );
        assert!(matches!(
            message.to_xml_string(),
            Err(MessageError::XmlWriter(_))
        ));
    }

    #[test]
    fn test_failing_custom_writer_consumes_body() {
        let message = Message::create_with_custom_writer(
            MessageVersion::SOAP12,
            ACTION,
            |_writer: &mut XmlBodyWriter| -> Result<()> { Err(MessageError::serialization("boom")) },
        );
        assert!(matches!(
            message.get_reader_at_body_contents(),
            Err(MessageError::Serialization(_))
        ));
        assert_eq!(message.state(), MessageState::BodyConsumed);
        assert!(matches!(
            message.get_reader_at_body_contents(),
            Err(MessageError::MessageBodyConsumed)
        ));
    }
}
