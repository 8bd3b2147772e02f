//! En-têtes de message

use uuid::Uuid;

use crate::errors::Result;
use crate::version::AddressingVersion;
use crate::xml::XmlBodyWriter;

const ACTION: &str = "Action";
const TO: &str = "To";
const MESSAGE_ID: &str = "MessageID";
const RELATES_TO: &str = "RelatesTo";
const REPLY_TO: &str = "ReplyTo";
const ADDRESS: &str = "Address";

/// En-tête (nom, namespace, valeur)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub name: String,
    pub namespace: String,
    pub value: String,
    pub must_understand: bool,
}

impl MessageHeader {
    pub fn new(name: &str, namespace: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            value: value.to_string(),
            must_understand: false,
        }
    }

    pub fn must_understand(mut self, must_understand: bool) -> Self {
        self.must_understand = must_understand;
        self
    }

    fn matches(&self, name: &str, namespace: &str) -> bool {
        self.name == name && self.namespace == namespace
    }
}

/// Collection ordonnée d'en-têtes appartenant à un seul message.
///
/// Les noms ne sont pas uniques en général ; `Action`, `To`, `MessageID`,
/// `RelatesTo` et `ReplyTo` sont à emplacement unique : les fixer remplace
/// la valeur existante à sa position d'origine.
#[derive(Debug, Clone)]
pub struct MessageHeaders {
    addressing: AddressingVersion,
    headers: Vec<MessageHeader>,
}

impl MessageHeaders {
    pub fn new(addressing: AddressingVersion) -> Self {
        Self {
            addressing,
            headers: Vec::new(),
        }
    }

    pub fn addressing_version(&self) -> AddressingVersion {
        self.addressing
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Itération dans l'ordre d'insertion
    pub fn iter(&self) -> std::slice::Iter<'_, MessageHeader> {
        self.headers.iter()
    }

    pub fn add(&mut self, name: &str, namespace: &str, value: &str) {
        self.headers.push(MessageHeader::new(name, namespace, value));
    }

    pub fn add_header(&mut self, header: MessageHeader) {
        self.headers.push(header);
    }

    /// Première valeur pour (nom, namespace)
    pub fn find(&self, name: &str, namespace: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.matches(name, namespace))
            .map(|h| h.value.as_str())
    }

    /// Retire tous les en-têtes (nom, namespace) ; renvoie le nombre retiré
    pub fn remove(&mut self, name: &str, namespace: &str) -> usize {
        let before = self.headers.len();
        self.headers.retain(|h| !h.matches(name, namespace));
        before - self.headers.len()
    }

    pub fn clear(&mut self) {
        self.headers.clear();
    }

    pub fn action(&self) -> Option<&str> {
        self.find_addressing(ACTION)
    }

    pub fn set_action(&mut self, action: &str) {
        self.set_addressing(ACTION, action, true);
    }

    pub fn to(&self) -> Option<&str> {
        self.find_addressing(TO)
    }

    pub fn set_to(&mut self, to: &str) {
        self.set_addressing(TO, to, true);
    }

    pub fn message_id(&self) -> Option<&str> {
        self.find_addressing(MESSAGE_ID)
    }

    pub fn set_message_id(&mut self, message_id: &str) {
        self.set_addressing(MESSAGE_ID, message_id, false);
    }

    pub fn relates_to(&self) -> Option<&str> {
        self.find_addressing(RELATES_TO)
    }

    pub fn set_relates_to(&mut self, relates_to: &str) {
        self.set_addressing(RELATES_TO, relates_to, false);
    }

    /// Adresse de `ReplyTo`
    pub fn reply_to(&self) -> Option<&str> {
        self.find_addressing(REPLY_TO)
    }

    pub fn set_reply_to(&mut self, address: &str) {
        self.set_addressing(REPLY_TO, address, false);
    }

    fn find_addressing(&self, name: &str) -> Option<&str> {
        self.find(name, self.addressing.namespace())
    }

    fn set_addressing(&mut self, name: &str, value: &str, must_understand: bool) {
        let namespace = self.addressing.namespace();
        let header = MessageHeader::new(name, namespace, value).must_understand(must_understand);
        match self.headers.iter_mut().find(|h| h.matches(name, namespace)) {
            Some(existing) => *existing = header,
            None => self.headers.push(header),
        }
    }

    /// Sérialise les en-têtes dans un élément `Header` déjà ouvert.
    ///
    /// Les en-têtes du namespace `AddressingNone` ne sont pas émis.
    pub(crate) fn write_to(
        &self,
        writer: &mut XmlBodyWriter,
        envelope_prefix: &str,
    ) -> Result<()> {
        let addressing_ns = self.addressing.namespace();
        for header in &self.headers {
            if header.namespace == AddressingVersion::NONE_NAMESPACE {
                continue;
            }

            let prefix = (header.namespace == addressing_ns).then_some("a");
            writer.write_start_element(prefix, &header.name, Some(&header.namespace))?;
            if header.must_understand {
                writer.write_attribute(&format!("{}:mustUnderstand", envelope_prefix), "1")?;
            }
            if header.name == REPLY_TO && prefix.is_some() {
                writer.write_element_string(prefix, ADDRESS, None, &header.value)?;
            } else {
                writer.write_string(&header.value)?;
            }
            writer.write_end_element()?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a MessageHeaders {
    type Item = &'a MessageHeader;
    type IntoIter = std::slice::Iter<'a, MessageHeader>;

    fn into_iter(self) -> Self::IntoIter {
        self.headers.iter()
    }
}

/// Identifiant de message `urn:uuid:...`
pub fn new_message_id() -> String {
    format!("urn:uuid:{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_single_slot() {
        let mut headers = MessageHeaders::new(AddressingVersion::WSAddressing10);
        assert_eq!(headers.action(), None);

        headers.set_to("http://example.org/service");
        headers.set_action("urn:first");
        headers.set_action("urn:second");

        assert_eq!(headers.action(), Some("urn:second"));
        assert_eq!(headers.len(), 2);
        let names: Vec<_> = headers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["To", "Action"]);
    }

    #[test]
    fn test_generic_headers_keep_order_and_duplicates() {
        let mut headers = MessageHeaders::new(AddressingVersion::None);
        headers.add("Token", "urn:a", "1");
        headers.add("Token", "urn:a", "2");
        headers.add("Token", "urn:b", "3");

        assert_eq!(headers.find("Token", "urn:a"), Some("1"));
        assert_eq!(headers.find("Token", "urn:b"), Some("3"));
        assert_eq!(headers.find("Token", "urn:c"), None);

        let values: Vec<_> = (&headers).into_iter().map(|h| h.value.clone()).collect();
        assert_eq!(values, vec!["1", "2", "3"]);
        // l'itération est redémarrable
        assert_eq!(headers.iter().count(), 3);

        assert_eq!(headers.remove("Token", "urn:a"), 2);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_action_uses_addressing_namespace() {
        let mut headers = MessageHeaders::new(AddressingVersion::WSAddressingAugust2004);
        headers.set_action("urn:act");
        assert_eq!(
            headers.find("Action", AddressingVersion::WSADDRESSING_AUGUST2004_NAMESPACE),
            Some("urn:act")
        );
        assert_eq!(
            headers.find("Action", AddressingVersion::WSADDRESSING10_NAMESPACE),
            None
        );
    }

    #[test]
    fn test_write_headers() {
        let mut headers = MessageHeaders::new(AddressingVersion::WSAddressing10);
        headers.set_action("urn:act");
        headers.set_reply_to("http://client");

        let mut writer = XmlBodyWriter::new();
        writer
            .write_start_element(Some("s"), "Header", Some("urn:env"))
            .unwrap();
        headers.write_to(&mut writer, "s").unwrap();
        writer.write_end_element().unwrap();

        let xml = writer.into_string().unwrap();
        assert!(xml.contains(
            r#"<a:Action xmlns:a="http://www.w3.org/2005/08/addressing" s:mustUnderstand="1">urn:act</a:Action>"#
        ));
        assert!(xml.contains("<a:Address>http://client</a:Address>"));
    }

    #[test]
    fn test_addressing_none_headers_not_written() {
        let mut headers = MessageHeaders::new(AddressingVersion::None);
        headers.set_action("urn:act");
        assert_eq!(headers.action(), Some("urn:act"));

        let mut writer = XmlBodyWriter::new();
        writer
            .write_start_element(Some("s"), "Header", Some("urn:env"))
            .unwrap();
        headers.write_to(&mut writer, "s").unwrap();
        writer.write_end_element().unwrap();

        assert_eq!(
            writer.into_string().unwrap(),
            r#"<s:Header xmlns:s="urn:env"/>"#
        );
    }

    #[test]
    fn test_new_message_id() {
        let id = new_message_id();
        assert!(id.starts_with("urn:uuid:"));
        assert_ne!(id, new_message_id());
    }
}
