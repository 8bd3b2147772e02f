use super::BindingElement;
use crate::config::Config;
use crate::version::MessageVersion;

/// Encodage texte des messages : fixe la version de message de la liaison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessageEncodingBindingElement {
    message_version: MessageVersion,
    write_encoding: String,
}

impl Default for TextMessageEncodingBindingElement {
    fn default() -> Self {
        Self::new(MessageVersion::DEFAULT, "utf-8")
    }
}

impl TextMessageEncodingBindingElement {
    pub fn new(message_version: MessageVersion, write_encoding: &str) -> Self {
        Self {
            message_version,
            write_encoding: write_encoding.to_string(),
        }
    }

    /// Valeurs `encoding.message_version` et `encoding.write_encoding`
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.get_message_version(), &config.get_write_encoding())
    }

    pub fn with_message_version(mut self, message_version: MessageVersion) -> Self {
        self.message_version = message_version;
        self
    }

    pub fn write_encoding(&self) -> &str {
        &self.write_encoding
    }
}

impl BindingElement for TextMessageEncodingBindingElement {
    fn name(&self) -> &str {
        "TextMessageEncoding"
    }

    fn message_version(&self) -> Option<MessageVersion> {
        Some(self.message_version)
    }
}
