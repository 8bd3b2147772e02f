use super::BindingElement;

const DEFAULT_MAX_RECEIVED_MESSAGE_SIZE: u64 = 65536;

/// Transport HTTP ; n'expose aucune version de message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportBindingElement {
    max_received_message_size: u64,
}

impl Default for HttpTransportBindingElement {
    fn default() -> Self {
        Self {
            max_received_message_size: DEFAULT_MAX_RECEIVED_MESSAGE_SIZE,
        }
    }
}

impl HttpTransportBindingElement {
    pub fn with_max_received_message_size(mut self, size: u64) -> Self {
        self.max_received_message_size = size;
        self
    }

    pub fn max_received_message_size(&self) -> u64 {
        self.max_received_message_size
    }
}

impl BindingElement for HttpTransportBindingElement {
    fn name(&self) -> &str {
        "HttpTransport"
    }

    fn scheme(&self) -> Option<&str> {
        Some("http")
    }
}

/// Transport HTTPS
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpsTransportBindingElement {
    http: HttpTransportBindingElement,
}

impl HttpsTransportBindingElement {
    pub fn with_max_received_message_size(mut self, size: u64) -> Self {
        self.http = self.http.with_max_received_message_size(size);
        self
    }

    pub fn max_received_message_size(&self) -> u64 {
        self.http.max_received_message_size()
    }
}

impl BindingElement for HttpsTransportBindingElement {
    fn name(&self) -> &str {
        "HttpsTransport"
    }

    fn scheme(&self) -> Option<&str> {
        Some("https")
    }
}
