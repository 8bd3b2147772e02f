use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pmosoap::channels::{
    BindingElement, CustomBinding, HttpTransportBindingElement, HttpsTransportBindingElement,
    TextMessageEncodingBindingElement, resolve_message_version,
};
use pmosoap::message::{CustomBodyWriter, Message, MessageState, XmlSerdeSerializer};
use pmosoap::version::SUPPORTED_VERSIONS;
use pmosoap::xml::{XmlBodyWriter, XmlNode};
use pmosoap::{AddressingVersion, EnvelopeVersion, MessageError, MessageVersion, Result};
use serde::Serialize;

const ACTION: &str = "http://tempuri.org/someserviceendpoint";

/// Écrivain personnalisé qui n'écrit rien
struct CustomBodyWriterNoContent;

impl CustomBodyWriter for CustomBodyWriterNoContent {
    fn write_body_contents(self: Box<Self>, _writer: &mut XmlBodyWriter) -> Result<()> {
        Ok(())
    }
}

#[test]
fn test_message_version_matches_envelope_and_addressing() {
    for (name, envelope, addressing) in SUPPORTED_VERSIONS {
        let version = MessageVersion::create(envelope, addressing).unwrap();
        assert_eq!(version.envelope(), envelope, "{}", name);
        assert_eq!(version.addressing(), addressing, "{}", name);
        assert_eq!(version.name(), name);
    }

    let named = [
        (
            MessageVersion::SOAP12_WSADDRESSING10,
            EnvelopeVersion::Soap12,
            AddressingVersion::WSAddressing10,
        ),
        (
            MessageVersion::SOAP11_WSADDRESSING10,
            EnvelopeVersion::Soap11,
            AddressingVersion::WSAddressing10,
        ),
        (
            MessageVersion::SOAP12_WSADDRESSING_AUGUST2004,
            EnvelopeVersion::Soap12,
            AddressingVersion::WSAddressingAugust2004,
        ),
        (
            MessageVersion::SOAP11,
            EnvelopeVersion::Soap11,
            AddressingVersion::None,
        ),
        (
            MessageVersion::NONE,
            EnvelopeVersion::None,
            AddressingVersion::None,
        ),
    ];
    for (version, envelope, addressing) in named {
        assert_eq!(version.envelope(), envelope);
        assert_eq!(version.addressing(), addressing);
    }
}

#[test]
fn test_create_message_with_no_body() {
    for version in MessageVersion::all() {
        let message = Message::create(version, ACTION);
        assert_eq!(message.version(), version);
        assert_eq!(message.headers().action(), Some(ACTION));
        assert!(message.is_empty());
    }
}

#[test]
fn test_create_message_with_body() {
    // TODO: confirm the wrapper element for primitive payloads (`<string>` in
    // the serialization namespace) against an independent SOAP stack.
    let content = "This is what goes in the body of the message.";
    let message =
        Message::create_with_body(MessageVersion::SOAP12_WSADDRESSING10, ACTION, content).unwrap();

    assert_eq!(message.version(), MessageVersion::SOAP12_WSADDRESSING10);
    assert_eq!(message.headers().action(), Some(ACTION));
    assert!(!message.is_empty());

    let mut reader = message.get_reader_at_body_contents().unwrap();
    assert!(reader.is_start_element("string", None));
    assert_eq!(reader.read_content_as_string(), content);
}

#[test]
fn test_round_trip_hello() {
    let message = Message::create_with_body(MessageVersion::SOAP11, ACTION, "Hello").unwrap();
    let mut reader = message.get_reader_at_body_contents().unwrap();
    assert_eq!(reader.read_content_as_string(), "Hello");
    assert!(reader.is_eof());
}

#[test]
fn test_round_trip_whitespace_payloads() {
    for content in ["   ", "\t", "  Hello \n"] {
        let message = Message::create_with_body(MessageVersion::SOAP12, ACTION, content).unwrap();
        let mut reader = message.get_reader_at_body_contents().unwrap();
        assert_eq!(reader.read_content_as_string(), content, "{:?}", content);
    }
}

#[test]
fn test_create_message_with_custom_body_writer() {
    let message = Message::create_with_custom_writer(
        MessageVersion::SOAP12_WSADDRESSING10,
        ACTION,
        CustomBodyWriterNoContent,
    );

    assert_eq!(message.version(), MessageVersion::SOAP12_WSADDRESSING10);
    assert_eq!(message.headers().action(), Some(ACTION));
    assert!(!message.is_empty());

    let mut reader = message.get_reader_at_body_contents().unwrap();
    assert_eq!(reader.read_content_as_string(), "");
    assert!(!message.is_empty());
}

#[test]
fn test_custom_body_writer_content_is_readable() {
    let message = Message::create_with_custom_writer(
        MessageVersion::SOAP12_WSADDRESSING10,
        ACTION,
        |writer: &mut XmlBodyWriter| {
            writer.write_start_element(Some("u"), "Play", Some("urn:test"))?;
            writer.write_attribute("id", "1")?;
            writer.write_element_string(None, "InstanceID", None, "0")?;
            writer.write_end_element()
        },
    );

    let mut reader = message.get_reader_at_body_contents().unwrap();
    match reader.move_to_content() {
        Some(XmlNode::StartElement {
            local_name,
            namespace,
            prefix,
            attributes,
        }) => {
            assert_eq!(local_name, "Play");
            assert_eq!(namespace.as_deref(), Some("urn:test"));
            assert_eq!(prefix.as_deref(), Some("u"));
            assert_eq!(attributes, &vec![("id".to_string(), "1".to_string())]);
        }
        other => panic!("Unexpected node: {:?}", other),
    }
    assert_eq!(reader.read_content_as_string(), "0");
}

#[test]
fn test_custom_writer_invoked_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let message = Message::create_with_custom_writer(
        MessageVersion::SOAP12,
        ACTION,
        move |_writer: &mut XmlBodyWriter| -> Result<()> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        },
    );

    message.get_reader_at_body_contents().unwrap();
    assert!(message.get_reader_at_body_contents().is_err());
    assert!(message.to_xml_string().is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_second_body_read_fails() {
    let message = Message::create_with_body(MessageVersion::SOAP12, ACTION, "Hello").unwrap();

    let mut reader = message.get_reader_at_body_contents().unwrap();
    assert_eq!(reader.read_content_as_string(), "Hello");
    assert_eq!(message.state(), MessageState::BodyConsumed);

    assert!(matches!(
        message.get_reader_at_body_contents(),
        Err(MessageError::MessageBodyConsumed)
    ));
    assert!(!message.is_empty());
}

#[test]
fn test_concurrent_reads_have_single_winner() {
    let message = Message::create_with_body(MessageVersion::SOAP12, ACTION, "Hello").unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    message
                        .get_reader_at_body_contents()
                        .map(|mut reader| reader.read_content_as_string())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(successes, vec!["Hello"]);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(MessageError::MessageBodyConsumed)))
    );
}

#[test]
fn test_message_version_string() {
    let binding = CustomBinding::new(vec![
        Box::new(TextMessageEncodingBindingElement::default()),
        Box::new(HttpTransportBindingElement::default()),
    ]);
    let version = binding.message_version().unwrap();

    let expected = "Soap12 (http://www.w3.org/2003/05/soap-envelope) Addressing10 (http://www.w3.org/2005/08/addressing)";
    assert_eq!(version.to_string(), expected);
    assert_eq!(
        MessageVersion::create(EnvelopeVersion::Soap12, AddressingVersion::WSAddressing10)
            .unwrap()
            .to_string(),
        expected
    );
}

#[test]
fn test_binding_without_encoding() {
    let elements: Vec<Box<dyn BindingElement>> = vec![
        Box::new(HttpTransportBindingElement::default()),
        Box::new(HttpsTransportBindingElement::default()),
    ];
    assert!(matches!(
        resolve_message_version(&elements),
        Err(MessageError::NoMessageVersionFound)
    ));
}

#[test]
fn test_invalid_version_combination() {
    let err = MessageVersion::create(EnvelopeVersion::None, AddressingVersion::WSAddressing10)
        .unwrap_err();
    match err {
        MessageError::InvalidVersionCombination {
            envelope,
            addressing,
        } => {
            assert_eq!(envelope, EnvelopeVersion::None);
            assert_eq!(addressing, AddressingVersion::WSAddressing10);
        }
        other => panic!("Unexpected error: {}", other),
    }
}

#[derive(Serialize)]
struct Track {
    title: String,
    number: u32,
}

#[test]
fn test_typed_object_body() {
    let track = Track {
        title: "Intro".to_string(),
        number: 1,
    };
    let message = Message::create_with_body(MessageVersion::SOAP12, ACTION, &track).unwrap();

    let mut reader = message.get_reader_at_body_contents().unwrap();
    assert!(reader.is_start_element(
        "Track",
        Some("http://schemas.microsoft.com/2003/10/Serialization/")
    ));
    assert!(reader.read());
    assert!(reader.is_start_element("number", None));
    assert_eq!(reader.read_content_as_string(), "1");
    assert!(reader.is_start_element("title", None));
    assert_eq!(reader.read_content_as_string(), "Intro");
}

#[test]
fn test_injected_serializer() {
    let track = Track {
        title: "Intro".to_string(),
        number: 1,
    };
    let message = Message::create_with_serializer(
        MessageVersion::SOAP11,
        ACTION,
        &track,
        Arc::new(XmlSerdeSerializer),
    )
    .unwrap();

    let mut reader = message.get_reader_at_body_contents().unwrap();
    assert!(reader.is_start_element("Track", None));
    assert_eq!(reader.namespace(), None);
    assert_eq!(reader.read_content_as_string(), "1Intro");
}

#[test]
fn test_write_full_envelope() {
    let mut message =
        Message::create_with_body(MessageVersion::SOAP12_WSADDRESSING10, ACTION, "Hello").unwrap();
    message.headers_mut().set_to("http://example.org/service");

    let xml = message.to_xml_string().unwrap();
    assert!(xml.starts_with(r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope">"#));
    assert!(xml.contains(&format!(
        r#"<a:Action xmlns:a="http://www.w3.org/2005/08/addressing" s:mustUnderstand="1">{}</a:Action>"#,
        ACTION
    )));
    assert!(xml.contains(">http://example.org/service</a:To>"));
    assert!(xml.contains(">Hello</string></s:Body></s:Envelope>"));
    assert_eq!(message.state(), MessageState::BodyConsumed);
}
