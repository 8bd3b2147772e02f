//! Curseur de lecture sur le contenu d'un corps de message

use std::ops::Range;

use quick_xml::NsReader;
use quick_xml::encoding::Decoder;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::errors::{MessageError, Result};

/// Nœud visité par [`XmlBodyReader`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Élément ouvrant.
    ///
    /// Les attributs gardent leur nom qualifié (`i:nil`), triés par nom ;
    /// les déclarations `xmlns` n'en font pas partie.
    StartElement {
        local_name: String,
        namespace: Option<String>,
        prefix: Option<String>,
        attributes: Vec<(String, String)>,
    },
    /// Texte décodé ; le texte blanc est conservé tel quel
    Text(String),
    EndElement {
        local_name: String,
    },
}

/// Curseur XML positionné sur le premier nœud de contenu du corps.
///
/// Les éléments `Envelope`/`Body` englobants ne sont jamais visités ; la fin
/// du corps est rapportée par [`XmlBodyReader::is_eof`].
#[derive(Debug, Clone)]
pub struct XmlBodyReader {
    source: String,
    nodes: Vec<XmlNode>,
    // Plage d'octets de chaque nœud dans `source`
    spans: Vec<Range<usize>>,
    position: usize,
}

impl XmlBodyReader {
    /// Analyse un élément englobant et expose ses enfants.
    ///
    /// `xml` doit contenir exactement un élément racine (typiquement le
    /// `Body`) ; tout contenu hors de cet élément est une erreur.
    pub fn from_wrapped(xml: &[u8]) -> Result<Self> {
        let source = std::str::from_utf8(xml)
            .map_err(|e| MessageError::MalformedXml(e.to_string()))?
            .to_string();

        let mut body = Self {
            source: String::new(),
            nodes: Vec::new(),
            spans: Vec::new(),
            position: 0,
        };

        let mut reader = NsReader::from_str(&source);
        let decoder = reader.decoder();
        let mut depth = 0usize;
        let mut root_closed = false;

        loop {
            let offset = reader.buffer_position() as usize;
            let (resolved, event) = reader.read_resolved_event()?;
            let namespace = match resolved {
                ResolveResult::Bound(ns) => Ok(Some(utf8_lossy(ns.as_ref()))),
                ResolveResult::Unbound => Ok(None),
                ResolveResult::Unknown(prefix) => Err(MessageError::MalformedXml(format!(
                    "Prefix '{}' is not bound to a namespace",
                    String::from_utf8_lossy(&prefix)
                ))),
            };
            let span = offset..reader.buffer_position() as usize;

            match event {
                Event::Start(start) => {
                    if root_closed {
                        return Err(MessageError::malformed_xml("Element after the root element"));
                    }
                    if depth > 0 {
                        body.push_start(&start, namespace?, decoder, span)?;
                    }
                    depth += 1;
                }
                Event::Empty(start) => {
                    if root_closed {
                        return Err(MessageError::malformed_xml("Element after the root element"));
                    }
                    if depth > 0 {
                        let end = span.end;
                        body.push_start(&start, namespace?, decoder, span)?;
                        body.push_end(utf8_lossy(start.local_name().as_ref()), end..end);
                    } else {
                        root_closed = true;
                    }
                }
                Event::End(end) => {
                    if depth == 0 {
                        return Err(MessageError::malformed_xml("End element without start element"));
                    }
                    depth -= 1;
                    if depth == 0 {
                        root_closed = true;
                    } else {
                        body.push_end(utf8_lossy(end.local_name().as_ref()), span);
                    }
                }
                Event::Text(text) => {
                    let text = text.xml_content().map_err(quick_xml::Error::from)?;
                    body.push_text_or_reject(depth, &text, span)?;
                }
                Event::CData(data) => {
                    let text = data.xml_content().map_err(quick_xml::Error::from)?;
                    body.push_text_or_reject(depth, &text, span)?;
                }
                Event::GeneralRef(reference) => {
                    let text = resolve_reference(&reference)?;
                    body.push_text_or_reject(depth, &text, span)?;
                }
                Event::Eof => break,
                // Décl., commentaires, instructions de traitement, DOCTYPE
                _ => {}
            }
        }

        if !root_closed {
            return Err(MessageError::malformed_xml("Missing or unclosed root element"));
        }
        body.source = source;
        Ok(body)
    }

    /// Nœud courant ; `None` en fin de corps
    pub fn node(&self) -> Option<&XmlNode> {
        self.nodes.get(self.position)
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.nodes.len()
    }

    /// Avance d'un nœud ; renvoie `false` une fois la fin atteinte
    pub fn read(&mut self) -> bool {
        if self.position < self.nodes.len() {
            self.position += 1;
        }
        !self.is_eof()
    }

    /// Saute le texte blanc et se positionne sur le prochain nœud significatif
    pub fn move_to_content(&mut self) -> Option<&XmlNode> {
        while let Some(XmlNode::Text(text)) = self.node() {
            if !text.trim().is_empty() {
                break;
            }
            self.position += 1;
        }
        self.node()
    }

    pub fn is_start_element(&self, local_name: &str, namespace: Option<&str>) -> bool {
        match self.node() {
            Some(XmlNode::StartElement {
                local_name: name,
                namespace: ns,
                ..
            }) => name == local_name && (namespace.is_none() || ns.as_deref() == namespace),
            _ => false,
        }
    }

    pub fn local_name(&self) -> Option<&str> {
        match self.node() {
            Some(XmlNode::StartElement { local_name, .. })
            | Some(XmlNode::EndElement { local_name }) => Some(local_name),
            _ => None,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self.node() {
            Some(XmlNode::StartElement { namespace, .. }) => namespace.as_deref(),
            _ => None,
        }
    }

    /// Valeur d'un attribut de l'élément courant, par nom qualifié
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        match self.node() {
            Some(XmlNode::StartElement { attributes, .. }) => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Lit le contenu textuel à la position courante.
    ///
    /// - sur du texte : concatène les nœuds texte contigus
    /// - sur un élément ouvrant : concatène tout le texte descendant et se
    ///   place après l'élément fermant correspondant
    /// - sur un élément fermant ou en fin de corps : chaîne vide, sans avancer
    pub fn read_content_as_string(&mut self) -> String {
        let mut content = String::new();
        match self.node() {
            Some(XmlNode::Text(_)) => {
                while let Some(XmlNode::Text(text)) = self.node() {
                    content.push_str(text);
                    self.position += 1;
                }
            }
            Some(XmlNode::StartElement { .. }) => {
                let end = self.matching_end(self.position);
                for node in &self.nodes[self.position..end] {
                    if let XmlNode::Text(text) = node {
                        content.push_str(text);
                    }
                }
                self.position = end + 1;
            }
            _ => {}
        }
        content
    }

    /// Lit le texte d'un élément simple et se place après lui.
    ///
    /// Échoue si le nœud significatif courant n'est pas un élément ouvrant
    /// ou si l'élément contient des éléments enfants.
    pub fn read_element_content_as_string(&mut self) -> Result<String> {
        let name = match self.move_to_content() {
            Some(XmlNode::StartElement { local_name, .. }) => local_name.clone(),
            other => {
                return Err(MessageError::XmlReader(format!(
                    "Expected a start element, found {:?}",
                    other
                )));
            }
        };

        let end = self.matching_end(self.position);
        let mut content = String::new();
        for node in &self.nodes[self.position + 1..end] {
            match node {
                XmlNode::Text(text) => content.push_str(text),
                _ => {
                    return Err(MessageError::XmlReader(format!(
                        "Element '{}' has child elements",
                        name
                    )));
                }
            }
        }
        self.position = end + 1;
        Ok(content)
    }

    /// Texte XML source du nœud courant (élément avec son sous-arbre, ou
    /// texte) puis avance après lui.
    ///
    /// Le fragment est recopié tel quel : les déclarations de namespace
    /// portées par les ancêtres ne sont pas ajoutées. Sur un élément fermant
    /// ou en fin de corps : chaîne vide, sans avancer.
    pub fn read_outer_xml(&mut self) -> String {
        let (range, next) = match self.node() {
            Some(XmlNode::StartElement { .. }) => {
                let end = self.matching_end(self.position);
                (self.spans[self.position].start..self.spans[end].end, end + 1)
            }
            Some(XmlNode::Text(_)) => (self.spans[self.position].clone(), self.position + 1),
            _ => return String::new(),
        };
        self.position = next;
        self.source[range].to_string()
    }

    /// Saute l'élément courant et tout son sous-arbre
    pub fn skip(&mut self) {
        if let Some(XmlNode::StartElement { .. }) = self.node() {
            self.position = self.matching_end(self.position) + 1;
        } else {
            self.read();
        }
    }

    // Index de l'élément fermant qui correspond à l'ouvrant `start`
    fn matching_end(&self, start: usize) -> usize {
        let mut depth = 0usize;
        for (index, node) in self.nodes.iter().enumerate().skip(start) {
            match node {
                XmlNode::StartElement { .. } => depth += 1,
                XmlNode::EndElement { .. } => {
                    depth -= 1;
                    if depth == 0 {
                        return index;
                    }
                }
                XmlNode::Text(_) => {}
            }
        }
        self.nodes.len().saturating_sub(1)
    }

    fn push_start(
        &mut self,
        start: &BytesStart<'_>,
        namespace: Option<String>,
        decoder: Decoder,
        span: Range<usize>,
    ) -> Result<()> {
        let mut attributes = Vec::new();
        for attribute in start.attributes() {
            let attribute = attribute.map_err(quick_xml::Error::from)?;
            if attribute.key.as_namespace_binding().is_some() {
                continue;
            }
            let value = attribute.decode_and_unescape_value(decoder)?;
            attributes.push((utf8_lossy(attribute.key.as_ref()), value.into_owned()));
        }
        attributes.sort();

        self.nodes.push(XmlNode::StartElement {
            local_name: utf8_lossy(start.local_name().as_ref()),
            namespace,
            prefix: start.name().prefix().map(|p| utf8_lossy(p.as_ref())),
            attributes,
        });
        self.spans.push(span);
        Ok(())
    }

    fn push_end(&mut self, local_name: String, span: Range<usize>) {
        self.nodes.push(XmlNode::EndElement { local_name });
        self.spans.push(span);
    }

    fn push_text_or_reject(&mut self, depth: usize, text: &str, span: Range<usize>) -> Result<()> {
        if depth == 0 {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(MessageError::malformed_xml("Text outside of the root element"));
        }
        match (self.nodes.last_mut(), self.spans.last_mut()) {
            (Some(XmlNode::Text(previous)), Some(previous_span)) => {
                previous.push_str(text);
                previous_span.end = span.end;
            }
            _ => {
                self.nodes.push(XmlNode::Text(text.to_string()));
                self.spans.push(span);
            }
        }
        Ok(())
    }
}

fn utf8_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn resolve_reference(reference: &BytesRef<'_>) -> Result<String> {
    if let Some(ch) = reference.resolve_char_ref()? {
        return Ok(ch.to_string());
    }
    let name = reference.decode().map_err(quick_xml::Error::from)?;
    match resolve_predefined_entity(&name) {
        Some(value) => Ok(value.to_string()),
        None => Err(MessageError::MalformedXml(format!(
            "Unknown entity '&{};'",
            name
        ))),
    }
}
