//! Écrivain XML en flux utilisé par les corps de message

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use tracing::trace;

use super::names::{is_ncname, is_qname};
use crate::config::Config;
use crate::errors::{MessageError, Result};

#[derive(Debug)]
struct OpenElement {
    qname: String,
    // Nombre de déclarations de namespace portées par cet élément
    declared: usize,
}

/// Puits XML en flux.
///
/// Accepte des appels élément/attribut/texte et les sérialise via
/// `quick_xml::Writer`. Les attributs ne sont acceptés que tant que la balise
/// ouvrante n'a pas été vidée (avant tout contenu ou enfant). Les
/// déclarations `xmlns` sont émises uniquement quand le préfixe n'est pas
/// déjà lié au même namespace.
pub struct XmlBodyWriter {
    writer: Writer<Vec<u8>>,
    pending: Option<BytesStart<'static>>,
    open: Vec<OpenElement>,
    scopes: Vec<(String, String)>,
    // Profondeur sous laquelle `write_end_element` refuse de fermer
    floor: usize,
}

impl std::fmt::Debug for XmlBodyWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlBodyWriter")
            .field("open", &self.open)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl Default for XmlBodyWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlBodyWriter {
    pub fn new() -> Self {
        Self::from_writer(Writer::new(Vec::new()))
    }

    /// Écrivain indenté de `indent_size` espaces
    pub fn with_indent(indent_size: usize) -> Self {
        Self::from_writer(Writer::new_with_indent(Vec::new(), b' ', indent_size))
    }

    /// Écrivain indenté ou non selon `writer.indent` / `writer.indent_size`
    pub fn from_config(config: &Config) -> Self {
        if config.get_writer_indent() {
            Self::with_indent(config.get_writer_indent_size())
        } else {
            Self::new()
        }
    }

    fn from_writer(writer: Writer<Vec<u8>>) -> Self {
        Self {
            writer,
            pending: None,
            open: Vec::new(),
            scopes: Vec::new(),
            floor: 0,
        }
    }

    /// Namespace actuellement lié à `prefix` (`""` pour le namespace par défaut)
    pub fn lookup_namespace(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// Profondeur courante (nombre d'éléments ouverts)
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Confine les écritures suivantes sous la profondeur courante.
    ///
    /// Les éléments déjà ouverts ne peuvent plus être fermés jusqu'à
    /// [`XmlBodyWriter::end_fragment`], qui reçoit la valeur renvoyée ici.
    pub fn begin_fragment(&mut self) -> usize {
        std::mem::replace(&mut self.floor, self.open.len())
    }

    /// Termine un fragment ouvert par [`XmlBodyWriter::begin_fragment`] ;
    /// échoue si le fragment a laissé des éléments ouverts
    pub fn end_fragment(&mut self, previous: usize) -> Result<()> {
        let floor = std::mem::replace(&mut self.floor, previous);
        let left_open = self.open.len().saturating_sub(floor);
        if left_open > 0 {
            return Err(MessageError::XmlWriter(format!(
                "Fragment left {} element(s) open",
                left_open
            )));
        }
        Ok(())
    }

    /// Ouvre un élément.
    ///
    /// Si `namespace` est fourni et que `prefix` n'y est pas déjà lié, une
    /// déclaration `xmlns` est ajoutée à la balise.
    pub fn write_start_element(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: Option<&str>,
    ) -> Result<()> {
        if !is_ncname(local_name) || prefix.is_some_and(|p| !p.is_empty() && !is_ncname(p)) {
            return Err(MessageError::XmlWriter(format!(
                "Invalid element name '{}'",
                local_name
            )));
        }
        self.flush_pending()?;

        let qname = match prefix {
            Some(p) if !p.is_empty() => format!("{}:{}", p, local_name),
            _ => local_name.to_string(),
        };
        let mut start = BytesStart::new(qname.clone());
        let scope_key = prefix.unwrap_or("");

        let mut declared = 0;
        match namespace {
            Some(ns) => {
                if self.lookup_namespace(scope_key) != Some(ns) {
                    let attr = if scope_key.is_empty() {
                        "xmlns".to_string()
                    } else {
                        format!("xmlns:{}", scope_key)
                    };
                    start.push_attribute((attr.as_str(), ns));
                    self.scopes.push((scope_key.to_string(), ns.to_string()));
                    declared = 1;
                }
            }
            None => {
                if !scope_key.is_empty() && self.lookup_namespace(scope_key).is_none() {
                    return Err(MessageError::XmlWriter(format!(
                        "Prefix '{}' is not bound to a namespace",
                        scope_key
                    )));
                }
            }
        }

        trace!(element = %qname, depth = self.open.len(), "Start element");
        self.pending = Some(start);
        self.open.push(OpenElement { qname, declared });
        Ok(())
    }

    /// Ajoute un attribut à la balise ouvrante en cours
    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        if !is_qname(name) {
            return Err(MessageError::XmlWriter(format!(
                "Invalid attribute name '{}'",
                name
            )));
        }
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(MessageError::xml_writer(
                "Attribute written outside of a start element",
            )),
        }
    }

    /// Déclare explicitement un préfixe sur la balise ouvrante en cours
    pub fn write_xmlns_attribute(&mut self, prefix: &str, namespace: &str) -> Result<()> {
        if self.lookup_namespace(prefix) == Some(namespace) {
            return Ok(());
        }
        let attr = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{}", prefix)
        };
        self.write_attribute(&attr, namespace)?;
        self.scopes.push((prefix.to_string(), namespace.to_string()));
        if let Some(current) = self.open.last_mut() {
            current.declared += 1;
        }
        Ok(())
    }

    /// Écrit du texte (échappé)
    pub fn write_string(&mut self, text: &str) -> Result<()> {
        self.flush_pending()?;
        if !text.is_empty() {
            self.writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        Ok(())
    }

    /// Écrit un fragment XML déjà sérialisé, sans échappement
    pub fn write_raw(&mut self, xml: &str) -> Result<()> {
        self.flush_pending()?;
        self.writer.get_mut().extend_from_slice(xml.as_bytes());
        Ok(())
    }

    /// Ferme l'élément ouvert le plus profond.
    ///
    /// Un élément sans contenu est émis sous forme auto-fermante.
    pub fn write_end_element(&mut self) -> Result<()> {
        if !self.open.is_empty() && self.open.len() <= self.floor {
            return Err(MessageError::xml_writer(
                "End element outside of the current fragment",
            ));
        }
        let element = self
            .open
            .pop()
            .ok_or_else(|| MessageError::xml_writer("End element without open element"))?;

        match self.pending.take() {
            Some(start) => self.writer.write_event(Event::Empty(start))?,
            None => self
                .writer
                .write_event(Event::End(BytesEnd::new(element.qname.clone())))?,
        }

        let keep = self.scopes.len() - element.declared;
        self.scopes.truncate(keep);
        trace!(element = %element.qname, "End element");
        Ok(())
    }

    /// Raccourci pour `<name>text</name>`
    pub fn write_element_string(
        &mut self,
        prefix: Option<&str>,
        local_name: &str,
        namespace: Option<&str>,
        text: &str,
    ) -> Result<()> {
        self.write_start_element(prefix, local_name, namespace)?;
        self.write_string(text)?;
        self.write_end_element()
    }

    /// Ferme tous les éléments ouverts dans le fragment courant
    pub fn write_end_document(&mut self) -> Result<()> {
        while self.open.len() > self.floor {
            self.write_end_element()?;
        }
        Ok(())
    }

    /// Octets produits ; échoue si des éléments sont encore ouverts
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        if let Some(element) = self.open.last() {
            return Err(MessageError::XmlWriter(format!(
                "Element '{}' is still open",
                element.qname
            )));
        }
        Ok(self.writer.into_inner())
    }

    pub fn into_string(self) -> Result<String> {
        let bytes = self.into_bytes()?;
        String::from_utf8(bytes).map_err(|e| MessageError::XmlWriter(e.to_string()))
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.writer.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}
