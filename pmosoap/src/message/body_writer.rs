//! Écrivains de corps de message

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::serializer::{DataContractSerializer, ObjectSerializer, TypedPayload};
use crate::errors::{MessageError, Result};
use crate::xml::XmlBodyWriter;

/// Point d'extension : écrit directement le contenu XML d'un corps.
///
/// Prend `self` par `Box` : un écrivain personnalisé est invoqué au plus une
/// fois. Écrire zéro élément est valide et donne un corps présent mais vide.
pub trait CustomBodyWriter: Send {
    fn write_body_contents(self: Box<Self>, writer: &mut XmlBodyWriter) -> Result<()>;
}

impl<F> CustomBodyWriter for F
where
    F: FnOnce(&mut XmlBodyWriter) -> Result<()> + Send,
{
    fn write_body_contents(self: Box<Self>, writer: &mut XmlBodyWriter) -> Result<()> {
        (*self)(writer)
    }
}

/// Source du contenu d'un corps
pub enum BodyContent {
    Empty,
    TypedObject {
        payload: TypedPayload,
        serializer: Arc<dyn ObjectSerializer>,
    },
    Custom(Box<dyn CustomBodyWriter>),
}

impl BodyContent {
    fn kind(&self) -> &'static str {
        match self {
            BodyContent::Empty => "empty",
            BodyContent::TypedObject { .. } => "typed",
            BodyContent::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for BodyContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyContent::Empty => f.write_str("Empty"),
            BodyContent::TypedObject {
                payload,
                serializer,
            } => f
                .debug_struct("TypedObject")
                .field("payload", payload)
                .field("serializer", serializer)
                .finish(),
            BodyContent::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Écrivain de corps vidable une seule fois.
///
/// `is_empty` dépend uniquement de la variante choisie à la création, pas de
/// la quantité de XML effectivement produite.
#[derive(Debug)]
pub struct BodyWriter {
    is_empty: bool,
    kind: &'static str,
    content: Option<BodyContent>,
}

impl BodyWriter {
    pub fn new(content: BodyContent) -> Self {
        Self {
            is_empty: matches!(content, BodyContent::Empty),
            kind: content.kind(),
            content: Some(content),
        }
    }

    pub fn empty() -> Self {
        Self::new(BodyContent::Empty)
    }

    /// Corps typé sérialisé par [`DataContractSerializer`]
    pub fn typed<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        Self::typed_with_serializer(payload, Arc::new(DataContractSerializer::default()))
    }

    pub fn typed_with_serializer<T: Serialize + ?Sized>(
        payload: &T,
        serializer: Arc<dyn ObjectSerializer>,
    ) -> Result<Self> {
        Ok(Self::new(BodyContent::TypedObject {
            payload: TypedPayload::new(payload)?,
            serializer,
        }))
    }

    pub fn custom<W: CustomBodyWriter + 'static>(writer: W) -> Self {
        Self::new(BodyContent::Custom(Box::new(writer)))
    }

    /// Corps écrit par une fermeture
    pub fn from_fn<F>(write: F) -> Self
    where
        F: FnOnce(&mut XmlBodyWriter) -> Result<()> + Send + 'static,
    {
        Self::custom(write)
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn is_consumed(&self) -> bool {
        self.content.is_none()
    }

    /// Vide le contenu dans `writer` ; un second appel échoue avec
    /// [`MessageError::BodyAlreadyConsumed`]
    pub fn write_to(&mut self, writer: &mut XmlBodyWriter) -> Result<()> {
        let content = match self.content.take() {
            Some(content) => content,
            None => {
                warn!(kind = self.kind, "Body writer drained twice");
                return Err(MessageError::BodyAlreadyConsumed);
            }
        };

        debug!(kind = self.kind, "Writing body contents");
        // Le contenu ne peut ni fermer ni laisser ouvert un élément de l'appelant
        let previous = writer.begin_fragment();
        let written = match content {
            BodyContent::Empty => Ok(()),
            BodyContent::TypedObject {
                payload,
                serializer,
            } => serializer.write_object(&payload, writer),
            BodyContent::Custom(custom) => custom.write_body_contents(writer),
        };
        let balanced = writer.end_fragment(previous);
        written?;
        balanced
    }
}
