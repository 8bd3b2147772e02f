use super::{BindingElement, resolve_message_version};
use crate::errors::Result;
use crate::version::MessageVersion;

/// Liaison composée d'une chaîne ordonnée d'éléments
#[derive(Debug, Default)]
pub struct CustomBinding {
    elements: Vec<Box<dyn BindingElement>>,
}

impl CustomBinding {
    pub fn new(elements: Vec<Box<dyn BindingElement>>) -> Self {
        Self { elements }
    }

    pub fn push<E: BindingElement + 'static>(mut self, element: E) -> Self {
        self.elements.push(Box::new(element));
        self
    }

    pub fn elements(&self) -> &[Box<dyn BindingElement>] {
        &self.elements
    }

    /// Version exposée par l'élément d'encodage de la chaîne
    pub fn message_version(&self) -> Result<MessageVersion> {
        resolve_message_version(&self.elements)
    }

    /// Schéma du premier élément de transport
    pub fn scheme(&self) -> Option<&str> {
        self.elements.iter().find_map(|e| e.scheme())
    }
}
