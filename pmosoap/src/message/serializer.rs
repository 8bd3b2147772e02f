//! Projection objet → XML des corps typés
//!
//! Le corps `TypedObject` conserve un instantané ([`TypedPayload`]) de la
//! valeur fournie par l'appelant ; la sérialisation effective est déléguée à
//! une stratégie [`ObjectSerializer`] injectable.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::errors::{MessageError, Result};
use crate::xml::{XmlBodyWriter, encode_local_name};

/// Namespace des types primitifs en sérialisation « data contract »
pub const SERIALIZATION_NAMESPACE: &str = "http://schemas.microsoft.com/2003/10/Serialization/";
const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Instantané d'une valeur sérialisable, pris à la création du message
#[derive(Debug, Clone, PartialEq)]
pub struct TypedPayload {
    type_name: String,
    value: Value,
}

impl TypedPayload {
    pub fn new<T: Serialize + ?Sized>(payload: &T) -> Result<Self> {
        let value = serde_json::to_value(payload).map_err(MessageError::serialization)?;
        Ok(Self {
            type_name: short_type_name(std::any::type_name::<T>()),
            value,
        })
    }

    /// Nom court du type Rust d'origine (sans chemin ni paramètres)
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Stratégie de sérialisation d'un corps typé
pub trait ObjectSerializer: Send + Sync + std::fmt::Debug {
    /// Écrit `payload` comme unique(s) élément(s) du corps
    fn write_object(&self, payload: &TypedPayload, writer: &mut XmlBodyWriter) -> Result<()>;
}

/// Projection de style « data contract ».
///
/// - chaîne : `<string xmlns="…/Serialization/">valeur</string>`
/// - booléen, entier, flottant : `<boolean>`, `<long>`, `<double>`
/// - objet : élément nommé d'après le type, champs en ordre alphabétique ;
///   les clés qui ne sont pas des noms XML sont encodées (`_xHHHH_`)
/// - tableau : `<ArrayOfanyType>` contenant des `<anyType>`
/// - null : `<anyType i:nil="true"/>`
#[derive(Debug, Clone)]
pub struct DataContractSerializer {
    namespace: String,
}

impl Default for DataContractSerializer {
    fn default() -> Self {
        Self::new(SERIALIZATION_NAMESPACE)
    }
}

impl DataContractSerializer {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn write_value(
        &self,
        name: Option<&str>,
        value: &Value,
        writer: &mut XmlBodyWriter,
    ) -> Result<()> {
        let ns = Some(self.namespace.as_str());
        match value {
            Value::Null => {
                writer.write_start_element(None, name.unwrap_or("anyType"), ns)?;
                writer.write_xmlns_attribute("i", XSI_NAMESPACE)?;
                writer.write_attribute("i:nil", "true")?;
                writer.write_end_element()
            }
            Value::Bool(b) => {
                writer.write_element_string(None, name.unwrap_or("boolean"), ns, &b.to_string())
            }
            Value::Number(n) => {
                let primitive = if n.is_f64() { "double" } else { "long" };
                writer.write_element_string(None, name.unwrap_or(primitive), ns, &n.to_string())
            }
            Value::String(s) => writer.write_element_string(None, name.unwrap_or("string"), ns, s),
            Value::Array(items) => {
                writer.write_start_element(None, name.unwrap_or("ArrayOfanyType"), ns)?;
                for item in items {
                    self.write_value(Some("anyType"), item, writer)?;
                }
                writer.write_end_element()
            }
            Value::Object(fields) => {
                writer.write_start_element(None, name.unwrap_or("anyType"), ns)?;
                // serde_json::Map est trié par clé
                for (field, field_value) in fields {
                    let field = encode_local_name(field)?;
                    self.write_value(Some(&field), field_value, writer)?;
                }
                writer.write_end_element()
            }
        }
    }
}

impl ObjectSerializer for DataContractSerializer {
    fn write_object(&self, payload: &TypedPayload, writer: &mut XmlBodyWriter) -> Result<()> {
        let root = match payload.value() {
            Value::Object(_) => Some(encode_local_name(payload.type_name())?),
            _ => None,
        };
        self.write_value(root.as_deref(), payload.value(), writer)
    }
}

/// Sérialisation via `quick_xml::se`, racine nommée d'après le type
#[derive(Debug, Clone, Default)]
pub struct XmlSerdeSerializer;

impl ObjectSerializer for XmlSerdeSerializer {
    fn write_object(&self, payload: &TypedPayload, writer: &mut XmlBodyWriter) -> Result<()> {
        let xml = quick_xml::se::to_string_with_root(payload.type_name(), payload.value())
            .map_err(MessageError::serialization)?;
        writer.write_raw(&xml)
    }
}

/// Sérialiseur par défaut selon `serializer.kind`
pub fn serializer_from_config(config: &Config) -> Arc<dyn ObjectSerializer> {
    match config.get_serializer_kind().as_str() {
        "xml_serde" => Arc::new(XmlSerdeSerializer),
        _ => Arc::new(DataContractSerializer::new(
            &config.get_serializer_namespace(),
        )),
    }
}
