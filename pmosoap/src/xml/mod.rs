//! Frontière XML en flux : un puits d'écriture ([`XmlBodyWriter`]) et un
//! curseur de lecture ([`XmlBodyReader`]), tous deux sur `quick-xml`.

pub mod names;
mod reader;
mod writer;

pub use names::encode_local_name;
pub use reader::{XmlBodyReader, XmlNode};
pub use writer::XmlBodyWriter;
