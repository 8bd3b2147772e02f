use std::fmt::Debug;

use tracing::debug;

use crate::errors::{MessageError, Result};
use crate::version::MessageVersion;

/// Élément composable d'une liaison (encodage, transport…)
pub trait BindingElement: Debug + Send + Sync {
    /// Nom de l'élément, pour les traces
    fn name(&self) -> &str;

    /// Version de message exposée ; seuls les éléments d'encodage en ont une
    fn message_version(&self) -> Option<MessageVersion> {
        None
    }

    /// Schéma d'URI ; seuls les éléments de transport en ont un
    fn scheme(&self) -> Option<&str> {
        None
    }
}

/// Version exposée par le premier élément qui en expose une.
///
/// Les éléments sans version (transports) sont ignorés.
pub fn resolve_message_version<E>(elements: &[E]) -> Result<MessageVersion>
where
    E: AsRef<dyn BindingElement>,
{
    for element in elements {
        let element = element.as_ref();
        match element.message_version() {
            Some(version) => {
                debug!(element = element.name(), version = version.name(), "Resolved message version");
                return Ok(version);
            }
            None => debug!(element = element.name(), "Skipping element without message version"),
        }
    }
    Err(MessageError::NoMessageVersionFound)
}
