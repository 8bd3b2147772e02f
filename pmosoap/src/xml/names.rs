//! Noms XML : validation et encodage des noms locaux

use crate::errors::{MessageError, Result};

fn is_name_start_char(ch: char) -> bool {
    matches!(ch,
        'A'..='Z'
        | 'a'..='z'
        | '_'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(ch: char) -> bool {
    is_name_start_char(ch)
        || matches!(ch,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}

/// Nom sans `:` utilisable comme nom local ou préfixe
pub fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => is_name_start_char(first) && chars.all(is_name_char),
        None => false,
    }
}

/// Nom éventuellement préfixé (`prefix:local`)
pub fn is_qname(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => is_ncname(prefix) && is_ncname(local),
        None => is_ncname(name),
    }
}

/// Encode un nom arbitraire en nom local valide.
///
/// Chaque caractère interdit devient `_xHHHH_` (8 chiffres hors du plan
/// multilingue de base). Un `_` qui ouvrirait une telle séquence est
/// lui-même encodé, le décodage reste donc sans ambiguïté. Un nom vide est
/// refusé.
pub fn encode_local_name(name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(MessageError::serialization("Empty element name"));
    }

    let mut encoded = String::with_capacity(name.len());
    for (index, ch) in name.char_indices() {
        let valid = if index == 0 {
            is_name_start_char(ch)
        } else {
            is_name_char(ch)
        };
        if valid && !(ch == '_' && starts_with_escape(&name[index..])) {
            encoded.push(ch);
        } else if u32::from(ch) > 0xFFFF {
            encoded.push_str(&format!("_x{:08X}_", u32::from(ch)));
        } else {
            encoded.push_str(&format!("_x{:04X}_", u32::from(ch)));
        }
    }
    Ok(encoded)
}

// `_xHHHH_` ou `_xHHHHHHHH_` en tête de `rest`
fn starts_with_escape(rest: &str) -> bool {
    let bytes = rest.as_bytes();
    [4usize, 8].into_iter().any(|digits| {
        bytes.len() >= digits + 3
            && bytes[0] == b'_'
            && bytes[1] == b'x'
            && bytes[2..2 + digits].iter().all(u8::is_ascii_hexdigit)
            && bytes[2 + digits] == b'_'
    })
}
