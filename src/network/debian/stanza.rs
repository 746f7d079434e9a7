//! Stanza splitting and parsing
//!
//! A stanza is a run of logical lines opened by `auto`, `iface`, `mapping`
//! or an `allow-*` line. Only `auto` and `iface` stanzas are understood.

use super::method::parse_config_method;
use crate::NetconfError;
use crate::network::ConfigMethod;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Options whose values accumulate across repeated lines
const MULTI_VALUE_OPTIONS: &[&str] = &["post-up", "pre-down"];

/// Longest interface name the kernel accepts (`IFNAMSIZ` minus the NUL)
const MAX_INTERFACE_NAME_LEN: usize = 15;

/// A parsed stanza
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Auto(AutoDeclaration),
    Interface(InterfaceDeclaration),
}

/// `auto <name>...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoDeclaration {
    pub interfaces: Vec<String>,
}

/// `iface <name> <family> <method>` followed by its options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDeclaration {
    pub name: String,
    pub address_family: String,
    pub method: ConfigMethod,
    pub options: InterfaceOptions,
    /// Named by an `auto` stanza somewhere in the document
    pub auto: bool,
}

/// Free-form option map of an `iface` stanza
///
/// Keys nothing downstream understands are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceOptions {
    values: BTreeMap<String, Vec<String>>,
}

impl InterfaceOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// All values of `key`, if the option was given at all
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// The value of `key` when it was given exactly one value
    pub fn single(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some([value]) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Replace the values of `key`
    pub fn set(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.values.insert(key.into(), values);
    }

    /// Append one value to `key`, creating it if needed
    pub fn append(&mut self, key: impl Into<String>, value: Option<String>) {
        let entry = self.values.entry(key.into()).or_default();
        if let Some(value) = value {
            entry.push(value);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Vec<String>)> for InterfaceOptions {
    fn from_iter<T: IntoIterator<Item = (K, Vec<String>)>>(iter: T) -> Self {
        let mut options = Self::new();
        for (key, values) in iter {
            options.set(key, values);
        }
        options
    }
}

/// Parse logical lines into declarations
///
/// Interfaces named by any `auto` stanza, before or after their `iface`
/// stanza, are flagged as auto.
pub fn parse_stanzas(lines: &[String]) -> Result<Vec<Declaration>, NetconfError> {
    let mut declarations = split_stanzas(lines)?
        .into_iter()
        .map(parse_stanza)
        .collect::<Result<Vec<_>, _>>()?;

    let autos: HashSet<String> = declarations
        .iter()
        .filter_map(|declaration| match declaration {
            Declaration::Auto(auto) => Some(auto.interfaces.iter().cloned()),
            Declaration::Interface(_) => None,
        })
        .flatten()
        .collect();

    for declaration in &mut declarations {
        if let Declaration::Interface(iface) = declaration
            && autos.contains(&iface.name)
        {
            iface.auto = true;
        }
    }

    Ok(declarations)
}

/// Group logical lines into stanzas
pub fn split_stanzas(lines: &[String]) -> Result<Vec<&[String]>, NetconfError> {
    let mut stanzas = Vec::new();
    let mut start: Option<usize> = None;

    for (i, line) in lines.iter().enumerate() {
        if is_stanza_start(line) {
            if let Some(s) = start {
                stanzas.push(&lines[s..i]);
            }
            start = Some(i);
        } else if start.is_none() {
            return Err(NetconfError::MissingStanzaStart(line.clone()));
        }
    }

    if let Some(s) = start {
        stanzas.push(&lines[s..]);
    }

    Ok(stanzas)
}

/// Whether `line` opens a new stanza
pub fn is_stanza_start(line: &str) -> bool {
    matches!(
        line.split_whitespace().next(),
        Some("auto" | "iface" | "mapping")
    ) || line.starts_with("allow-")
}

/// Parse one stanza into a declaration
pub fn parse_stanza(stanza: &[String]) -> Result<Declaration, NetconfError> {
    let Some((first, options)) = stanza.split_first() else {
        return Err(NetconfError::MalformedStanzaStart(String::new()));
    };

    let tokens: Vec<&str> = first.split_whitespace().collect();
    let [kind, attributes @ ..] = tokens.as_slice() else {
        return Err(NetconfError::MalformedStanzaStart(first.clone()));
    };
    if attributes.is_empty() {
        return Err(NetconfError::MalformedStanzaStart(first.clone()));
    }

    match *kind {
        "auto" => Ok(Declaration::Auto(parse_auto_stanza(attributes))),
        "iface" => parse_interface_stanza(first, attributes, options).map(Declaration::Interface),
        other => Err(NetconfError::UnknownStanza(other.to_string())),
    }
}

fn parse_auto_stanza(attributes: &[&str]) -> AutoDeclaration {
    AutoDeclaration {
        interfaces: attributes.iter().map(|s| s.to_string()).collect(),
    }
}

fn parse_interface_stanza(
    line: &str,
    attributes: &[&str],
    options: &[String],
) -> Result<InterfaceDeclaration, NetconfError> {
    let [name, family, method, ..] = attributes else {
        return Err(NetconfError::MalformedStanzaStart(line.to_string()));
    };
    if !is_valid_interface_name(name) {
        return Err(NetconfError::InvalidInterfaceName(name.to_string()));
    }

    let options = parse_options(options);
    let method = parse_config_method(name, method, &options)?;
    debug!("Parsed interface {} ({} {})", name, family, method.keyword());

    Ok(InterfaceDeclaration {
        name: name.to_string(),
        address_family: family.to_string(),
        method,
        options,
        auto: false,
    })
}

/// Whether the kernel would accept `name` as a link name
///
/// Unit files are named after the interface, so this also keeps every unit
/// inside the unit directory.
pub fn is_valid_interface_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_INTERFACE_NAME_LEN
        && name != "."
        && name != ".."
        && !name.contains(['/', '\0'])
}

/// Build the option map from the lines following an `iface` line
///
/// `post-up` and `pre-down` keep one value per line: the rest of the line.
/// Every other key takes the tokens after it, the last repetition winning.
pub fn parse_options(lines: &[String]) -> InterfaceOptions {
    let mut options = InterfaceOptions::new();

    for line in lines {
        let Some(key) = line.split_whitespace().next() else {
            continue;
        };

        if MULTI_VALUE_OPTIONS.contains(&key) {
            let rest = line.trim_start()[key.len()..].trim();
            let value = (!rest.is_empty()).then(|| rest.to_string());
            options.append(key, value);
        } else {
            let values = line
                .split_whitespace()
                .skip(1)
                .map(str::to_string)
                .collect();
            options.set(key, values);
        }
    }

    options
}
