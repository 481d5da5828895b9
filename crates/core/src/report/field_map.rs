//! Declarative field-to-tag mapping.
//!
//! A [`FieldMap`] is an ordered table of [`FieldRule`]s. Each rule names the
//! output tag, the CRM field it reads, how the value is formatted, and what
//! happens when the value is empty. Rules are applied in table order, which
//! is also the element order the schema expects.

use std::collections::HashSet;

use armlink_domain::{ArmLinkError, Record, Result};

use super::format::{format_date, format_datetime};
use super::xml::XmlElement;

/// Namespace prefix every schema element is written with.
pub const TNS: &str = "tns";

pub fn tns(tag: &str) -> String {
    format!("{TNS}:{tag}")
}

/// How a present value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    Text,
    /// `MM-DD-YYYY`
    Date,
    /// `MM-DD-YYYY HH:MM`
    DateTime,
    /// `;`-delimited source exploded into one `item` child per value.
    MultiValue { item: &'static str },
}

/// What to emit when the source value is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Omit the element for null, `false`, zero and empty string.
    OmitFalsy,
    /// Omit only for null; an explicit zero is emitted.
    OmitNull,
    /// Emit the given text instead of a falsy value.
    Default(&'static str),
}

/// One row of a field map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub tag: &'static str,
    pub source: &'static str,
    pub format: FieldFormat,
    pub policy: EmptyPolicy,
}

/// Rendered value of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Text(String),
    Items(Vec<String>),
}

impl FieldRule {
    pub const fn text(tag: &'static str, source: &'static str) -> Self {
        Self { tag, source, format: FieldFormat::Text, policy: EmptyPolicy::OmitFalsy }
    }

    pub const fn date(tag: &'static str, source: &'static str) -> Self {
        Self { tag, source, format: FieldFormat::Date, policy: EmptyPolicy::OmitFalsy }
    }

    pub const fn datetime(tag: &'static str, source: &'static str) -> Self {
        Self { tag, source, format: FieldFormat::DateTime, policy: EmptyPolicy::OmitFalsy }
    }

    pub const fn multi(tag: &'static str, item: &'static str, source: &'static str) -> Self {
        Self { tag, source, format: FieldFormat::MultiValue { item }, policy: EmptyPolicy::OmitFalsy }
    }

    /// Emit explicit zeros; omit only null.
    #[must_use]
    pub const fn keep_zero(mut self) -> Self {
        self.policy = EmptyPolicy::OmitNull;
        self
    }

    #[must_use]
    pub const fn or_default(mut self, default: &'static str) -> Self {
        self.policy = EmptyPolicy::Default(default);
        self
    }

    /// Renders the rule against `record`. `None` means the element is omitted.
    pub fn render(&self, record: &Record) -> Result<Option<Rendered>> {
        let value = record.get(self.source);
        let present = match self.policy {
            EmptyPolicy::OmitFalsy | EmptyPolicy::Default(_) => value.filter(|v| v.is_truthy()),
            EmptyPolicy::OmitNull => value.filter(|v| !v.is_null()),
        };

        let Some(value) = present else {
            return Ok(match self.policy {
                EmptyPolicy::Default(default) => Some(Rendered::Text(default.to_string())),
                EmptyPolicy::OmitFalsy | EmptyPolicy::OmitNull => None,
            });
        };

        let raw = value.to_string();
        let rendered = match self.format {
            FieldFormat::Text => Rendered::Text(raw),
            FieldFormat::Date => Rendered::Text(format_date(&raw).map_err(|e| self.context(e))?),
            FieldFormat::DateTime => {
                Rendered::Text(format_datetime(&raw).map_err(|e| self.context(e))?)
            }
            // every delimited segment becomes one item, untrimmed and in order
            FieldFormat::MultiValue { .. } => {
                Rendered::Items(raw.split(';').map(String::from).collect())
            }
        };
        Ok(Some(rendered))
    }

    /// Renders the rule into a `tns:` element.
    pub fn element(&self, record: &Record) -> Result<Option<XmlElement>> {
        Ok(self.render(record)?.map(|rendered| match (rendered, self.format) {
            (Rendered::Items(items), FieldFormat::MultiValue { item }) => {
                let mut parent = XmlElement::new(tns(self.tag));
                for value in items {
                    parent.push(XmlElement::text(tns(item), value));
                }
                parent
            }
            (Rendered::Items(items), _) => XmlElement::text(tns(self.tag), items.join(";")),
            (Rendered::Text(text), _) => XmlElement::text(tns(self.tag), text),
        }))
    }

    fn context(&self, err: ArmLinkError) -> ArmLinkError {
        match err {
            ArmLinkError::InvalidInput(msg) => {
                ArmLinkError::InvalidInput(format!("{} ({}): {msg}", self.tag, self.source))
            }
            other => other,
        }
    }
}

/// Ordered rule table with unique output tags.
#[derive(Debug, Clone)]
pub struct FieldMap {
    rules: Vec<FieldRule>,
}

impl FieldMap {
    /// Builds a map, rejecting tables that emit the same tag twice.
    pub fn new(rules: impl IntoIterator<Item = FieldRule>) -> Result<Self> {
        let rules: Vec<FieldRule> = rules.into_iter().collect();
        let mut tags = HashSet::new();
        for rule in &rules {
            if !tags.insert(rule.tag) {
                return Err(ArmLinkError::Internal(format!("duplicate tag {} in field map", rule.tag)));
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Applies every rule to `record`, appending the emitted elements to `parent`.
    pub fn apply_into(&self, record: &Record, parent: &mut XmlElement) -> Result<()> {
        for rule in &self.rules {
            if let Some(element) = rule.element(record)? {
                parent.push(element);
            }
        }
        Ok(())
    }
}
