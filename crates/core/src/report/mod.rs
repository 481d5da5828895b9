//! Record → HUD ARM XML transform.

pub mod client_profile;
pub mod field_map;
pub mod form_9902;
pub mod format;
pub mod queries;
pub mod xml;

use armlink_domain::constants::XSI_NAMESPACE;
use armlink_domain::{ReportKind, Result};

pub use field_map::{EmptyPolicy, FieldFormat, FieldMap, FieldRule};
pub use form_9902::Form9902Records;
pub use xml::XmlElement;

/// `tns:SubmissionData` root carrying the schema namespace and location.
pub(crate) fn submission_root(namespace: &str, schema: &str) -> XmlElement {
    XmlElement::new(field_map::tns("SubmissionData"))
        .attr("xsi:schemaLocation", format!("{namespace} {schema}"))
        .attr("xmlns:tns", namespace)
        .attr("xmlns:xsi", XSI_NAMESPACE)
}

/// Fetched records for one report, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportRecords {
    ClientProfile(Vec<armlink_domain::Record>),
    Form9902(Form9902Records),
}

impl ReportRecords {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::ClientProfile(_) => ReportKind::ClientProfile,
            Self::Form9902(_) => ReportKind::Form9902,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::ClientProfile(records) => records.len(),
            Self::Form9902(records) => records.total(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the XML document for the report.
    pub fn render(&self) -> Result<String> {
        match self {
            Self::ClientProfile(records) => client_profile::render(records),
            Self::Form9902(records) => form_9902::render(records),
        }
    }
}
