//! Param tree parsing for mzDB metadata
//!
//! mzDB stores run, spectrum and chromatogram metadata as small XML documents
//! derived from mzML's `paramGroup` model:
//!
//! ```xml
//! <params>
//!   <cvParams>
//!     <cvParam cvRef="MS" accession="MS:1000511" name="ms level" value="1"/>
//!   </cvParams>
//!   <userParams>
//!     <userParam name="ms1_bb_mz_width" value="5" type="xsd:float"/>
//!   </userParams>
//!   <userTexts>
//!     <userText name="instrumentMethods" type="xsd:string">...</userText>
//!   </userTexts>
//! </params>
//! ```
//!
//! [`ParamTree::parse`] reads such a document into three ordered groups.
//! Unknown elements are skipped so vendor extensions do not break parsing.

use std::str::FromStr;

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::codec::DecodeError;

/// A controlled vocabulary parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvParam {
    /// CV reference (e.g., "MS" for PSI-MS)
    pub cv_ref: String,

    /// Accession number (e.g., "MS:1000511")
    pub accession: String,

    /// Human-readable name
    pub name: String,

    /// Optional value
    pub value: Option<String>,

    /// Unit CV reference
    pub unit_cv_ref: Option<String>,

    /// Unit accession
    pub unit_accession: Option<String>,

    /// Unit name
    pub unit_name: Option<String>,
}

impl CvParam {
    /// Parse the value into `T`, `None` if missing or unparsable
    pub fn value_as<T: FromStr>(&self) -> Option<T> {
        self.value.as_ref()?.parse().ok()
    }

    /// Check if this is a flag param (no value or `value=""`)
    pub fn is_flag(&self) -> bool {
        self.value.as_deref().map_or(true, str::is_empty)
    }
}

/// A user-defined parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserParam {
    /// CV reference, usually absent
    pub cv_ref: Option<String>,

    /// Accession, usually absent or "MS:-1"
    pub accession: Option<String>,

    /// Parameter name
    pub name: String,

    /// Parameter value
    pub value: Option<String>,

    /// XSD type (e.g., "xsd:float")
    pub param_type: Option<String>,
}

impl UserParam {
    /// Parse the value into `T`, `None` if missing or unparsable
    pub fn value_as<T: FromStr>(&self) -> Option<T> {
        self.value.as_ref()?.parse().ok()
    }
}

/// A named block of free text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserText {
    /// CV reference, usually absent
    pub cv_ref: Option<String>,

    /// Accession, usually absent
    pub accession: Option<String>,

    /// Block name (e.g., "instrumentMethods")
    pub name: String,

    /// XSD type
    pub text_type: Option<String>,

    /// The text content
    pub text: String,
}

/// Hierarchical key/value metadata attached to an mzDB entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamTree {
    /// `<cvParams>` group
    pub cv_params: Vec<CvParam>,
    /// `<userParams>` group
    pub user_params: Vec<UserParam>,
    /// `<userTexts>` group
    pub user_texts: Vec<UserText>,
}

impl ParamTree {
    /// Parse a param tree XML document.
    ///
    /// `cvParam`/`userParam`/`userText` elements are collected wherever they
    /// appear, so both grouped (`<cvParams>`) and flat layouts are accepted.
    pub fn parse(xml: &str) -> Result<Self, DecodeError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut tree = ParamTree::default();
        let mut current_text: Option<UserText> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.name().as_ref() {
                    b"cvParam" => tree.cv_params.push(parse_cv_param(e)?),
                    b"userParam" => tree.user_params.push(parse_user_param(e)?),
                    b"userText" => current_text = Some(parse_user_text(e)?),
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                    b"cvParam" => tree.cv_params.push(parse_cv_param(e)?),
                    b"userParam" => tree.user_params.push(parse_user_param(e)?),
                    b"userText" => tree.user_texts.push(parse_user_text(e)?),
                    _ => {}
                },
                Ok(Event::Text(ref t)) => {
                    if let Some(ref mut text) = current_text {
                        let unescaped = t.unescape().map_err(xml_error)?;
                        text.text.push_str(&unescaped);
                    }
                }
                Ok(Event::CData(ref t)) => {
                    if let Some(ref mut text) = current_text {
                        text.text.push_str(&String::from_utf8_lossy(t));
                    }
                }
                Ok(Event::End(ref e)) => {
                    if e.name().as_ref() == b"userText" {
                        if let Some(text) = current_text.take() {
                            tree.user_texts.push(text);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(xml_error(e)),
            }
            buf.clear();
        }

        Ok(tree)
    }

    /// True when no group holds any entry
    pub fn is_empty(&self) -> bool {
        self.cv_params.is_empty() && self.user_params.is_empty() && self.user_texts.is_empty()
    }

    /// Find a CV param by accession
    pub fn cv_param(&self, accession: &str) -> Option<&CvParam> {
        self.cv_params.iter().find(|p| p.accession == accession)
    }

    /// Find a user param by name
    pub fn user_param(&self, name: &str) -> Option<&UserParam> {
        self.user_params.iter().find(|p| p.name == name)
    }

    /// Find a user text by name
    pub fn user_text(&self, name: &str) -> Option<&UserText> {
        self.user_texts.iter().find(|t| t.name == name)
    }

    /// Parsed value of a user param
    pub fn user_param_value<T: FromStr>(&self, name: &str) -> Option<T> {
        self.user_param(name)?.value_as()
    }

    /// Parsed value of a CV param
    pub fn cv_param_value<T: FromStr>(&self, accession: &str) -> Option<T> {
        self.cv_param(accession)?.value_as()
    }
}

fn xml_error(e: impl std::fmt::Display) -> DecodeError {
    DecodeError::InvalidXml(e.to_string())
}

fn get_attribute(e: &BytesStart, name: &str) -> Result<Option<String>, DecodeError> {
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref() == name.as_bytes() {
            let raw = std::str::from_utf8(&attr.value).map_err(xml_error)?;
            let value = unescape(raw).map_err(xml_error)?.into_owned();
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn parse_cv_param(e: &BytesStart) -> Result<CvParam, DecodeError> {
    Ok(CvParam {
        cv_ref: get_attribute(e, "cvRef")?.unwrap_or_default(),
        accession: get_attribute(e, "accession")?.unwrap_or_default(),
        name: get_attribute(e, "name")?.unwrap_or_default(),
        value: get_attribute(e, "value")?,
        unit_cv_ref: get_attribute(e, "unitCvRef")?,
        unit_accession: get_attribute(e, "unitAccession")?,
        unit_name: get_attribute(e, "unitName")?,
    })
}

fn parse_user_param(e: &BytesStart) -> Result<UserParam, DecodeError> {
    Ok(UserParam {
        cv_ref: get_attribute(e, "cvRef")?,
        accession: get_attribute(e, "accession")?,
        name: get_attribute(e, "name")?.unwrap_or_default(),
        value: get_attribute(e, "value")?,
        param_type: get_attribute(e, "type")?,
    })
}

fn parse_user_text(e: &BytesStart) -> Result<UserText, DecodeError> {
    Ok(UserText {
        cv_ref: get_attribute(e, "cvRef")?,
        accession: get_attribute(e, "accession")?,
        name: get_attribute(e, "name")?.unwrap_or_default(),
        text_type: get_attribute(e, "type")?,
        text: String::new(),
    })
}
