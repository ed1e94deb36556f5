//! Front-matter parsing

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;

use super::error::{ContentError, Result};
use super::post::PostStatus;

/// Marker line opening and closing the front-matter block
pub const DELIMITER: &str = "---";

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> std::result::Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Front-matter data from a post or page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    #[serde(rename = "featuredImage")]
    pub featured_image: Option<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub category: Vec<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub categories: Vec<String>,
    pub author: Option<String>,
    pub status: Option<PostStatus>,
    pub draft: bool,
    #[serde(rename = "seoTitle")]
    pub seo_title: Option<String>,
    #[serde(rename = "seoDescription")]
    pub seo_description: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let (mapping, body) = extract(content)?;
        if mapping.is_empty() {
            return Ok((FrontMatter::default(), body));
        }
        let fm = serde_yaml::from_value(Value::Mapping(mapping))?;
        Ok((fm, body))
    }

    /// `category` and `categories` merged, in declaration order, without repeats
    pub fn all_categories(&self) -> Vec<String> {
        let mut merged: Vec<String> = Vec::new();
        for name in self.category.iter().chain(&self.categories) {
            let name = name.trim();
            if !name.is_empty() && !merged.iter().any(|c| c == name) {
                merged.push(name.to_string());
            }
        }
        merged
    }

    /// Effective publication status; `status` wins over the `draft` flag
    pub fn status(&self) -> PostStatus {
        match self.status {
            Some(status) => status,
            None if self.draft => PostStatus::Draft,
            None => PostStatus::Published,
        }
    }

    /// Parse the date string into a calendar date
    pub fn parse_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// Split a document into its raw front-matter block and body.
///
/// Returns `None` when the document does not open with a delimiter line or
/// the block is never closed.
pub fn split(content: &str) -> Option<(&str, &str)> {
    let first_end = content.find('\n')?;
    if content[..first_end].trim_end() != DELIMITER {
        return None;
    }

    let block_start = first_end + 1;
    let mut offset = block_start;
    for line in content[block_start..].split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let block = &content[block_start..offset];
            let body = content[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Some((block, body));
        }
        offset += line.len();
    }

    None
}

/// Extract the front-matter mapping and the body.
///
/// A document without a front-matter block yields an empty mapping and the
/// whole document as body. A block that is not a YAML mapping is an error.
pub fn extract(content: &str) -> Result<(Mapping, &str)> {
    let Some((block, body)) = split(content) else {
        return Ok((Mapping::new(), content));
    };

    if block.trim().is_empty() {
        return Ok((Mapping::new(), body));
    }

    match serde_yaml::from_str::<Value>(block)? {
        Value::Mapping(mapping) => Ok((mapping, body)),
        Value::Null => Ok((Mapping::new(), body)),
        other => Err(ContentError::FrontMatter(format!(
            "expected key/value pairs, found {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Parse a date string in various formats, keeping the calendar date
pub fn parse_date_string(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 keeps the author's local calendar date
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
