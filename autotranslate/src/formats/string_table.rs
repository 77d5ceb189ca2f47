//! Support for the flat XML string table format.
//!
//! ```xml
//! <base xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" type="string">
//!   <tags>
//!     <tag language="English" />
//!   </tags>
//!   <strings>
//!     <string id="str_hello" text="Hello {PLAYER.NAME}" />
//!   </strings>
//! </base>
//! ```
//!
//! Parsing is lenient about missing sections so callers can tell a target
//! without a `strings` section apart from a broken one; converting into a
//! [`StringTable`] is where the required sections are enforced.

use indexmap::IndexMap;
use quick_xml::{
    Reader, Writer,
    escape::escape,
    events::{BytesDecl, BytesEnd, BytesStart, Event},
};
use serde::Serialize;
use std::io::{BufRead, Write};

use crate::{
    error::Error,
    traits::Parser,
    types::{DEFAULT_ROOT, Metadata, StringRecord, StringTable},
};

const TAGS: &[u8] = b"tags";
const TAG: &[u8] = b"tag";
const STRINGS: &[u8] = b"strings";
const STRING: &[u8] = b"string";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Format {
    /// Root element name as written in the document (prefix included).
    pub root: String,
    pub root_attributes: IndexMap<String, String>,
    /// `None` when `<tags>` or its `<tag>` child is absent.
    pub tag: Option<Tag>,
    /// `None` when there is no `<strings>` section at all.
    pub strings: Option<Vec<StringRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub language: Option<String>,
    pub attributes: IndexMap<String, String>,
}

impl Parser for Format {
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut open: Vec<Vec<u8>> = Vec::new();
        let mut doc = Document::default();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    doc.visit(e, &open)?;
                    open.push(e.local_name().as_ref().to_vec());
                }
                Ok(Event::Empty(ref e)) => doc.visit(e, &open)?,
                Ok(Event::End(_)) => {
                    open.pop();
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::XmlParse(e)),
            }
            buf.clear();
        }

        if !open.is_empty() {
            return Err(Error::format_error("unexpected end of document"));
        }
        doc.finish()
    }

    fn to_writer<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        let mut xml_writer = Writer::new_with_indent(&mut writer, b' ', 2);

        xml_writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut root = BytesStart::new(self.root.as_str());
        for (key, value) in &self.root_attributes {
            push_escaped(&mut root, key, value);
        }
        xml_writer.write_event(Event::Start(root))?;

        if let Some(tag) = &self.tag {
            xml_writer.write_event(Event::Start(BytesStart::new("tags")))?;
            let mut elem = BytesStart::new("tag");
            if let Some(language) = &tag.language {
                push_escaped(&mut elem, "language", language);
            }
            for (key, value) in &tag.attributes {
                push_escaped(&mut elem, key, value);
            }
            xml_writer.write_event(Event::Empty(elem))?;
            xml_writer.write_event(Event::End(BytesEnd::new("tags")))?;
        }

        match &self.strings {
            Some(strings) if strings.is_empty() => {
                xml_writer.write_event(Event::Empty(BytesStart::new("strings")))?;
            }
            Some(strings) => {
                xml_writer.write_event(Event::Start(BytesStart::new("strings")))?;
                for record in strings {
                    xml_writer.write_event(Event::Empty(string_element(record)))?;
                }
                xml_writer.write_event(Event::End(BytesEnd::new("strings")))?;
            }
            None => {}
        }

        xml_writer.write_event(Event::End(BytesEnd::new(self.root.as_str())))?;
        xml_writer.get_mut().write_all(b"\n")?;
        Ok(())
    }
}

impl Format {
    pub fn has_strings(&self) -> bool {
        self.strings.is_some()
    }

    /// Converts into a table without requiring the `tags` section.
    ///
    /// Returns `Ok(None)` when the document has no `strings` section, which
    /// is how an unrecognizable merge target is detected.
    pub fn into_partial_table(self) -> Result<Option<StringTable>, Error> {
        let Some(records) = self.strings else {
            return Ok(None);
        };
        let (language, tag_attributes) = match self.tag {
            Some(tag) => (tag.language.unwrap_or_default(), tag.attributes),
            None => (String::new(), IndexMap::new()),
        };
        let table = StringTable {
            metadata: Metadata {
                language,
                root: self.root,
                root_attributes: self.root_attributes,
                tag_attributes,
            },
            records,
        };
        table.validate()?;
        Ok(Some(table))
    }
}

impl TryFrom<Format> for StringTable {
    type Error = Error;

    fn try_from(value: Format) -> Result<Self, Self::Error> {
        if value.tag.is_none() {
            return Err(Error::format_error("missing <tags>/<tag> section"));
        }
        value
            .into_partial_table()?
            .ok_or_else(|| Error::format_error("missing <strings> section"))
    }
}

impl From<StringTable> for Format {
    fn from(value: StringTable) -> Self {
        let Metadata {
            language,
            root,
            root_attributes,
            tag_attributes,
        } = value.metadata;
        Format {
            root: if root.is_empty() {
                DEFAULT_ROOT.to_string()
            } else {
                root
            },
            root_attributes,
            tag: Some(Tag {
                language: Some(language),
                attributes: tag_attributes,
            }),
            strings: Some(value.records),
        }
    }
}

fn string_element(record: &StringRecord) -> BytesStart<'static> {
    let mut elem = BytesStart::new("string");
    push_escaped(&mut elem, "id", &record.id);
    push_escaped(&mut elem, "text", &record.text);
    if let Some(original) = &record.original {
        push_escaped(&mut elem, "original", original);
    }
    for (key, value) in &record.extra {
        push_escaped(&mut elem, key, value);
    }
    elem
}

/// Attribute-value escaping that also keeps line breaks and tabs, which a
/// conforming reader would otherwise normalize to spaces.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

fn push_escaped(elem: &mut BytesStart, key: &str, value: &str) {
    let value = escape_attribute(value);
    // Raw byte pairs are pushed as is, without a second escaping pass.
    elem.push_attribute((key.as_bytes(), value.as_bytes()));
}

/// Accumulates the interesting parts of a document while it is streamed.
#[derive(Default)]
struct Document {
    root: Option<(String, IndexMap<String, String>)>,
    tags_seen: bool,
    tag: Option<Tag>,
    strings: Option<Vec<StringRecord>>,
}

impl Document {
    /// Handles an opening (or self-closing) element whose ancestors are `open`.
    fn visit(&mut self, e: &BytesStart, open: &[Vec<u8>]) -> Result<(), Error> {
        let name = e.local_name();
        match open {
            [] => {
                if self.root.is_some() {
                    return Err(Error::format_error("multiple root elements"));
                }
                let root = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                self.root = Some((root, read_attributes(e)?));
            }
            [_] if name.as_ref() == TAGS => self.tags_seen = true,
            [_] if name.as_ref() == STRINGS => {
                self.strings.get_or_insert_with(Vec::new);
            }
            [_, parent] if parent.as_slice() == TAGS && name.as_ref() == TAG => {
                if self.tag.is_none() {
                    let mut attributes = read_attributes(e)?;
                    let language = attributes.shift_remove("language");
                    self.tag = Some(Tag {
                        language,
                        attributes,
                    });
                }
            }
            [_, parent] if parent.as_slice() == STRINGS && name.as_ref() == STRING => {
                let record = parse_string_record(e)?;
                self.strings.get_or_insert_with(Vec::new).push(record);
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(self) -> Result<Format, Error> {
        let (root, root_attributes) = self
            .root
            .ok_or_else(|| Error::format_error("document has no root element"))?;
        Ok(Format {
            root,
            root_attributes,
            tag: if self.tags_seen { self.tag } else { None },
            strings: self.strings,
        })
    }
}

fn read_attributes(e: &BytesStart) -> Result<IndexMap<String, String>, Error> {
    let mut attributes = IndexMap::new();
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::format_error(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        attributes.insert(key, value);
    }
    Ok(attributes)
}

fn parse_string_record(e: &BytesStart) -> Result<StringRecord, Error> {
    let mut extra = read_attributes(e)?;
    let id = extra
        .shift_remove("id")
        .ok_or_else(|| Error::format_error("string element missing 'id'"))?;
    let text = extra.shift_remove("text").unwrap_or_default();
    let original = extra.shift_remove("original");
    Ok(StringRecord {
        id,
        text,
        original,
        extra,
    })
}
