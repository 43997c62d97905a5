//! Response decoding for `rooms/list` and `rooms/history`
//!
//! Both wire formats feed the same incremental record reader. JSON bodies are
//! split into raw element slices up front and each element is deserialized on
//! demand; XML bodies are streamed with quick_xml and each record element is
//! collected into a flat field map (`from.name`, `file.url`, ...).

use std::collections::HashMap;
use std::io::Cursor;
use std::marker::PhantomData;
use std::str::FromStr;

use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::reader::Reader;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;

use crate::error::{Error, Result};
use crate::models::{de, FileAttachment, Format, Message, Room, Sender};

/// Child element text of one XML record, keyed by dotted path.
pub(crate) type Fields = HashMap<String, String>;

/// A record type that can be read from either wire format.
pub(crate) trait Record: DeserializeOwned {
    /// Envelope key (JSON) or root element (XML).
    const COLLECTION: &'static str;
    /// Element name of one record in XML.
    const ELEMENT: &'static str;
    /// Human description used in decode errors.
    const SHAPE: &'static str;

    fn from_fields(fields: &Fields) -> Option<Self>;
}

fn text(fields: &Fields, key: &str) -> Option<String> {
    fields.get(key).cloned()
}

/// Blank text counts as absent, matching `de::non_empty_string`.
fn non_empty(fields: &Fields, key: &str) -> Option<String> {
    fields.get(key).filter(|v| !v.trim().is_empty()).cloned()
}

/// Absent or blank means the default; anything else must parse.
fn number<N: FromStr + Default>(fields: &Fields, key: &str) -> Option<N> {
    match fields.get(key).map(|v| v.trim()) {
        None | Some("") => Some(N::default()),
        Some(v) => v.parse().ok(),
    }
}

fn flag(fields: &Fields, key: &str) -> Option<bool> {
    fields.get(key).map_or(Some(false), |v| de::parse_flag(v))
}

impl Record for Room {
    const COLLECTION: &'static str = "rooms";
    const ELEMENT: &'static str = "room";
    const SHAPE: &'static str = "room with room_id and name";

    fn from_fields(fields: &Fields) -> Option<Self> {
        Some(Room {
            room_id: fields.get("room_id")?.trim().parse().ok()?,
            name: text(fields, "name")?,
            topic: text(fields, "topic").unwrap_or_default(),
            last_active: number(fields, "last_active")?,
            created: number(fields, "created")?,
            owner_user_id: number(fields, "owner_user_id")?,
            is_archived: flag(fields, "is_archived")?,
            is_private: flag(fields, "is_private")?,
            xmpp_jid: non_empty(fields, "xmpp_jid"),
            guest_access_url: non_empty(fields, "guest_access_url"),
        })
    }
}

impl Record for Message {
    const COLLECTION: &'static str = "messages";
    const ELEMENT: &'static str = "message";
    const SHAPE: &'static str = "message with date, from and message";

    fn from_fields(fields: &Fields) -> Option<Self> {
        let file = if fields.contains_key("file.name") || fields.contains_key("file.url") {
            Some(FileAttachment {
                name: text(fields, "file.name")?,
                size: number(fields, "file.size")?,
                url: text(fields, "file.url")?,
            })
        } else {
            None
        };

        Some(Message {
            date: de::parse_timestamp(fields.get("date")?)?,
            from: Sender {
                name: text(fields, "from.name")?,
                user_id: text(fields, "from.user_id")?,
            },
            message: text(fields, "message").unwrap_or_default(),
            file,
        })
    }
}

/// Incremental reader over the records of one response body.
///
/// Stops after the first error.
pub(crate) struct Records<T> {
    source: Source,
    _record: PhantomData<T>,
}

enum Source {
    Json(std::vec::IntoIter<Box<RawValue>>),
    Xml(XmlRecords),
    Done,
}

impl<T: Record> Records<T> {
    pub(crate) fn new(body: String, format: Format) -> Result<Self> {
        let source = match format {
            Format::Json => Source::Json(json_elements(&body, T::COLLECTION, T::SHAPE)?.into_iter()),
            Format::Xml => Source::Xml(XmlRecords::new(body, T::COLLECTION, T::ELEMENT, T::SHAPE)),
        };
        Ok(Self {
            source,
            _record: PhantomData,
        })
    }
}

impl<T: Record> Iterator for Records<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let item = match &mut self.source {
            Source::Json(elements) => elements.next().map(|raw| {
                serde_json::from_str::<T>(raw.get()).map_err(|_| Error::decode(raw.get(), T::SHAPE))
            }),
            Source::Xml(reader) => reader.next_record().transpose().map(|record| {
                record.and_then(|(fields, fragment)| {
                    T::from_fields(&fields).ok_or_else(|| Error::decode(&fragment, T::SHAPE))
                })
            }),
            Source::Done => None,
        };

        if !matches!(item, Some(Ok(_))) {
            self.source = Source::Done;
        }
        item
    }
}

/// Split `{"<collection>": [ ... ]}` into raw element slices.
fn json_elements(body: &str, collection: &str, shape: &'static str) -> Result<Vec<Box<RawValue>>> {
    let envelope: HashMap<String, Box<RawValue>> =
        serde_json::from_str(body).map_err(|_| Error::decode(body, shape))?;
    let list = envelope
        .get(collection)
        .ok_or_else(|| Error::decode(body, shape))?;
    serde_json::from_str(list.get()).map_err(|_| Error::decode(list.get(), shape))
}

/// An element open inside the current record.
struct Open {
    name: String,
    text: String,
    nested: bool,
}

/// Dotted field key for `name` under the open elements.
fn field_key(open: &[Open], name: &str) -> String {
    let mut key = String::new();
    for el in open {
        key.push_str(&el.name);
        key.push('.');
    }
    key.push_str(name);
    key
}

struct XmlRecords {
    reader: Reader<Cursor<Vec<u8>>>,
    buf: Vec<u8>,
    collection: &'static str,
    element: &'static str,
    shape: &'static str,
    root_seen: bool,
}

/// Trimmed source text between two byte offsets of the body.
fn source_slice(reader: &Reader<Cursor<Vec<u8>>>, start: usize, end: usize) -> String {
    let bytes = reader.get_ref().get_ref();
    let end = end.min(bytes.len());
    let start = start.min(end);
    String::from_utf8_lossy(&bytes[start..end]).trim().to_string()
}

impl XmlRecords {
    fn new(
        body: String,
        collection: &'static str,
        element: &'static str,
        shape: &'static str,
    ) -> Self {
        let reader = Reader::from_reader(Cursor::new(body.into_bytes()));
        Self {
            reader,
            buf: Vec::new(),
            collection,
            element,
            shape,
            root_seen: false,
        }
    }

    /// Next record's fields and its source text, or `None` at end of document.
    ///
    /// Leaf text is kept exactly as sent. Text of elements that have child
    /// elements (indentation between children) is dropped.
    fn next_record(&mut self) -> Result<Option<(Fields, String)>> {
        let mut fields = Fields::new();
        let mut open: Vec<Open> = Vec::new();
        let mut start: Option<usize> = None;

        loop {
            let before = self.reader.buffer_position() as usize;
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    let at = source_slice(&self.reader, before, before + 80);
                    return Err(Error::decode(&format!("{} near {:?}", e, at), self.shape));
                }
            };

            match event {
                Event::Eof => {
                    if let Some(start) = start {
                        return Err(Error::decode(
                            &source_slice(&self.reader, start, usize::MAX),
                            self.shape,
                        ));
                    }
                    if !self.root_seen {
                        return Err(Error::decode(
                            &source_slice(&self.reader, 0, usize::MAX),
                            self.shape,
                        ));
                    }
                    return Ok(None);
                }
                Event::Start(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if start.is_some() {
                        if let Some(parent) = open.last_mut() {
                            parent.nested = true;
                        }
                        open.push(Open {
                            name,
                            text: String::new(),
                            nested: false,
                        });
                    } else if !self.root_seen {
                        if name != self.collection {
                            return Err(Error::decode(
                                &source_slice(&self.reader, before, before + 80),
                                self.shape,
                            ));
                        }
                        self.root_seen = true;
                    } else if name == self.element {
                        start = Some(before);
                    } else {
                        // Unrelated element beside the records; skip its subtree.
                        let end = e.name().as_ref().to_vec();
                        let mut skip = Vec::new();
                        if let Err(err) = self.reader.read_to_end_into(QName(&end), &mut skip) {
                            return Err(Error::decode(&err.to_string(), self.shape));
                        }
                    }
                }
                Event::Empty(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if start.is_some() {
                        if let Some(parent) = open.last_mut() {
                            parent.nested = true;
                        }
                        fields.insert(field_key(&open, &name), String::new());
                    } else if !self.root_seen {
                        if name != self.collection {
                            return Err(Error::decode(
                                &source_slice(&self.reader, before, before + 80),
                                self.shape,
                            ));
                        }
                        self.root_seen = true;
                    } else if name == self.element {
                        let end = self.reader.buffer_position() as usize;
                        return Ok(Some((Fields::new(), source_slice(&self.reader, before, end))));
                    }
                }
                Event::Text(t) => {
                    if let Some(el) = open.last_mut() {
                        match t.unescape() {
                            Ok(value) => el.text.push_str(&value),
                            Err(err) => return Err(Error::decode(&err.to_string(), self.shape)),
                        }
                    }
                }
                Event::CData(c) => {
                    if let Some(el) = open.last_mut() {
                        el.text.push_str(&String::from_utf8_lossy(&c));
                    }
                }
                Event::End(_) => {
                    if let Some(record_start) = start {
                        match open.pop() {
                            Some(el) => {
                                if !el.nested {
                                    fields.insert(field_key(&open, &el.name), el.text);
                                }
                            }
                            None => {
                                let end = self.reader.buffer_position() as usize;
                                let fragment = source_slice(&self.reader, record_start, end);
                                return Ok(Some((fields, fragment)));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

/// Decode a `rooms/list` body, in source order.
pub fn decode_rooms(body: &str, format: Format) -> Result<Vec<Room>> {
    Records::<Room>::new(body.to_string(), format)?.collect()
}

/// Decode a `rooms/history` body, in source order.
pub fn decode_messages(body: &str, format: Format) -> Result<Vec<Message>> {
    Records::<Message>::new(body.to_string(), format)?.collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const ROOMS_JSON: &str = r#"{
        "rooms": [
            {"room_id": 7, "name": "Development", "topic": "Make sure to document your API functions",
             "last_active": 1269020400, "created": 1269010311, "owner_user_id": 1,
             "is_archived": false, "is_private": false,
             "xmpp_jid": "7_development@conf.hipchat.com"},
            {"room_id": 10, "name": "Ops", "topic": "Chef is so awesome.",
             "last_active": 1269010500, "created": 1269010211, "owner_user_id": 5,
             "is_archived": false, "is_private": true,
             "xmpp_jid": "10_ops@conf.hipchat.com"}
        ]
    }"#;

    pub const ROOMS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rooms>
  <room>
    <room_id>7</room_id>
    <name>Development</name>
    <topic>Make sure to document your API functions</topic>
    <last_active>1269020400</last_active>
    <created>1269010311</created>
    <owner_user_id>1</owner_user_id>
    <is_archived>0</is_archived>
    <is_private>0</is_private>
    <xmpp_jid>7_development@conf.hipchat.com</xmpp_jid>
  </room>
  <room>
    <room_id>10</room_id>
    <name>Ops</name>
    <topic>Chef is so awesome.</topic>
    <last_active>1269010500</last_active>
    <created>1269010211</created>
    <owner_user_id>5</owner_user_id>
    <is_archived>0</is_archived>
    <is_private>1</is_private>
    <xmpp_jid>10_ops@conf.hipchat.com</xmpp_jid>
  </room>
</rooms>"#;

    pub const HISTORY_JSON: &str = r#"{
        "messages": [
            {"date": "2010-11-19T15:48:19-0800",
             "from": {"name": "Garret Heaton", "user_id": 10},
             "message": "Good news everyone!"},
            {"date": "2010-11-19T16:02:30-0800",
             "from": {"name": "deploy-bot", "user_id": "api"},
             "message": "Deployed &amp; verified",
             "file": {"name": "build.log", "size": 2048, "url": "http://uploads.hipchat.com/f/build.log"}}
        ]
    }"#;

    pub const HISTORY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<messages>
  <message>
    <date>2010-11-19T15:48:19-0800</date>
    <from>
      <name>Garret Heaton</name>
      <user_id>10</user_id>
    </from>
    <message>Good news everyone!</message>
  </message>
  <message>
    <date>2010-11-19T16:02:30-0800</date>
    <from>
      <name>deploy-bot</name>
      <user_id>api</user_id>
    </from>
    <message><![CDATA[Deployed &amp; verified]]></message>
    <file>
      <name>build.log</name>
      <size>2048</size>
      <url>http://uploads.hipchat.com/f/build.log</url>
    </file>
  </message>
</messages>"#;
}
