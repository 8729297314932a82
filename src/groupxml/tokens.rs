//! Token sources feeding the engine.
//!
//! The engine only needs a forward-only cursor over start/end/text events.
//! [`XmlTokenSource`] provides one on top of quick-xml; any `Vec<Token>` can
//! stand in for it when the events come from somewhere else.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Decoder, Reader};

use super::attributes::Attributes;
use super::error::ParseError;

/// Default size of the input buffer when opening files (64KB)
pub const DEFAULT_INPUT_BUFFER_SIZE: usize = 64 * 1024;

/// A single XML event
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Start of an element with its attributes
    Start {
        /// Element name
        name: String,
        /// Element attributes, unescaped
        attributes: Attributes,
    },
    /// End of an element
    End {
        /// Element name
        name: String,
    },
    /// Non-empty, trimmed character data
    Text(String),
    /// End of the document; repeated on every later call
    DocumentEnd,
}

impl Token {
    /// Start token with the given attributes
    pub fn start<'a, I>(name: &str, attributes: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Token::Start {
            name: name.to_string(),
            attributes: attributes.into_iter().collect(),
        }
    }

    /// End token
    pub fn end(name: &str) -> Self {
        Token::End {
            name: name.to_string(),
        }
    }
}

/// Forward-only cursor over XML events
pub trait TokenSource {
    /// Read the next event
    fn next_token(&mut self) -> Result<Token, ParseError>;
}

impl<T: TokenSource + ?Sized> TokenSource for &mut T {
    fn next_token(&mut self) -> Result<Token, ParseError> {
        (**self).next_token()
    }
}

impl TokenSource for std::vec::IntoIter<Token> {
    fn next_token(&mut self) -> Result<Token, ParseError> {
        Ok(self.next().unwrap_or(Token::DocumentEnd))
    }
}

/// Token source backed by quick-xml
///
/// Empty elements are expanded into a start and an end token. DOCTYPE
/// declarations, comments and processing instructions are skipped; external
/// entities are never resolved. Names and values are decoded with the
/// encoding the document declares.
///
/// End tags are passed through unchecked; the engine validates nesting so
/// that it can report it as a malformed document.
pub struct XmlTokenSource<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    finished: bool,
}

impl<R: BufRead> XmlTokenSource<R> {
    /// Create a token source from a BufRead source
    pub fn new(reader: R) -> Self {
        let mut xml_reader = Reader::from_reader(reader);
        let config = xml_reader.config_mut();
        config.trim_text(true);
        config.expand_empty_elements = true;
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        Self {
            reader: xml_reader,
            buf: Vec::new(),
            finished: false,
        }
    }

    /// Byte position of the reader in the input
    pub fn position(&self) -> u64 {
        self.reader.buffer_position()
    }
}

impl XmlTokenSource<BufReader<File>> {
    /// Open a Group-XML file with the default buffer size
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        Self::open_with_buffer_size(path, DEFAULT_INPUT_BUFFER_SIZE)
    }

    /// Open a Group-XML file with a custom buffer size
    pub fn open_with_buffer_size<P: AsRef<Path>>(
        path: P,
        buffer_size: usize,
    ) -> Result<Self, ParseError> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::with_capacity(buffer_size, file)))
    }
}

impl<R: BufRead> TokenSource for XmlTokenSource<R> {
    fn next_token(&mut self) -> Result<Token, ParseError> {
        if self.finished {
            return Ok(Token::DocumentEnd);
        }

        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf)?;
            let decoder = self.reader.decoder();
            let token = match event {
                Event::Start(ref e) => Token::Start {
                    name: decoder.decode(e.name().as_ref())?.into_owned(),
                    attributes: read_attributes(e, decoder)?,
                },
                Event::End(ref e) => Token::End {
                    name: decoder.decode(e.name().as_ref())?.into_owned(),
                },
                Event::Text(ref t) => {
                    let text = t.unescape()?;
                    if text.is_empty() {
                        continue;
                    }
                    Token::Text(text.into_owned())
                }
                Event::CData(ref c) => Token::Text(c.decode()?.into_owned()),
                Event::Eof => {
                    self.finished = true;
                    Token::DocumentEnd
                }
                _ => continue,
            };
            return Ok(token);
        }
    }
}

fn read_attributes(e: &BytesStart, decoder: Decoder) -> Result<Attributes, ParseError> {
    let mut attributes = Attributes::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| ParseError::XmlError(quick_xml::Error::from(e)))?;
        let name = decoder.decode(attr.key.as_ref())?;
        let raw = decoder.decode(&attr.value)?;
        let value = quick_xml::escape::unescape(&raw)
            .map_err(|e| ParseError::InvalidAttributeValue(format!("{}: {}", name, e)))?;
        attributes.insert(name.into_owned(), value.into_owned());
    }
    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn bare(name: &str) -> Token {
        Token::Start {
            name: name.to_string(),
            attributes: Attributes::new(),
        }
    }

    fn collect(xml: &str) -> Result<Vec<Token>, ParseError> {
        let mut source = XmlTokenSource::new(Cursor::new(xml.as_bytes()));
        let mut tokens = Vec::new();
        loop {
            let token = source.next_token()?;
            let done = token == Token::DocumentEnd;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    #[test]
    fn test_expands_empty_elements() {
        let tokens = collect(r#"<SPECTRUM id="s1"><MATCH id="m&amp;1"/></SPECTRUM>"#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::start("SPECTRUM", [("id", "s1")]),
                Token::start("MATCH", [("id", "m&1")]),
                Token::end("MATCH"),
                Token::end("SPECTRUM"),
                Token::DocumentEnd,
            ]
        );
    }

    #[test]
    fn test_skips_declarations_and_comments() {
        let xml = r#"<?xml version="1.0"?>
<!DOCTYPE RESULTS SYSTEM "http://example.invalid/group.dtd">
<!-- exported -->
<RESULTS>
  <ITRAQPEAKS> 113.1 1200 </ITRAQPEAKS>
</RESULTS>"#;
        let tokens = collect(xml).unwrap();
        assert_eq!(
            tokens,
            vec![
                bare("RESULTS"),
                bare("ITRAQPEAKS"),
                Token::Text("113.1 1200".to_string()),
                Token::end("ITRAQPEAKS"),
                Token::end("RESULTS"),
                Token::DocumentEnd,
            ]
        );
    }

    #[test]
    fn test_document_end_repeats() {
        let mut source = XmlTokenSource::new(Cursor::new("<A/>".as_bytes()));
        while source.next_token().unwrap() != Token::DocumentEnd {}
        assert_eq!(source.next_token().unwrap(), Token::DocumentEnd);
    }

    #[test]
    fn test_end_tags_are_passed_through() {
        let tokens = collect("<A><B></A></C>").unwrap();
        assert_eq!(
            tokens,
            vec![
                bare("A"),
                bare("B"),
                Token::end("A"),
                Token::end("C"),
                Token::DocumentEnd,
            ]
        );
    }

    #[test]
    fn test_decodes_declared_encoding() {
        let mut xml = br#"<?xml version="1.0" encoding="ISO-8859-1"?><PROTEIN name="caf"#.to_vec();
        xml.extend_from_slice(b"\xe9\"><![CDATA[MKV\xe9]]></PROTEIN>");

        let mut source = XmlTokenSource::new(Cursor::new(xml));
        assert_eq!(source.next_token().unwrap(), Token::start("PROTEIN", [("name", "caf\u{e9}")]));
        assert_eq!(source.next_token().unwrap(), Token::Text("MKV\u{e9}".to_string()));
        assert_eq!(source.next_token().unwrap(), Token::end("PROTEIN"));
    }

    #[test]
    fn test_vec_source() {
        let mut source = vec![Token::end("MATCH")].into_iter();
        assert_eq!(source.next_token().unwrap(), Token::end("MATCH"));
        assert_eq!(source.next_token().unwrap(), Token::DocumentEnd);
    }
}
