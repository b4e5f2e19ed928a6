//  Copyright (C) 2023 IBM Corp.
//
//  This library is free software; you can redistribute it and/or
//  modify it under the terms of the GNU Lesser General Public
//  License as published by the Free Software Foundation; either
//  version 2.1 of the License, or (at your option) any later version.
//
//  This library is distributed in the hope that it will be useful,
//  but WITHOUT ANY WARRANTY; without even the implied warranty of
//  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
//  Lesser General Public License for more details.
//
//  You should have received a copy of the GNU Lesser General Public
//  License along with this library; if not, write to the Free Software
//  Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301
//  USA

//! Schema-less decoding of template XML.
//!
//! OpenNebula sends templates as XML where a flat pair (`<CPU>1</CPU>`) and a
//! vector (`<DISK><IMAGE_ID>1</IMAGE_ID></DISK>`) can only be told apart by
//! what follows the opening tag. The decoder looks ahead up to three tokens
//! to classify each child of the container.

use tracing::{debug, warn};

use crate::config::{DecoderConfig, EofPolicy};
use crate::error::Error;
use crate::template::{Element, Template, Vector};

pub mod unmatched;
mod xml;

pub use unmatched::{UnmatchedTags, UnmatchedTagsList, UnmatchedTagsMap};
pub use xml::XmlTokens;

const DOCUMENT: &str = "#document";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start(String),
    Text(String),
    End(String),
}

/// Pull interface over an XML token stream. `Ok(None)` marks the end of the
/// stream.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Option<Token>, Error>;
}

impl TokenSource for std::vec::IntoIter<Token> {
    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        Ok(self.next())
    }
}

enum State {
    ExpectOuterStart,
    ExpectInner(String),
    Resolving(String, String),
}

impl State {
    fn open_tag(&self) -> Option<&str> {
        match self {
            State::ExpectOuterStart => None,
            State::ExpectInner(tag) | State::Resolving(tag, _) => Some(tag.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateDecoder {
    config: DecoderConfig,
}

impl TemplateDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Skips to the first start tag and decodes its children.
    pub fn decode_document<S: TokenSource>(&self, source: &mut S) -> Result<Template, Error> {
        match self.open_container(source)? {
            Some(container) => self.decode(&container, source),
            None => Ok(Template::new()),
        }
    }

    /// Decodes the children of `container`, whose start tag has already been
    /// consumed, up to and including its end tag.
    pub fn decode<S: TokenSource>(
        &self,
        container: &str,
        source: &mut S,
    ) -> Result<Template, Error> {
        let mut template = Template::new();
        let mut state = State::ExpectOuterStart;

        loop {
            let token = match source.next_token()? {
                Some(token) => token,
                None => {
                    self.truncated(state.open_tag().unwrap_or(container))?;
                    return Ok(template);
                }
            };

            state = match (state, token) {
                (State::ExpectOuterStart, Token::Start(tag)) => State::ExpectInner(tag),
                (State::ExpectOuterStart, Token::Text(_)) => State::ExpectOuterStart,
                (State::ExpectOuterStart, Token::End(name)) => {
                    expect_end(container, &name)?;
                    return Ok(template);
                }

                (State::ExpectInner(tag), Token::End(name)) => {
                    expect_end(&tag, &name)?;
                    debug!("dropping empty element <{}>", tag);
                    State::ExpectOuterStart
                }
                (State::ExpectInner(tag), Token::Start(child)) => {
                    if !self.decode_vector(&mut template, tag, child, source)? {
                        return Ok(template);
                    }
                    State::ExpectOuterStart
                }
                (State::ExpectInner(tag), Token::Text(text)) => State::Resolving(tag, text),

                (State::Resolving(tag, text), Token::End(name)) => {
                    expect_end(&tag, &name)?;
                    template.add_pair(tag, text);
                    State::ExpectOuterStart
                }
                (State::Resolving(tag, text), Token::Start(child)) => {
                    if !text.trim().is_empty() {
                        debug!("dropping stray text {:?} in vector <{}>", text, tag);
                    }
                    if !self.decode_vector(&mut template, tag, child, source)? {
                        return Ok(template);
                    }
                    State::ExpectOuterStart
                }
                (State::Resolving(tag, _), Token::Text(_)) => {
                    return Err(Error::malformed(&tag, "unexpected character data"));
                }
            };
        }
    }

    /// Reads a vector whose first child tag is `first`. The vector is added
    /// to `template` even when the stream ends early. Returns false when the
    /// stream was truncated.
    fn decode_vector<S: TokenSource>(
        &self,
        template: &mut Template,
        key: String,
        first: String,
        source: &mut S,
    ) -> Result<bool, Error> {
        let mut vector = Vector::new(key);
        let mut next = Some(first);

        let complete = loop {
            if let Some(tag) = next.take() {
                match self.read_text(&tag, source)? {
                    Some(value) => {
                        vector.add_pair(tag, value);
                    }
                    None => break false,
                }
            }

            match source.next_token()? {
                Some(Token::Start(tag)) => next = Some(tag),
                Some(Token::Text(text)) => {
                    if !text.trim().is_empty() {
                        debug!("dropping stray text {:?} in vector <{}>", text, vector.key());
                    }
                }
                Some(Token::End(name)) => {
                    expect_end(vector.key(), &name)?;
                    break true;
                }
                None => {
                    self.truncated(vector.key())?;
                    break false;
                }
            }
        };

        template.push(Element::Vector(vector));
        Ok(complete)
    }

    /// Reads the text content of `tag` up to its end tag. `None` means the
    /// stream ended first and the policy allowed it.
    pub(crate) fn read_text<S: TokenSource>(
        &self,
        tag: &str,
        source: &mut S,
    ) -> Result<Option<String>, Error> {
        let mut text = String::new();

        loop {
            match source.next_token()? {
                Some(Token::Text(t)) => text.push_str(&t),
                Some(Token::End(name)) => {
                    expect_end(tag, &name)?;
                    return Ok(Some(text));
                }
                Some(Token::Start(child)) => {
                    return Err(Error::malformed(
                        tag,
                        format!("unexpected nested element <{}>", child),
                    ));
                }
                None => {
                    self.truncated(tag)?;
                    return Ok(None);
                }
            }
        }
    }

    /// Consumes tokens up to the first start tag and returns its name.
    pub(crate) fn open_container<S: TokenSource>(
        &self,
        source: &mut S,
    ) -> Result<Option<String>, Error> {
        loop {
            match source.next_token()? {
                Some(Token::Start(name)) => return Ok(Some(name)),
                Some(Token::Text(_)) => {}
                Some(Token::End(name)) => {
                    return Err(Error::malformed(&name, "closing tag before any element"));
                }
                None => {
                    self.truncated(DOCUMENT)?;
                    return Ok(None);
                }
            }
        }
    }

    pub(crate) fn truncated(&self, tag: &str) -> Result<(), Error> {
        match self.config.eof {
            EofPolicy::Lenient => {
                warn!("template stream ended inside <{}>, keeping partial result", tag);
                Ok(())
            }
            EofPolicy::Strict => Err(Error::malformed(tag, "unexpected end of stream")),
        }
    }
}

fn expect_end(open: &str, name: &str) -> Result<(), Error> {
    if open == name {
        Ok(())
    } else {
        Err(Error::malformed(
            open,
            format!("unexpected closing tag </{}>", name),
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn start(s: &str) -> Token {
        Token::Start(s.to_string())
    }

    fn text(s: &str) -> Token {
        Token::Text(s.to_string())
    }

    fn end(s: &str) -> Token {
        Token::End(s.to_string())
    }

    fn decode_with(config: DecoderConfig, tokens: Vec<Token>) -> Result<Template, Error> {
        TemplateDecoder::new(config).decode("TEMPLATE", &mut tokens.into_iter())
    }

    fn decode(tokens: Vec<Token>) -> Result<Template, Error> {
        decode_with(DecoderConfig::default(), tokens)
    }

    #[test]
    fn flat_pair() {
        let t = decode(vec![start("CPU"), text("1"), end("CPU"), end("TEMPLATE")]).unwrap();
        assert_eq!(t.to_string(), "CPU=\"1\"");
    }

    #[test]
    fn vector() {
        let t = decode(vec![
            start("DISK"),
            start("IMAGE_ID"),
            text("119"),
            end("IMAGE_ID"),
            start("DEV_PREFIX"),
            text("vd"),
            end("DEV_PREFIX"),
            end("DISK"),
            end("TEMPLATE"),
        ])
        .unwrap();

        assert_eq!(t.len(), 1);
        assert_eq!(
            t.to_string(),
            "DISK=[\n    IMAGE_ID=\"119\",\n    DEV_PREFIX=\"vd\" ]"
        );
    }

    #[test]
    fn whitespace_before_first_child_means_vector() {
        let t = decode(vec![
            text("\n  "),
            start("NIC"),
            text("\n    "),
            start("NETWORK_ID"),
            text("3"),
            end("NETWORK_ID"),
            text("\n    "),
            start("MODEL"),
            end("MODEL"),
            text("\n  "),
            end("NIC"),
            text("\n"),
            end("TEMPLATE"),
        ])
        .unwrap();

        let nic = t.get_vector("NIC").unwrap();
        assert_eq!(nic.get_int("NETWORK_ID").unwrap(), 3);
        assert_eq!(nic.get_str("MODEL").unwrap(), "");
    }

    #[test]
    fn empty_top_level_element_is_dropped() {
        let t = decode(vec![
            start("EMPTY"),
            end("EMPTY"),
            start("NAME"),
            text("vm"),
            end("NAME"),
            end("TEMPLATE"),
        ])
        .unwrap();

        assert_eq!(t.len(), 1);
        assert_eq!(t.get_str("NAME").unwrap(), "vm");
    }

    #[test]
    fn pair_text_is_kept_verbatim() {
        let t = decode(vec![start("A"), text("  x "), end("A"), end("TEMPLATE")]).unwrap();
        assert_eq!(t.get_str("A").unwrap(), "  x ");
    }

    #[test]
    fn double_text_is_malformed() {
        let r = decode(vec![start("CPU"), text("1"), text("2"), end("CPU")]);
        assert!(matches!(r, Err(Error::MalformedTemplate { ref tag, .. }) if tag == "CPU"));
    }

    #[test]
    fn nested_vector_is_malformed() {
        let r = decode(vec![
            start("DISK"),
            start("INNER"),
            start("DEEPER"),
            text("1"),
            end("DEEPER"),
            end("INNER"),
            end("DISK"),
        ]);
        assert!(matches!(r, Err(Error::MalformedTemplate { ref tag, .. }) if tag == "INNER"));
    }

    #[test]
    fn mismatched_end_is_malformed() {
        let r = decode(vec![start("CPU"), text("1"), end("MEMORY")]);
        assert!(matches!(r, Err(Error::MalformedTemplate { ref tag, .. }) if tag == "CPU"));
    }

    #[test]
    fn truncated_lenient_keeps_partial_vector() {
        let t = decode(vec![
            start("CPU"),
            text("1"),
            end("CPU"),
            start("DISK"),
            start("IMAGE_ID"),
            text("119"),
            end("IMAGE_ID"),
            start("DEV_PREFIX"),
            text("v"),
        ])
        .unwrap();

        assert_eq!(t.get_str("CPU").unwrap(), "1");
        let disk = t.get_vector("DISK").unwrap();
        assert_eq!(disk.len(), 1);
        assert_eq!(disk.get_str("IMAGE_ID").unwrap(), "119");
    }

    #[test]
    fn truncated_lenient_drops_pending_pair() {
        let t = decode(vec![start("CPU"), text("1")]).unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn truncated_strict_fails() {
        let r = decode_with(
            DecoderConfig::strict(),
            vec![start("CPU"), text("1"), end("CPU"), start("MEMORY")],
        );
        assert!(matches!(r, Err(Error::MalformedTemplate { ref tag, .. }) if tag == "MEMORY"));

        let r = decode_with(DecoderConfig::strict(), vec![start("CPU"), text("1"), end("CPU")]);
        assert!(matches!(r, Err(Error::MalformedTemplate { ref tag, .. }) if tag == "TEMPLATE"));
    }

    #[test]
    fn decode_document_skips_to_container() {
        let tokens = vec![
            text("\n"),
            start("TEMPLATE"),
            start("CPU"),
            text("2"),
            end("CPU"),
            end("TEMPLATE"),
        ];
        let t = TemplateDecoder::default()
            .decode_document(&mut tokens.into_iter())
            .unwrap();
        assert_eq!(t.get_int("CPU").unwrap(), 2);
    }

    #[test]
    fn empty_document() {
        let t = TemplateDecoder::default()
            .decode_document(&mut Vec::<Token>::new().into_iter())
            .unwrap();
        assert!(t.is_empty());

        let r = TemplateDecoder::new(DecoderConfig::strict())
            .decode_document(&mut Vec::<Token>::new().into_iter());
        assert!(r.is_err());
    }
}
