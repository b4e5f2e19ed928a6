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

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;

use crate::decoder::{Token, TokenSource};
use crate::error::Error;

/// Token source over an XML document, backed by quick-xml.
///
/// Empty elements come out as a start/end pair, CDATA sections as text, and
/// adjacent runs of text and CDATA are merged into one token. Comments,
/// declarations, processing instructions and doctypes are skipped.
///
/// Input cut off inside a tag reads as end of stream, so the decoder's
/// [`EofPolicy`](crate::config::EofPolicy) decides what happens to it.
pub struct XmlTokens<'a> {
    reader: Reader<&'a [u8]>,
    input: &'a [u8],
    pending: Option<Token>,
    done: bool,
}

impl<'a> XmlTokens<'a> {
    pub fn from_str(xml: &'a str) -> Self {
        let mut reader = Reader::from_str(xml);
        reader.expand_empty_elements(true);

        Self {
            reader,
            input: xml.as_bytes(),
            pending: None,
            done: false,
        }
    }

    fn next_raw(&mut self) -> Result<Option<Token>, Error> {
        if self.done {
            return Ok(None);
        }

        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(e) if self.cut_off(&e) => {
                    debug!("xml input ends inside a tag: {}", e);
                    self.done = true;
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };

            let token = match event {
                Event::Start(e) => Token::Start(name(e.local_name().as_ref())?),
                Event::End(e) => Token::End(name(e.local_name().as_ref())?),
                Event::Text(e) => Token::Text(e.unescape()?.into_owned()),
                Event::CData(e) => Token::Text(String::from_utf8(e.into_inner().into_owned())?),
                Event::Eof => {
                    self.done = true;
                    return Ok(None);
                }
                _ => continue,
            };
            return Ok(Some(token));
        }
    }

    // A closing tag cut off before its '>' shows up as a name mismatch at
    // the end of the input.
    fn cut_off(&self, e: &quick_xml::Error) -> bool {
        match e {
            quick_xml::Error::UnexpectedEof(_) => true,
            quick_xml::Error::EndEventMismatch { .. } => {
                self.reader.buffer_position() >= self.input.len()
                    && self.input.last() != Some(&b'>')
            }
            _ => false,
        }
    }
}

impl TokenSource for XmlTokens<'_> {
    fn next_token(&mut self) -> Result<Option<Token>, Error> {
        let token = match self.pending.take() {
            Some(t) => Some(t),
            None => self.next_raw()?,
        };

        let mut text = match token {
            Some(Token::Text(t)) => t,
            other => return Ok(other),
        };

        loop {
            match self.next_raw()? {
                Some(Token::Text(more)) => text.push_str(&more),
                other => {
                    self.pending = other;
                    break;
                }
            }
        }

        Ok(Some(Token::Text(text)))
    }
}

fn name(raw: &[u8]) -> Result<String, Error> {
    Ok(std::str::from_utf8(raw)?.to_string())
}
