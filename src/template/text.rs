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

//! Reads the native template text back into a `Template`.
//!
//! Accepts everything the renderer writes plus the looser forms people type
//! by hand: free whitespace, `#` comment lines and unquoted values.

use std::str::FromStr;

use crate::error::Error;
use crate::template::{key_char, Element, Template, Vector};

const TOP: &str = "#template";

impl FromStr for Template {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextParser { src: s, pos: 0 }.parse()
    }
}

struct TextParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> TextParser<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_inline_ws(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }
    }

    fn skip_blank(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('#') => {
                    while !matches!(self.bump(), Some('\n') | None) {}
                }
                _ => return,
            }
        }
    }

    fn key(&mut self, context: &str) -> Result<String, Error> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !key_char(c) {
                break;
            }
            self.bump();
        }

        if self.pos == start {
            return Err(self.unexpected(context));
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn expect(&mut self, want: char, context: &str) -> Result<(), Error> {
        self.skip_inline_ws();
        match self.peek() {
            Some(c) if c == want => {
                self.bump();
                self.skip_inline_ws();
                Ok(())
            }
            _ => Err(self.unexpected(context)),
        }
    }

    fn unexpected(&self, context: &str) -> Error {
        let reason = match self.peek() {
            Some(c) => format!("unexpected {:?} at byte {}", c, self.pos),
            None => String::from("unexpected end of input"),
        };
        Error::malformed(context, reason)
    }

    fn quoted(&mut self, key: &str) -> Result<String, Error> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(Error::malformed(key, "unterminated quoted value")),
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('\\') => out.push('\\'),
                    Some('"') => out.push('"'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => return Err(Error::malformed(key, "unterminated quoted value")),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn bare(&mut self, in_vector: bool) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' || (in_vector && matches!(c, ',' | ']')) {
                break;
            }
            self.bump();
        }
        self.src[start..self.pos].trim_end().to_string()
    }

    fn value(&mut self, key: &str, in_vector: bool) -> Result<String, Error> {
        if self.peek() == Some('"') {
            self.bump();
            self.quoted(key)
        } else {
            Ok(self.bare(in_vector))
        }
    }

    fn vector(&mut self, key: String) -> Result<Vector, Error> {
        let mut vector = Vector::new(key);

        loop {
            self.skip_blank();
            if self.peek() == Some(']') {
                self.bump();
                return Ok(vector);
            }

            let pair_key = self.key(vector.key())?;
            self.expect('=', &pair_key)?;
            let value = self.value(&pair_key, true)?;
            vector.add_pair(pair_key, value);

            self.skip_blank();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {
                    self.bump();
                    return Ok(vector);
                }
                _ => return Err(self.unexpected(vector.key())),
            }
        }
    }

    fn parse(mut self) -> Result<Template, Error> {
        let mut template = Template::new();

        loop {
            self.skip_blank();
            if self.peek().is_none() {
                return Ok(template);
            }

            let key = self.key(TOP)?;
            self.expect('=', &key)?;

            if self.peek() == Some('[') {
                self.bump();
                let vector = self.vector(key)?;
                template.push(Element::Vector(vector));
            } else {
                let value = self.value(&key, false)?;
                template.add_pair(key, value);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_rendered() {
        let src = r#"CPU="1"
MEMORY="64"
DISK=[
    IMAGE_ID="119",
    DEV_PREFIX="vd" ]
NIC=[
    NETWORK_ID="3",
    MODEL="virtio" ]"#;

        let t: Template = src.parse().unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.get_int("MEMORY").unwrap(), 64);
        assert_eq!(t.get_str_from_vector("NIC", "MODEL").unwrap(), "virtio");
        assert_eq!(t.to_string(), src);
    }

    #[test]
    fn parse_escapes() {
        let t: Template = r#"A="a\\\"b"
B="c\nd""#
            .parse()
            .unwrap();
        assert_eq!(t.get_str("A").unwrap(), r#"a\"b"#);
        assert_eq!(t.get_str("B").unwrap(), r"c\nd");
    }

    #[test]
    fn parse_hand_written() {
        let src = "# a comment\nNAME = test-vm\n\n\
                   CONTEXT = [ NETWORK = YES, TOKEN=\"YES\" ]\nGRAPHICS=[]";
        let t: Template = src.parse().unwrap();

        assert_eq!(t.get_str("NAME").unwrap(), "test-vm");
        let ctx = t.get_vector("CONTEXT").unwrap();
        assert_eq!(ctx.get_str("NETWORK").unwrap(), "YES");
        assert_eq!(ctx.get_str("TOKEN").unwrap(), "YES");
        assert!(t.get_vector("GRAPHICS").unwrap().is_empty());
    }

    #[test]
    fn multiline_quoted_value() {
        let t: Template = "USER_DATA=\"#cloud-config\nruncmd: []\"".parse().unwrap();
        assert_eq!(t.get_str("USER_DATA").unwrap(), "#cloud-config\nruncmd: []");
    }

    #[test]
    fn unterminated_vector() {
        let r = "DISK=[\n    IMAGE_ID=\"1\",".parse::<Template>();
        assert!(matches!(r, Err(Error::MalformedTemplate { ref tag, .. }) if tag == "DISK"));
    }

    #[test]
    fn missing_equals() {
        let r = "CPU \"1\"".parse::<Template>();
        assert!(matches!(r, Err(Error::MalformedTemplate { ref tag, .. }) if tag == "CPU"));
    }
}
