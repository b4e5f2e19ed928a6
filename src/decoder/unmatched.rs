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

//! Catch-all buckets for elements a resource schema does not know about.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decoder::{TemplateDecoder, Token, TokenSource, XmlTokens};
use crate::error::Error;
use crate::template::single;

pub trait UnmatchedTags: Default {
    fn insert(&mut self, tag: String, text: String);
}

/// Unmatched elements keyed by tag. A repeated tag replaces the earlier
/// value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedTagsMap {
    tags: HashMap<String, String>,
}

impl UnmatchedTagsMap {
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        TemplateDecoder::default().collect_document(&mut XmlTokens::from_str(xml))
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl UnmatchedTags for UnmatchedTagsMap {
    fn insert(&mut self, tag: String, text: String) {
        if let Some(old) = self.tags.insert(tag.clone(), text) {
            debug!("unmatched tag <{}> seen again, dropping {:?}", tag, old);
        }
    }
}

/// Unmatched elements in document order, duplicates kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedTagsList {
    tags: Vec<(String, String)>,
}

impl UnmatchedTagsList {
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        TemplateDecoder::default().collect_document(&mut XmlTokens::from_str(xml))
    }

    pub fn get_all(&self, tag: &str) -> Vec<&str> {
        self.tags
            .iter()
            .filter(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn get_single(&self, tag: &str) -> Result<&str, Error> {
        single(self.get_all(tag), tag, Error::AmbiguousKey)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl UnmatchedTags for UnmatchedTagsList {
    fn insert(&mut self, tag: String, text: String) {
        self.tags.push((tag, text));
    }
}

impl TemplateDecoder {
    /// Reads the element `tag`, whose start tag has been consumed, into
    /// `tags`. Only its direct text is kept; nested elements are skipped.
    pub fn absorb<C, S>(&self, tags: &mut C, tag: &str, source: &mut S) -> Result<(), Error>
    where
        C: UnmatchedTags,
        S: TokenSource,
    {
        let mut text = String::new();
        let mut depth = 0usize;

        loop {
            match source.next_token()? {
                Some(Token::Text(t)) if depth == 0 => text.push_str(&t),
                Some(Token::Text(_)) => {}
                Some(Token::Start(_)) => depth += 1,
                Some(Token::End(name)) if depth == 0 => {
                    if name != tag {
                        return Err(Error::malformed(
                            tag,
                            format!("unexpected closing tag </{}>", name),
                        ));
                    }
                    tags.insert(tag.to_string(), text);
                    return Ok(());
                }
                Some(Token::End(_)) => depth -= 1,
                None => return self.truncated(tag),
            }
        }
    }

    /// Collects every child of `container` into a fresh bucket.
    pub fn collect<C, S>(&self, container: &str, source: &mut S) -> Result<C, Error>
    where
        C: UnmatchedTags,
        S: TokenSource,
    {
        let mut tags = C::default();

        loop {
            match source.next_token()? {
                Some(Token::Start(tag)) => self.absorb(&mut tags, &tag, source)?,
                Some(Token::Text(_)) => {}
                Some(Token::End(name)) => {
                    if name != container {
                        return Err(Error::malformed(
                            container,
                            format!("unexpected closing tag </{}>", name),
                        ));
                    }
                    return Ok(tags);
                }
                None => {
                    self.truncated(container)?;
                    return Ok(tags);
                }
            }
        }
    }

    pub fn collect_document<C, S>(&self, source: &mut S) -> Result<C, Error>
    where
        C: UnmatchedTags,
        S: TokenSource,
    {
        match self.open_container(source)? {
            Some(container) => self.collect(&container, source),
            None => Ok(C::default()),
        }
    }
}
