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

use std::io::Cursor;

use quick_xml::events::BytesText;
use quick_xml::writer::Writer;

use crate::config::DecoderConfig;
use crate::decoder::{TemplateDecoder, XmlTokens};
use crate::error::Error;
use crate::template::{Element, Pair, Template};

impl Template {
    /// Parses the children of the first element of `xml`, e.g. the
    /// `<TEMPLATE>` block of a resource.
    pub fn from_xml(xml: &str) -> Result<Self, Error> {
        Self::from_xml_with(xml, &DecoderConfig::default())
    }

    pub fn from_xml_with(xml: &str, config: &DecoderConfig) -> Result<Self, Error> {
        let mut tokens = XmlTokens::from_str(xml);
        TemplateDecoder::new(config.clone()).decode_document(&mut tokens)
    }

    pub fn to_xml(&self, root: &str) -> Result<String, Error> {
        let mut w = Writer::new(Cursor::new(Vec::new()));

        w.create_element(root).write_inner_content(|w| {
            for element in self.elements() {
                match element {
                    Element::Pair(p) => write_pair(w, p)?,
                    Element::Vector(v) => {
                        w.create_element(v.key()).write_inner_content(|w| {
                            for p in v.pairs() {
                                write_pair(w, p)?;
                            }
                            Ok(())
                        })?;
                    }
                }
            }
            Ok(())
        })?;

        let xml = String::from_utf8(w.into_inner().into_inner())?;
        Ok(xml)
    }
}

fn write_pair(w: &mut Writer<Cursor<Vec<u8>>>, p: &Pair) -> quick_xml::Result<()> {
    w.create_element(p.key())
        .write_text_content(BytesText::new(p.value()))?;
    Ok(())
}
