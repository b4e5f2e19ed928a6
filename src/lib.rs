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

pub mod api;
pub mod config;
pub mod decoder;
pub mod error;
pub mod mac;
pub mod template;
pub mod vm;

pub use config::{DecoderConfig, EofPolicy};
pub use decoder::{TemplateDecoder, Token, TokenSource, XmlTokens};
pub use decoder::{UnmatchedTags, UnmatchedTagsList, UnmatchedTagsMap};
pub use error::Error;
pub use template::{is_key, Element, Pair, Template, Value, Vector};
pub use vm::VmTemplate;
