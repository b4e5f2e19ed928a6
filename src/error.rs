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

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("more than one element with key {0}")]
    AmbiguousKey(String),

    #[error("more than one vector with key {0}")]
    AmbiguousVector(String),

    #[error("unsupported value type for {key}: {kind}")]
    UnsupportedValueType { key: String, kind: String },

    #[error("could not parse {key}={value:?} as {target}")]
    ParseError {
        key: String,
        value: String,
        target: &'static str,
    },

    #[error("malformed template at <{tag}>: {reason}")]
    MalformedTemplate { tag: String, reason: String },

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Utf8Str(#[from] std::str::Utf8Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn malformed(tag: &str, reason: impl Into<String>) -> Self {
        Error::MalformedTemplate {
            tag: tag.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_includes_tag() {
        let e = Error::malformed("DISK", "unexpected character data");
        assert_eq!(
            e.to_string(),
            "malformed template at <DISK>: unexpected character data"
        );
    }

    #[test]
    fn from_string() {
        let e: Error = String::from("no such file").into();
        assert!(matches!(e, Error::Other(ref s) if s == "no such file"));
    }
}
