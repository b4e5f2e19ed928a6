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

//! Rendering to OpenNebula's native template text.

use std::borrow::Cow;
use std::fmt;

use crate::template::{Element, Pair, Template, Vector};

// backslashes first, otherwise the escaped quotes get doubled
fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(|c| c == '\\' || c == '"') {
        return Cow::Borrowed(value);
    }

    Cow::Owned(value.replace('\\', "\\\\").replace('"', "\\\""))
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.key(), escape(self.value()))
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}=[\n", self.key().to_uppercase())?;

        for (i, pair) in self.pairs().iter().enumerate() {
            if i > 0 {
                f.write_str(",\n")?;
            }
            write!(f, "    {}", pair)?;
        }

        f.write_str(" ]")
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Element::Pair(p) => fmt::Display::fmt(p, f),
            Element::Vector(v) => fmt::Display::fmt(v, f),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, element) in self.elements().iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            fmt::Display::fmt(element, f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn escape_quotes() {
        let p = Pair::new("MSG", r#"say "hi""#);
        assert_eq!(p.to_string(), r#"MSG="say \"hi\"""#);
    }

    #[test]
    fn escape_backslash_before_quote() {
        let p = Pair::new("MSG", r#"a\b"c"#);
        assert_eq!(p.to_string(), r#"MSG="a\\b\"c""#);

        let escaped_quote = Pair::new("MSG", r#"a\"b"#);
        let plain_quote = Pair::new("MSG", r#"a"b"#);
        assert_eq!(escaped_quote.to_string(), r#"MSG="a\\\"b""#);
        assert_eq!(plain_quote.to_string(), r#"MSG="a\"b""#);
        assert_ne!(escaped_quote.to_string(), plain_quote.to_string());
    }

    #[test]
    fn plain_values_untouched() {
        let p = Pair::new("path", "/var/lib/one `x`\ty");
        assert_eq!(p.to_string(), "path=\"/var/lib/one `x`\ty\"");
    }

    #[test]
    fn vector_layout() {
        let mut v = Vector::new("disk");
        v.add_pair("IMAGE_ID", "119").add_pair("DEV_PREFIX", "vd");

        assert_eq!(
            v.to_string(),
            "DISK=[\n    IMAGE_ID=\"119\",\n    DEV_PREFIX=\"vd\" ]"
        );
    }

    #[test]
    fn single_pair_vector() {
        let mut v = Vector::new("CONTEXT");
        v.add_pair("NETWORK", "YES");
        assert_eq!(v.to_string(), "CONTEXT=[\n    NETWORK=\"YES\" ]");
    }

    #[test]
    fn empty_vector_is_closed() {
        assert_eq!(Vector::new("features").to_string(), "FEATURES=[\n ]");
    }

    #[test]
    fn full_template() {
        let mut t = Template::new();
        t.add_pair("CPU", 1).add_pair("MEMORY", 64).add_pair("VCPU", "2");
        t.add_vector("DISK")
            .add_pair("IMAGE_ID", "119")
            .add_pair("DEV_PREFIX", "vd");
        t.add_vector("NIC")
            .add_pair("NETWORK_ID", "3")
            .add_pair("MODEL", "virtio");

        let expected = r#"CPU="1"
MEMORY="64"
VCPU="2"
DISK=[
    IMAGE_ID="119",
    DEV_PREFIX="vd" ]
NIC=[
    NETWORK_ID="3",
    MODEL="virtio" ]"#;

        assert_eq!(t.to_string(), expected);
    }

    #[test]
    fn empty_template() {
        assert_eq!(Template::new().to_string(), "");
    }
}
