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

//! OpenNebula's dynamic template: an ordered list of `KEY="value"` pairs and
//! `KEY=[ ... ]` vectors, where keys may repeat.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

mod element;
mod render;
mod text;
mod xml;

pub use element::{Pair, Vector};

/// Value accepted by the builder operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl Value {
    /// Renders the value as template text. Reals use six fractional digits,
    /// like C's `%f`.
    pub fn into_text(self) -> String {
        match self {
            Value::Text(s) => s,
            Value::Integer(i) => i.to_string(),
            Value::Real(f) if f.is_nan() => String::from("NaN"),
            Value::Real(f) if f.is_infinite() => {
                String::from(if f > 0.0 { "+Inf" } else { "-Inf" })
            }
            Value::Real(f) => format!("{:.6}", f),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i.into())
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Real(f.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

/// True when `key` reads back from the text form: non-empty, not starting
/// with `#`, and free of whitespace and `= [ ] , "`. The builder accepts any
/// key, but only these survive a render and parse cycle.
pub fn is_key(key: &str) -> bool {
    !key.is_empty() && !key.starts_with('#') && key.chars().all(key_char)
}

pub(crate) fn key_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '=' | '[' | ']' | ',' | '"')
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Element {
    Pair(Pair),
    Vector(Vector),
}

impl Element {
    pub fn key(&self) -> &str {
        match self {
            Element::Pair(p) => p.key(),
            Element::Vector(v) => v.key(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Template {
    elements: Vec<Element>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Appends a pair. Keys that fail [`is_key`] are kept as given but will
    /// not parse back from the rendered text.
    pub fn add_pair<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> &mut Self {
        self.elements.push(Element::Pair(Pair::new(key, value)));
        self
    }

    /// Appends an empty vector and returns it for filling.
    pub fn add_vector<K: Into<String>>(&mut self, key: K) -> &mut Vector {
        self.push_vector(Vector::new(key))
    }

    fn push_vector(&mut self, vector: Vector) -> &mut Vector {
        let index = self.elements.len();
        self.elements.push(Element::Vector(vector));
        match &mut self.elements[index] {
            Element::Vector(v) => v,
            Element::Pair(_) => unreachable!(),
        }
    }

    /// Adds a pair to the vector named `vector_key`, creating the vector if
    /// there is none yet.
    pub fn add_pair_to_vector<K: Into<String>, V: Into<Value>>(
        &mut self,
        vector_key: &str,
        key: K,
        value: V,
    ) -> Result<&mut Self, Error> {
        let count = self
            .elements
            .iter()
            .filter(|e| matches!(e, Element::Vector(v) if v.key() == vector_key))
            .count();

        match count {
            0 => {
                self.add_vector(vector_key).add_pair(key, value);
            }
            1 => {
                let found = self.elements.iter_mut().find_map(|e| match e {
                    Element::Vector(v) if v.key() == vector_key => Some(v),
                    _ => None,
                });
                if let Some(v) = found {
                    v.add_pair(key, value);
                }
            }
            _ => return Err(Error::AmbiguousVector(vector_key.to_string())),
        }

        Ok(self)
    }

    /// Removes every pair and vector named `key` at the top level.
    pub fn del(&mut self, key: &str) -> &mut Self {
        self.elements.retain(|e| e.key() != key);
        self
    }

    pub fn get_pairs(&self, key: &str) -> Vec<&Pair> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::Pair(p) if p.key() == key => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn get_pair(&self, key: &str) -> Result<&Pair, Error> {
        single(self.get_pairs(key), key, Error::AmbiguousKey)
    }

    pub fn get_vectors(&self, key: &str) -> Vec<&Vector> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::Vector(v) if v.key() == key => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn get_vector(&self, key: &str) -> Result<&Vector, Error> {
        single(self.get_vectors(key), key, Error::AmbiguousVector)
    }

    pub fn get_str(&self, key: &str) -> Result<&str, Error> {
        Ok(self.get_pair(key)?.value())
    }

    pub fn get_int(&self, key: &str) -> Result<i64, Error> {
        self.get_pair(key)?.as_int()
    }

    pub fn get_float(&self, key: &str) -> Result<f64, Error> {
        self.get_pair(key)?.as_float()
    }

    pub fn get_strs(&self, key: &str) -> Vec<&str> {
        self.get_pairs(key).into_iter().map(Pair::value).collect()
    }

    /// Values of every pair named `key` that parse as integers. Entries that
    /// do not parse are skipped.
    pub fn get_ints(&self, key: &str) -> Vec<i64> {
        collect_ints(self.get_pairs(key))
    }

    pub fn get_str_from_vector(&self, vector_key: &str, key: &str) -> Result<&str, Error> {
        self.get_vector(vector_key)?.get_str(key)
    }

    pub fn get_int_from_vector(&self, vector_key: &str, key: &str) -> Result<i64, Error> {
        self.get_vector(vector_key)?.get_int(key)
    }
}

pub(crate) fn single<'a, T: ?Sized>(
    mut matches: Vec<&'a T>,
    key: &str,
    ambiguous: fn(String) -> Error,
) -> Result<&'a T, Error> {
    match matches.len() {
        0 => Err(Error::KeyNotFound(key.to_string())),
        1 => matches.pop().ok_or_else(|| Error::KeyNotFound(key.to_string())),
        _ => Err(ambiguous(key.to_string())),
    }
}

pub(crate) fn collect_ints(pairs: Vec<&Pair>) -> Vec<i64> {
    pairs
        .into_iter()
        .filter_map(|p| match p.as_int() {
            Ok(i) => Some(i),
            Err(e) => {
                debug!("skipping non-integer value: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn key_rules() {
        for key in ["CPU", "SCHED_DS_RANK", "nic_default", "a-b.c"] {
            assert!(is_key(key), "{}", key);
        }
        for key in ["", "a b", "#A", "A=B", "A,B", "A\"B", "[A]"] {
            assert!(!is_key(key), "{}", key);
        }
    }

    #[test]
    fn only_keys_round_trip() {
        let mut good = Template::new();
        good.add_pair("a-b.c", "1");
        let parsed: Template = good.to_string().parse().unwrap();
        assert_eq!(parsed, good);

        for key in ["", "a b", "#A", "A=B"] {
            let mut t = Template::new();
            t.add_pair(key, "1").add_pair("NAME", "x");
            let parsed = t.to_string().parse::<Template>();
            assert!(parsed.map(|p| p != t).unwrap_or(true), "{:?}", key);
        }
    }

    #[test]
    fn add_pair_to_vector_creates_then_reuses() {
        let mut t = Template::new();
        t.add_pair_to_vector("CONTEXT", "NETWORK", "YES").unwrap();
        t.add_pair_to_vector("CONTEXT", "SSH_PUBLIC_KEY", "ssh-ed25519 AAAA")
            .unwrap();

        assert_eq!(t.len(), 1);
        let ctx = t.get_vector("CONTEXT").unwrap();
        assert_eq!(ctx.len(), 2);
        assert_eq!(ctx.get_str("NETWORK").unwrap(), "YES");
    }

    #[test]
    fn add_pair_to_vector_ambiguous() {
        let mut t = Template::new();
        t.add_vector("NIC").add_pair("NETWORK_ID", 1);
        t.add_vector("NIC").add_pair("NETWORK_ID", 2);

        let r = t.add_pair_to_vector("NIC", "MODEL", "virtio");
        assert!(matches!(r, Err(Error::AmbiguousVector(ref k)) if k == "NIC"));
        assert!(t.get_vectors("NIC").iter().all(|v| v.len() == 1));
    }

    #[test]
    fn lookup_arity() {
        let mut t = Template::new();
        t.add_pair("GRAPHICS", "VNC")
            .add_pair("MEMORY", 64)
            .add_pair("GRAPHICS", "SPICE");

        assert!(matches!(t.get_pair("GRAPHICS"), Err(Error::AmbiguousKey(_))));
        assert!(matches!(t.get_pair("CPU"), Err(Error::KeyNotFound(ref k)) if k == "CPU"));
        let both: Vec<_> = t.get_pairs("GRAPHICS").into_iter().map(Pair::value).collect();
        assert_eq!(both, vec!["VNC", "SPICE"]);
    }

    #[test]
    fn pairs_and_vectors_are_looked_up_separately() {
        let mut t = Template::new();
        t.add_pair("NIC", "x");
        t.add_vector("NIC").add_pair("NETWORK_ID", 3);

        assert_eq!(t.get_str("NIC").unwrap(), "x");
        assert_eq!(t.get_int_from_vector("NIC", "NETWORK_ID").unwrap(), 3);
    }

    #[test]
    fn typed_getters() {
        let mut t = Template::new();
        t.add_pair("MEMORY", "64").add_pair("NAME", "abc").add_pair("CPU", 0.25);

        assert_eq!(t.get_int("MEMORY").unwrap(), 64);
        assert!(matches!(t.get_int("NAME"), Err(Error::ParseError { .. })));
        assert_eq!(t.get_float("CPU").unwrap(), 0.25);
        assert!(matches!(t.get_float("VCPU"), Err(Error::KeyNotFound(_))));
    }

    #[test]
    fn get_ints_skips_garbage() {
        let mut t = Template::new();
        t.add_pair("ID", 1).add_pair("ID", "two").add_pair("ID", 3);

        assert_eq!(t.get_ints("ID"), vec![1, 3]);
        assert_eq!(t.get_strs("ID"), vec!["1", "two", "3"]);
        assert!(t.get_ints("NOPE").is_empty());
    }

    #[test]
    fn del_removes_all_matches() {
        let mut t = Template::new();
        t.add_pair("A", 1);
        t.add_vector("DISK").add_pair("IMAGE_ID", 1);
        t.add_pair("B", 2);
        t.add_vector("DISK").add_pair("IMAGE_ID", 2);

        t.del("DISK").del("NOTHING");
        let keys: Vec<_> = t.elements().iter().map(Element::key).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }

    #[test]
    fn value_formatting() {
        assert_eq!(Value::from(64).into_text(), "64");
        assert_eq!(Value::from(-3i64).into_text(), "-3");
        assert_eq!(Value::from(1.5).into_text(), "1.500000");
        assert_eq!(Value::from(0.1234567).into_text(), "0.123457");
        assert_eq!(Value::from(f64::INFINITY).into_text(), "+Inf");
        assert_eq!(Value::from("2").into_text(), "2");
    }
}
