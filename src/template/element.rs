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

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::template::{collect_ints, is_key, single, Value};

/// A flat `KEY="value"` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    key: String,
    value: String,
}

impl Pair {
    pub fn new<K: Into<String>, V: Into<Value>>(key: K, value: V) -> Self {
        let key = key.into();
        if !is_key(&key) {
            debug!("pair key {:?} will not parse back from text", key);
        }
        Self {
            key,
            value: value.into().into_text(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn as_int(&self) -> Result<i64, Error> {
        self.value.parse::<i64>().map_err(|_| self.parse_error("integer"))
    }

    pub fn as_float(&self) -> Result<f64, Error> {
        self.value.parse::<f64>().map_err(|_| self.parse_error("float"))
    }

    fn parse_error(&self, target: &'static str) -> Error {
        Error::ParseError {
            key: self.key.clone(),
            value: self.value.clone(),
            target,
        }
    }
}

/// A named group of pairs, e.g. one `DISK` or `NIC` entry.
///
/// Vectors are exactly one level deep: they hold pairs, never other vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    key: String,
    pairs: Vec<Pair>,
}

impl Vector {
    pub fn new<K: Into<String>>(key: K) -> Self {
        let key = key.into();
        if !is_key(&key) {
            debug!("vector key {:?} will not parse back from text", key);
        }
        Self {
            key,
            pairs: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn add_pair<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> &mut Self {
        self.pairs.push(Pair::new(key, value));
        self
    }

    /// Removes every pair named `key`. Removing an absent key is a no-op.
    pub fn del(&mut self, key: &str) -> &mut Self {
        self.pairs.retain(|p| p.key != key);
        self
    }

    pub fn get_pairs(&self, key: &str) -> Vec<&Pair> {
        self.pairs.iter().filter(|p| p.key == key).collect()
    }

    pub fn get_pair(&self, key: &str) -> Result<&Pair, Error> {
        single(self.get_pairs(key), key, Error::AmbiguousKey)
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

    pub fn get_ints(&self, key: &str) -> Vec<i64> {
        collect_ints(self.get_pairs(key))
    }
}
