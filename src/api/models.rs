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

use std::net::IpAddr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::mac::Mac;
use crate::template::Value;
use crate::vm::{keys, VmTemplate};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum Resource {
    Machine(Machine),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Machine {
    pub metadata: Metadata,
    pub spec: Spec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub name: String,
}

impl Machine {
    pub fn to_template(&self) -> Result<VmTemplate, Error> {
        let spec = &self.spec;
        let mut vm = VmTemplate::new();

        vm.name(&self.metadata.name).cpu(cpu_value(spec.cpu));
        if let Some(vcpu) = spec.vcpu {
            vm.vcpu(vcpu);
        }
        vm.memory(to_mib(&spec.memory)?);

        for disk in &spec.disks {
            let v = vm.add_disk();
            if let Some(id) = disk.image_id {
                v.add_pair(keys::IMAGE_ID, id);
            }
            if let Some(ref image) = disk.image {
                v.add_pair(keys::IMAGE, image);
            }
            if let Some(ref prefix) = disk.dev_prefix {
                v.add_pair(keys::DEV_PREFIX, prefix);
            }
            if let Some(ref size) = disk.size {
                v.add_pair(keys::SIZE, to_mib(size)?);
            }
        }

        for nic in &spec.nics {
            let v = vm.add_nic();
            if let Some(id) = nic.network_id {
                v.add_pair(keys::NETWORK_ID, id);
            }
            if let Some(ref network) = nic.network {
                v.add_pair(keys::NETWORK, network);
            }
            if let Some(ref model) = nic.model {
                v.add_pair(keys::MODEL, model);
            }
            if let Some(ref mac) = nic.mac {
                let parsed: Mac = mac.parse().map_err(|_| Error::ParseError {
                    key: keys::MAC.to_string(),
                    value: mac.clone(),
                    target: "mac address",
                })?;
                v.add_pair(keys::MAC, parsed.to_string());
            }
            if let Some(ref ip) = nic.ip {
                v.add_pair(keys::IP, to_ip(ip)?.to_string());
            }
        }

        if let Some(ref userdata) = spec.userdata {
            vm.add_context(keys::USER_DATA, userdata)?;
        }

        if !spec.ssh_keys.is_empty() {
            vm.add_context(keys::SSH_PUBLIC_KEY, spec.ssh_keys.join("\n"))?;
        }

        for (k, v) in &spec.context {
            let key = k.as_str().ok_or_else(|| Error::UnsupportedValueType {
                key: format!("{:?}", k),
                kind: String::from("non-string context key"),
            })?;
            vm.add_context(key, context_value(key, v)?)?;
        }

        Ok(vm)
    }
}

// whole cpu counts stay integers in the template
fn cpu_value(cpu: f64) -> Value {
    if cpu.fract() == 0.0 && cpu.abs() < i64::MAX as f64 {
        Value::Integer(cpu as i64)
    } else {
        Value::Real(cpu)
    }
}

fn context_value(key: &str, v: &serde_yaml::Value) -> Result<Value, Error> {
    use serde_yaml::Value as Yaml;

    let unsupported = |kind: &str| Error::UnsupportedValueType {
        key: key.to_string(),
        kind: kind.to_string(),
    };

    match v {
        Yaml::String(s) => Ok(Value::Text(s.clone())),
        Yaml::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Value::Integer(i)),
            (None, Some(f)) if n.is_f64() => Ok(Value::Real(f)),
            _ => Err(unsupported("number out of range")),
        },
        Yaml::Null => Err(unsupported("null")),
        Yaml::Bool(_) => Err(unsupported("bool")),
        Yaml::Sequence(_) => Err(unsupported("sequence")),
        Yaml::Mapping(_) => Err(unsupported("mapping")),
        Yaml::Tagged(_) => Err(unsupported("tagged value")),
    }
}

fn to_ip(s: &str) -> Result<IpAddr, Error> {
    s.parse::<IpNet>()
        .map(|net| net.addr())
        .or_else(|_| s.parse::<IpAddr>())
        .map_err(|_| Error::ParseError {
            key: keys::IP.to_string(),
            value: s.to_string(),
            target: "ip address",
        })
}

pub type SizeString = String;

/// Parses sizes like `100G`, `512Mi` or `4096` into bytes.
pub fn to_size(s: &str) -> Result<u64, Error> {
    let invalid = || Error::ParseError {
        key: String::from("size"),
        value: s.to_string(),
        target: "size",
    };

    let trimmed = s.trim();
    let (body, co): (&str, u64) = match trimmed.strip_suffix('i') {
        // binary byte mode
        Some(b) => (b, 1024),
        None => (trimmed, 1000),
    };

    let (num, exp) = match body.char_indices().last() {
        Some((i, c)) if c.is_ascii_alphabetic() => {
            let exp = match c {
                'T' | 't' => 4,
                'G' | 'g' => 3,
                'M' | 'm' => 2,
                'K' | 'k' => 1,
                _ => return Err(invalid()),
            };
            (&body[..i], exp)
        }
        _ => (body, 0),
    };

    let scalar = num.parse::<u64>().map_err(|_| invalid())?;
    scalar.checked_mul(co.pow(exp)).ok_or_else(invalid)
}

/// Size in MiB, the unit OpenNebula uses for MEMORY and SIZE. Never below 1.
pub fn to_mib(s: &str) -> Result<i64, Error> {
    let mib = (to_size(s)? / (1024 * 1024)).max(1);
    i64::try_from(mib).map_err(|_| Error::ParseError {
        key: String::from("size"),
        value: s.to_string(),
        target: "size in MiB",
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Spec {
    pub cpu: f64,
    pub vcpu: Option<u32>,
    pub memory: SizeString,

    #[serde(skip_serializing_if = "Vec::is_empty", default = "Vec::new")]
    pub disks: Vec<Disk>,

    #[serde(skip_serializing_if = "Vec::is_empty", default = "Vec::new")]
    pub nics: Vec<Nic>,

    pub userdata: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default = "Vec::new")]
    pub ssh_keys: Vec<String>,

    // kept as a yaml mapping so the user's key order survives
    #[serde(skip_serializing_if = "serde_yaml::Mapping::is_empty", default)]
    pub context: serde_yaml::Mapping,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Disk {
    pub image_id: Option<u32>,
    pub image: Option<String>,
    pub dev_prefix: Option<String>,
    pub size: Option<SizeString>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Nic {
    pub network_id: Option<u32>,
    pub network: Option<String>,
    pub model: Option<String>,
    pub mac: Option<String>,
    pub ip: Option<String>,
}
