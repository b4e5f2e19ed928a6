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

//! Typed view over a virtual machine template.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::error::Error;
use crate::template::{Template, Value, Vector};

pub mod keys {
    pub const NAME: &str = "NAME";
    pub const CPU: &str = "CPU";
    pub const VCPU: &str = "VCPU";
    pub const MEMORY: &str = "MEMORY";

    pub const DISK: &str = "DISK";
    pub const IMAGE_ID: &str = "IMAGE_ID";
    pub const IMAGE: &str = "IMAGE";
    pub const DEV_PREFIX: &str = "DEV_PREFIX";
    pub const SIZE: &str = "SIZE";

    pub const NIC: &str = "NIC";
    pub const NETWORK_ID: &str = "NETWORK_ID";
    pub const NETWORK: &str = "NETWORK";
    pub const MODEL: &str = "MODEL";
    pub const MAC: &str = "MAC";
    pub const IP: &str = "IP";

    pub const CONTEXT: &str = "CONTEXT";
    pub const USER_DATA: &str = "USER_DATA";
    pub const SSH_PUBLIC_KEY: &str = "SSH_PUBLIC_KEY";
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VmTemplate {
    template: Template,
}

impl VmTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_inner(self) -> Template {
        self.template
    }

    fn set<V: Into<Value>>(&mut self, key: &str, value: V) -> &mut Self {
        self.template.del(key).add_pair(key, value);
        self
    }

    pub fn name(&mut self, name: &str) -> &mut Self {
        self.set(keys::NAME, name)
    }

    pub fn cpu<V: Into<Value>>(&mut self, cpu: V) -> &mut Self {
        self.set(keys::CPU, cpu)
    }

    pub fn vcpu(&mut self, vcpu: u32) -> &mut Self {
        self.set(keys::VCPU, vcpu)
    }

    /// Memory in MiB.
    pub fn memory(&mut self, mib: i64) -> &mut Self {
        self.set(keys::MEMORY, mib)
    }

    pub fn add_disk(&mut self) -> &mut Vector {
        self.template.add_vector(keys::DISK)
    }

    pub fn add_nic(&mut self) -> &mut Vector {
        self.template.add_vector(keys::NIC)
    }

    pub fn add_context<V: Into<Value>>(&mut self, key: &str, value: V) -> Result<&mut Self, Error> {
        self.template.add_pair_to_vector(keys::CONTEXT, key, value)?;
        Ok(self)
    }

    pub fn get_cpu(&self) -> Result<f64, Error> {
        self.template.get_float(keys::CPU)
    }

    pub fn get_vcpu(&self) -> Result<i64, Error> {
        self.template.get_int(keys::VCPU)
    }

    pub fn get_memory(&self) -> Result<i64, Error> {
        self.template.get_int(keys::MEMORY)
    }

    pub fn disks(&self) -> Vec<&Vector> {
        self.template.get_vectors(keys::DISK)
    }

    pub fn nics(&self) -> Vec<&Vector> {
        self.template.get_vectors(keys::NIC)
    }
}

impl From<Template> for VmTemplate {
    fn from(template: Template) -> Self {
        Self { template }
    }
}

impl Deref for VmTemplate {
    type Target = Template;

    fn deref(&self) -> &Template {
        &self.template
    }
}

impl DerefMut for VmTemplate {
    fn deref_mut(&mut self) -> &mut Template {
        &mut self.template
    }
}

impl fmt::Display for VmTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.template, f)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn setters_replace() {
        let mut vm = VmTemplate::new();
        vm.cpu(1).memory(64).cpu(2);

        assert_eq!(vm.get_strs(keys::CPU), vec!["2"]);
        assert_eq!(vm.get_cpu().unwrap(), 2.0);
        assert_eq!(vm.get_memory().unwrap(), 64);
        assert_eq!(vm.to_string(), "MEMORY=\"64\"\nCPU=\"2\"");
    }

    #[test]
    fn build_vm() {
        let mut vm = VmTemplate::new();
        vm.name("web").cpu(1).vcpu(2).memory(512);
        vm.add_disk()
            .add_pair(keys::IMAGE_ID, 119)
            .add_pair(keys::DEV_PREFIX, "vd");
        vm.add_nic().add_pair(keys::NETWORK_ID, 3);
        vm.add_nic().add_pair(keys::NETWORK_ID, 4);
        vm.add_context(keys::USER_DATA, "#cloud-config").unwrap();

        assert_eq!(vm.get_vcpu().unwrap(), 2);
        assert_eq!(vm.disks().len(), 1);
        assert_eq!(vm.nics().len(), 2);
        assert_eq!(
            vm.get_str_from_vector(keys::CONTEXT, keys::USER_DATA).unwrap(),
            "#cloud-config"
        );
        assert!(matches!(
            vm.get_vector(keys::NIC),
            Err(Error::AmbiguousVector(_))
        ));
    }

    #[test]
    fn wraps_parsed_template() {
        let t: Template = "CPU=\"0.5\"\nVCPU=\"1\"".parse().unwrap();
        let vm = VmTemplate::from(t);
        assert_eq!(vm.get_cpu().unwrap(), 0.5);
        assert!(vm.get_memory().is_err());
        assert_eq!(vm.into_inner().len(), 2);
    }
}
