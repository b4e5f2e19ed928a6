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

use serde_yaml;
use tracing::info;

pub mod models;
use models::Resource;

use crate::config::DecoderConfig;
use crate::error::Error;
use crate::template::Template;
use crate::vm::VmTemplate;

pub fn resources_from_yaml(yaml: &str) -> Result<Vec<Resource>, Error> {
    let mut rs = Vec::new();

    for res in yaml.split("---\n") {
        if res.trim().is_empty() {
            continue;
        }

        let r = serde_yaml::from_str(&res)?;
        rs.push(r);
    }

    Ok(rs)
}

/// Builds one VM template per machine in a (multi-document) manifest.
pub fn templates_from_yaml(yaml: &str) -> Result<Vec<(String, VmTemplate)>, Error> {
    let mut out = Vec::new();

    for res in resources_from_yaml(yaml)? {
        match res {
            Resource::Machine(m) => {
                info!("building template for machine {}", m.metadata.name);
                out.push((m.metadata.name.clone(), m.to_template()?));
            }
        }
    }

    Ok(out)
}

pub fn template_from_xml(xml: &str, config: &DecoderConfig) -> Result<Template, Error> {
    let t = Template::from_xml_with(xml, config)?;
    info!("decoded template with {} elements", t.len());
    Ok(t)
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    pub fn test_resources_from_yaml() {
        let inp = "---
kind: Machine
metadata:
  name: vm1
spec:
  cpu: 4
  memory: 512Mi
---
kind: Machine
metadata:
  name: vm2
spec:
  cpu: 2
  memory: 1Gi
  disks:
    - image: ubuntu-22.04
";

        let rs = resources_from_yaml(&inp).unwrap();

        assert!(rs.len() == 2);

        for r in rs {
            match r {
                models::Resource::Machine(m) => {
                    if m.metadata.name == "vm1" {
                        assert!(m.spec.cpu == 4.0);
                    }
                    if m.metadata.name == "vm2" {
                        assert!(m.spec.disks.len() == 1);
                    }
                }
            }
        }
    }

    #[test]
    pub fn test_templates_from_yaml() {
        let inp = "kind: Machine
metadata:
  name: small
spec:
  cpu: 1
  memory: 128Mi
";

        let ts = templates_from_yaml(inp).unwrap();
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].0, "small");
        assert_eq!(
            ts[0].1.to_string(),
            "NAME=\"small\"\nCPU=\"1\"\nMEMORY=\"128\""
        );
    }

    #[test]
    pub fn test_template_from_xml_strict() {
        let xml = "<TEMPLATE><CPU>1</CPU><DISK><IMAGE_ID>1</IMAGE_ID>";

        let lenient = template_from_xml(xml, &DecoderConfig::default()).unwrap();
        assert_eq!(lenient.get_int_from_vector("DISK", "IMAGE_ID").unwrap(), 1);

        assert!(template_from_xml(xml, &DecoderConfig::strict()).is_err());
    }
}
