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

use hex;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Mac {
    octets: [u8; 6],
}

impl std::fmt::Display for Mac {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.octets.map(|o| hex::encode([o])).join(":"))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct MacParseError;

impl std::str::FromStr for Mac {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = s
            .split(':')
            .map(|o| match o.len() {
                2 => hex::decode(o).map_err(|_| MacParseError),
                _ => Err(MacParseError),
            })
            .collect::<Result<Vec<_>, _>>()?
            .concat();
        let octets: [u8; 6] = v.try_into().map_err(|_| MacParseError)?;

        Ok(Mac { octets })
    }
}
