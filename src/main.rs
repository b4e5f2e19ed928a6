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

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;

use nebula_template::api;
use nebula_template::{DecoderConfig, Error, EofPolicy, Template};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the templates described by a machine manifest
    Render { model_file: PathBuf },
    /// Convert an XML template to template text
    Convert {
        xml_file: PathBuf,
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Print every value stored under a key of an XML template
    Get { xml_file: PathBuf, key: String },
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let res = match &args.command {
        Commands::Render { model_file } => render_from_file(model_file),
        Commands::Convert {
            xml_file,
            strict,
            config,
            json,
        } => convert(xml_file, *strict, config.as_deref(), *json),
        Commands::Get { xml_file, key } => get(xml_file, key),
    };

    if let Err(e) = res {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn render_from_file(model_file: &Path) -> Result<(), Error> {
    let data = std::fs::read_to_string(model_file)?;
    let templates = api::templates_from_yaml(&data)?;

    for (i, (name, t)) in templates.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("# {}", name);
        println!("{}", t);
    }
    Ok(())
}

fn load_config(strict: bool, config: Option<&Path>) -> Result<DecoderConfig, Error> {
    let mut c = match config {
        Some(path) => DecoderConfig::from_file(path)?,
        None => DecoderConfig::default(),
    };
    if strict {
        c.eof = EofPolicy::Strict;
    }
    info!("decoder config: {:?}", c);
    Ok(c)
}

fn read_template(xml_file: &Path, config: &DecoderConfig) -> Result<Template, Error> {
    let data = std::fs::read_to_string(xml_file)?;
    api::template_from_xml(&data, config)
}

fn convert(xml_file: &Path, strict: bool, config: Option<&Path>, json: bool) -> Result<(), Error> {
    let config = load_config(strict, config)?;
    let t = read_template(xml_file, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&t)?);
    } else {
        println!("{}", t);
    }
    Ok(())
}

fn get(xml_file: &Path, key: &str) -> Result<(), Error> {
    let t = read_template(xml_file, &DecoderConfig::default())?;

    for value in t.get_strs(key) {
        println!("{}", value);
    }
    for vector in t.get_vectors(key) {
        println!("{}", vector);
    }
    Ok(())
}
