mod args;
mod dump;
mod err;
mod transcode;

use std::{
    fs::File,
    io::{self, Read, Write},
    path::Path,
};

use args::{Command, Mp2Args};
use clap::Parser;
use mp2_core::Config;

use crate::err::CliError;

fn main() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&filters)
        .init();

    let args = Mp2Args::parse();

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Mp2Args) -> Result<(), CliError> {
    let config = Config::default().with_max_depth(args.max_depth);
    let input = read_input(args.input.as_deref())?;
    let mut output = open_output(args.output.as_deref())?;

    log::debug!("read {} input bytes", input.len());

    match args.command {
        Command::Encode => output.write_all(&transcode::json_to_mp2(&input)?)?,
        Command::Decode { pretty } => {
            output.write_all(&transcode::mp2_to_json(&input, config, pretty)?)?
        }
        Command::Dump => dump::dump(&input, &config, &mut output)?,
    }

    output.flush()?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> io::Result<Vec<u8>> {
    let mut buf = vec![];

    match path {
        Some(path) => File::open(path)?.read_to_end(&mut buf)?,
        None => io::stdin().lock().read_to_end(&mut buf)?,
    };

    Ok(buf)
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(io::BufWriter::new(File::create(path)?)),
        None => Box::new(io::BufWriter::new(io::stdout().lock())),
    })
}
