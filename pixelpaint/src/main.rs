#![warn(clippy::pedantic)]

//! Headless replay tool: loads a document, rebuilds it from its history, and exports the result as a png.

mod export;
mod settings;

use std::{ffi::OsString, path::PathBuf};

use anyhow::{Context, Result as AnyResult};
use pixelpaint_core::{io, state::Document, Color};

const USAGE: &str = "usage: pixelpaint <document.json> [--out FILE] [--undo N] [--redo N] [--new] [--write-settings]";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
enum ArgsError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),
    #[error("{0:?} is not a count")]
    NotACount(OsString),
    #[error("unrecognized argument {0:?}")]
    Unrecognized(OsString),
    #[error("no document given")]
    NoDocument,
}

#[derive(Default, Debug, PartialEq, Eq)]
struct Args {
    document: Option<PathBuf>,
    out: Option<PathBuf>,
    undo: usize,
    redo: usize,
    /// Create a blank document at `document` instead of loading one.
    new: bool,
    write_settings: bool,
}
impl Args {
    /// Args are paths and flags. Paths are OSStrings, let the system handle character encoding restrictions.
    fn parse(args: impl IntoIterator<Item = OsString>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        let count = |name: &'static str, value: Option<OsString>| -> Result<usize, ArgsError> {
            let value = value.ok_or(ArgsError::MissingValue(name))?;
            value
                .to_str()
                .and_then(|v| v.parse().ok())
                .ok_or(ArgsError::NotACount(value))
        };
        while let Some(arg) = args.next() {
            match arg.to_str() {
                Some("--out") => {
                    parsed.out = Some(args.next().ok_or(ArgsError::MissingValue("--out"))?.into());
                }
                Some("--undo") => parsed.undo = count("--undo", args.next())?,
                Some("--redo") => parsed.redo = count("--redo", args.next())?,
                Some("--new") => parsed.new = true,
                Some("--write-settings") => parsed.write_settings = true,
                _ if parsed.document.is_none() && !arg.to_string_lossy().starts_with("--") => {
                    parsed.document = Some(arg.into());
                }
                _ => return Err(ArgsError::Unrecognized(arg)),
            }
        }
        if parsed.document.is_none() && !parsed.write_settings {
            return Err(ArgsError::NoDocument);
        }
        Ok(parsed)
    }
}

fn run(args: Args, settings: &settings::Settings) -> AnyResult<()> {
    let Some(path) = args.document else {
        return Ok(());
    };
    let mut document = if args.new {
        let name = path
            .file_stem()
            .map_or_else(|| "Untitled".to_owned(), |stem| stem.to_string_lossy().into_owned());
        let [width, height] = settings.canvas;
        let document = Document::new(name, width, height);
        io::save_document(&document, &path).with_context(|| format!("save {}", path.display()))?;
        log::info!("created {width}x{height} document at {path:?}");
        document
    } else {
        io::load_document(&path).with_context(|| format!("load {}", path.display()))?
    };

    let undone = document.undo_n(args.undo);
    let redone = document.redo_n(args.redo);
    if undone != args.undo || redone != args.redo {
        log::warn!(
            "only {undone} of {} undo and {redone} of {} redo steps were possible",
            args.undo,
            args.redo
        );
    }

    let image = document.composite(Color::from(settings.background));
    let out = args.out.unwrap_or_else(|| settings.output.clone());
    export::write_png(&out, &image).with_context(|| format!("export {}", out.display()))?;
    log::info!(
        "exported {:?} ({} strokes) to {out:?}",
        document.info().name,
        document.timeline().undo_stack().len()
    );
    Ok(())
}

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let args = match Args::parse(std::env::args_os().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            std::process::exit(2);
        }
    };
    let settings = settings::Settings::load_or_default();
    if args.write_settings {
        let path = settings.save().context("write settings")?;
        log::info!("wrote settings to {path:?}");
    }
    run(args, &settings)
}

#[cfg(test)]
mod test {
    use super::{Args, ArgsError};
    use std::ffi::OsString;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(args.iter().map(OsString::from))
    }

    #[test]
    fn full() {
        let args = parse(&["doc.json", "--undo", "2", "--out", "a.png", "--redo", "1"]).unwrap();
        assert_eq!(args.document, Some("doc.json".into()));
        assert_eq!(args.out, Some("a.png".into()));
        assert_eq!((args.undo, args.redo), (2, 1));
        assert!(!args.new);
    }
    #[test]
    fn errors() {
        assert_eq!(parse(&[]), Err(ArgsError::NoDocument));
        assert_eq!(parse(&["doc.json", "--undo"]), Err(ArgsError::MissingValue("--undo")));
        assert_eq!(
            parse(&["doc.json", "--redo", "x"]),
            Err(ArgsError::NotACount("x".into()))
        );
        assert_eq!(
            parse(&["a.json", "b.json"]),
            Err(ArgsError::Unrecognized("b.json".into()))
        );
        assert!(parse(&["--write-settings"]).unwrap().document.is_none());
    }
}
