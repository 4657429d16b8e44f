//! Command line surface of the `upload` binary: two flags, the usage screen, and the pipeline
//! that ties configuration, file loading and uploading together.
use crate::{err, Error, ObjectSource, ObjectStore, S3Config, UploadReport, Uploader};
use clap::{value_parser, Arg, ArgMatches, Command};
use snafu::OptionExt;
use std::{ffi::OsString, fmt, future::Future, path::PathBuf};
use tracing::debug;

pub fn command() -> Command<'static> {
    Command::new("upload")
        .about("Upload a single file to an S3 bucket")
        .disable_help_flag(true)
        .trailing_var_arg(true)
        .arg(
            Arg::new("show_help")
                .short('h')
                .takes_value(true)
                .value_name("ANY")
                .value_parser(value_parser!(String))
                .help("Show the usage"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .takes_value(true)
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .help("The file to be uploaded"),
        )
        // Flag parsing stops at the first positional argument, which is ignored with the rest.
        .arg(
            Arg::new("rest")
                .hide(true)
                .takes_value(true)
                .multiple_values(true)
                .value_parser(value_parser!(OsString)),
        )
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    pub help: Option<String>,
    pub file: Option<PathBuf>,
}
impl Args {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            help: matches.get_one::<String>("show_help").cloned(),
            file: matches.get_one::<PathBuf>("file").cloned(),
        }
    }
    /// Any non-empty value given to `-h` asks for help.
    pub fn wants_help(&self) -> bool {
        self.help.as_deref().map_or(false, |value| !value.is_empty())
    }
}

/// How a run ended, short of an error.
#[derive(Debug)]
pub enum Outcome {
    /// Help was asked for, or the configuration is incomplete.
    Usage,
    Uploaded(Receipt),
}

#[derive(Debug)]
pub struct Receipt {
    /// The path exactly as given to `-f`
    pub file: PathBuf,
    pub bucket: String,
    pub key: String,
    pub report: UploadReport,
}
impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File {} uploaded at s3://{}",
            self.file.display(),
            self.bucket
        )
    }
}

/// Run the whole pipeline once.
///
/// An incomplete `config` ends the run with [`Outcome::Usage`] before the command line is even
/// parsed. Otherwise `argv` is parsed, `-h` wins over everything else, and the file given with
/// `-f` is read fully before `connect` is called to build the storage client. Nothing touches the
/// network before the file is in memory.
pub async fn run<I, T, F, Fut, S>(config: &S3Config, argv: I, connect: F) -> Result<Outcome, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    F: FnOnce(&S3Config) -> Fut,
    Fut: Future<Output = S>,
    S: ObjectStore,
{
    if !config.is_complete() {
        debug!(missing = ?config.missing(), "configuration incomplete");
        return Ok(Outcome::Usage);
    }

    let args = Args::from_matches(&command().try_get_matches_from(argv)?);
    if args.wants_help() {
        return Ok(Outcome::Usage);
    }
    let file = args.file.context(err::MissingFile)?;

    let source = ObjectSource::file(file.clone(), config.folder.clone());
    let body = source.load().await?;

    let uploader = Uploader::new(connect(config).await);
    let report = uploader
        .upload(&config.bucket, source.get_key(), body)
        .await?;

    Ok(Outcome::Uploaded(Receipt {
        file,
        bucket: config.bucket.clone(),
        key: config.folder.clone(),
        report,
    }))
}

fn paint(code: &str, text: &str, color: bool) -> String {
    if color {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_owned()
    }
}

/// Bold red, for variable names and fatal errors.
pub fn red(text: &str, color: bool) -> String {
    paint("1;31", text, color)
}

pub fn green(text: &str, color: bool) -> String {
    paint("1;32", text, color)
}

/// The usage screen, colored if `color` is set.
pub fn usage(color: bool) -> String {
    format!(
        "Please define the arguments as environment variables! Ex: \n\
         {}=AWSACCESSKEY {}=AWSSECRETKEY {}=BUCKETNAME {}=REGION {}=OBJECTKEY {}\n\n\
         \x20 -f <PATH>  The file to be uploaded\n\
         \x20 -h <ANY>   Show the usage\n\n\
         {} defaults to {} and {} to {}.",
        red(crate::ENV_ACCESS_KEY, color),
        red(crate::ENV_SECRET, color),
        red(crate::ENV_BUCKET, color),
        red(crate::ENV_REGION, color),
        red(crate::ENV_FOLDER, color),
        green("upload -f /path/to/file", color),
        crate::ENV_REGION,
        crate::DEFAULT_REGION,
        crate::ENV_FOLDER,
        crate::DEFAULT_FOLDER,
    )
}

#[cfg(test)]
mod test {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        command()
            .try_get_matches_from(argv)
            .map(|m| Args::from_matches(&m))
    }

    #[test]
    fn parses_both_flags() {
        let args = parse(&["upload", "-f", "/tmp/a.bin", "-h", "yes"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("/tmp/a.bin")));
        assert!(args.wants_help());
    }

    #[test]
    fn empty_help_value_is_not_help() {
        let args = parse(&["upload", "-h", "", "-f", "x"]).unwrap();
        assert!(!args.wants_help());
        assert!(!parse(&["upload"]).unwrap().wants_help());
    }

    #[test]
    fn unknown_flags_are_usage_errors() {
        let err = parse(&["upload", "-x", "1"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        let err = parse(&["upload", "--help"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn trailing_arguments_are_ignored() {
        let args = parse(&["upload", "-f", "/tmp/a.bin", "extra", "more"]).unwrap();
        assert_eq!(args.file, Some(PathBuf::from("/tmp/a.bin")));
        assert!(!args.wants_help());
    }

    #[test]
    fn help_flag_needs_a_value() {
        assert!(parse(&["upload", "-h"]).is_err());
    }

    #[test]
    fn usage_lists_variables_and_flags() {
        let text = usage(false);
        for name in &["ACCESSKEY", "SECRET", "BUCKET", "REGION", "FOLDER", "-f", "-h"] {
            assert!(text.contains(name), "usage is missing {}", name);
        }
        assert!(!text.contains('\x1b'));
        assert!(usage(true).contains("\x1b[1;31mACCESSKEY\x1b[0m"));
    }
}
