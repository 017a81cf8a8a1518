//! cfn-intrinsics cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; cfn-intrinsics ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve intrinsic functions of a template
    ///
    /// Reads the template from stdin unless --input-file is provided
    Expand(ExpandCommand),

    /// Print resources so that dependencies come first, one logical ID per line
    Order(OrderCommand),
}

#[derive(Parser, Debug)]
pub struct ExpandCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub resolve: ResolveArgs,

    #[clap(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct OrderCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub resolve: ResolveArgs,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load the template from a file (YAML or JSON)
    #[clap(short = 'f', long = "input-file")]
    pub file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Set a parameter value, overrides its declared default
    #[clap(short = 'P', long = "parameter", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub parameters: Vec<(String, String)>,

    /// Rename a resource, references follow the new logical ID
    #[clap(long = "rename", value_name = "OLD=NEW", value_parser = parse_key_value)]
    pub renames: Vec<(String, String)>,

    /// Never resolve intrinsics whose argument equals this value
    #[clap(long = "placeholder", value_name = "VALUE")]
    pub placeholders: Vec<String>,
}

fn parse_key_value(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, found '{input}'")),
    }
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn key_values() {
        assert_eq!(
            parse_key_value("Stage=prod"),
            Ok(("Stage".to_string(), "prod".to_string()))
        );
        assert_eq!(
            parse_key_value("Url=a=b"),
            Ok(("Url".to_string(), "a=b".to_string()))
        );
        assert!(parse_key_value("Stage").is_err());
        assert!(parse_key_value("=prod").is_err());
    }

    #[test]
    fn arguments() {
        let cli = Cli::parse_from([
            "cfn-intrinsics",
            "expand",
            "-f",
            "template.yaml",
            "-P",
            "Stage=prod",
            "--rename",
            "Old=New",
            "--placeholder",
            "Later",
            "-F",
            "json",
        ]);

        let Command::Expand(expand) = cli.command else {
            panic!("expected expand");
        };
        assert_eq!(expand.input.file, Some(PathBuf::from("template.yaml")));
        assert_eq!(
            expand.resolve.parameters,
            [("Stage".to_string(), "prod".to_string())]
        );
        assert_eq!(
            expand.resolve.renames,
            [("Old".to_string(), "New".to_string())]
        );
        assert_eq!(expand.resolve.placeholders, ["Later"]);
        assert!(matches!(expand.output.format, OutputFormat::Json));
    }
}
