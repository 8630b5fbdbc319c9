use crate::commands::shared::OutputArgs;
use crate::commands::validators;
use crate::convert::{ConvertConfig, Converter};
use crate::core::error::ConvertError;
use crate::core::formatter::get_formatter;
use crate::scenario::{HandlerStyle, PathMode};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[arg(
        help = "Path to the Postman collection (v2.x JSON)",
        value_parser = validators::validate_path_exists
    )]
    pub collection: String,

    #[arg(
        help = "Path to a Postman environment export; written to the env store before converting",
        value_parser = validators::validate_path_exists
    )]
    pub environment: Option<String>,

    #[arg(
        long = "features-dir",
        env = "PMCUKE_FEATURES_DIR",
        default_value = "cypress/e2e/postman",
        help = "Directory receiving the generated .feature files",
        value_parser = validators::validate_output_path
    )]
    pub features_dir: String,

    #[arg(
        long = "steps-file",
        env = "PMCUKE_STEPS_FILE",
        default_value = "cypress/e2e/commonPostmanSteps.js",
        help = "Step-definition file to (re)generate",
        value_parser = validators::validate_output_path
    )]
    pub steps_file: String,

    #[arg(
        long = "env-store",
        env = "PMCUKE_ENV_STORE",
        default_value = "cypress.env.json",
        help = "Flat JSON store holding environment values and credentials",
        value_parser = validators::validate_output_path
    )]
    pub env_store: String,

    #[arg(
        long = "cypress-dir",
        env = "PMCUKE_CYPRESS_DIR",
        help = "Also write plain Cypress specs (one .cy.js per folder) below this directory",
        value_parser = validators::validate_output_path
    )]
    pub cypress_dir: Option<String>,

    #[arg(
        long = "path-mode",
        value_enum,
        default_value_t = PathMode::Segments,
        help = "How request paths are derived from the url"
    )]
    pub path_mode: PathMode,

    #[arg(
        long = "handlers",
        value_enum,
        default_value_t = HandlerStyle::Generic,
        help = "Shape of the generated request step handlers"
    )]
    pub handlers: HandlerStyle,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl From<&ConvertArgs> for ConvertConfig {
    fn from(args: &ConvertArgs) -> Self {
        ConvertConfig {
            collection_path: PathBuf::from(&args.collection),
            environment_path: args.environment.as_ref().map(PathBuf::from),
            features_dir: PathBuf::from(&args.features_dir),
            steps_file: PathBuf::from(&args.steps_file),
            env_store: PathBuf::from(&args.env_store),
            cypress_dir: args.cypress_dir.as_ref().map(PathBuf::from),
            path_mode: args.path_mode,
            handler_style: args.handlers,
        }
    }
}

pub fn execute_convert(args: &ConvertArgs) -> Result<(), ConvertError> {
    let summary = Converter::new(ConvertConfig::from(args)).run()?;
    tracing::info!(
        appended = summary.appended(),
        skipped = summary.skipped(),
        "conversion finished"
    );

    let formatter = get_formatter(&args.output.output);
    println!("{}", formatter.format(&summary).trim_end());
    Ok(())
}
