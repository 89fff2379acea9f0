use crate::demo::{run_assess, run_demo, run_plan, AssessArgs, DemoArgs, PlanArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use prakriti::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "prakriti-api",
    about = "Score constitution questionnaires and build meal plans from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Classify every respondent in a questionnaire CSV export
    Assess(AssessArgs),
    /// Print a meal plan for a chosen constitution
    Plan(PlanArgs),
    /// Run an end-to-end demo: assessment, plan, and meal tracking
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Assess(args) => run_assess(args),
        Command::Plan(args) => run_plan(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prakriti::workflows::prakriti::Dosha;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["prakriti-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn plan_arguments_parse_dosha_names() {
        let cli = Cli::try_parse_from([
            "prakriti-api",
            "plan",
            "--dosha",
            "pitta",
            "--secondary",
            "Kapha",
            "--weeks",
            "2",
            "--seed",
            "42",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Plan(args)) => {
                assert_eq!(args.dosha, Dosha::Pitta);
                assert_eq!(args.secondary, Some(Dosha::Kapha));
                assert_eq!(args.weeks, Some(2));
                assert_eq!(args.seed, Some(42));
            }
            other => panic!("expected plan command, got {other:?}"),
        }
    }

    #[test]
    fn unknown_dosha_is_rejected() {
        let result = Cli::try_parse_from(["prakriti-api", "plan", "--dosha", "ether"]);
        assert!(result.is_err());
    }
}
