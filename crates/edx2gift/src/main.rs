use crate::prelude::*;
use clap::Parser;

mod convert;
mod error;
mod prelude;
mod serve;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Convert edX problem XML into Moodle GIFT quizzes"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "EDX2GIFT_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Convert an edX XML file to GIFT and print it
    Convert(crate::convert::App),

    /// Serve the conversion over HTTP
    Serve(crate::serve::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Convert(sub_app) => crate::convert::run(sub_app, app.global).await,
        SubCommands::Serve(sub_app) => crate::serve::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
