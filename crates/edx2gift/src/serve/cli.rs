use std::path::PathBuf;

use crate::convert::TitleModeArg;

#[derive(Debug, clap::Parser)]
#[command(name = "serve")]
#[command(about = "Serve the edX to GIFT conversion over HTTP")]
pub struct App {
    /// Port to listen on
    #[arg(short, long, env = "EDX2GIFT_PORT", default_value = "8000")]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "EDX2GIFT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Username required by HTTP Basic authentication
    #[arg(long, env = "EDX2GIFT_USERNAME", hide_env_values = true)]
    pub username: String,

    /// Password required by HTTP Basic authentication
    #[arg(long, env = "EDX2GIFT_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Directory with the web front end, served on every path but /convert
    #[arg(long, env = "EDX2GIFT_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// How elements other than responses become question titles
    #[arg(long, value_enum, env = "EDX2GIFT_TITLE_MODE", default_value = "markup")]
    pub title_mode: TitleModeArg,
}
