use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "Registration, login and password reset service")]
pub struct Cli {
    /// Path of the TOML settings file.
    #[arg(long)]
    pub settings: Option<String>,
}
