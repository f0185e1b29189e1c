use super::Parser;

#[derive(Parser, Debug)]
#[command(name = "cartola", about = "Authenticated client for the Cartola API")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,
    /// API path to request.
    #[arg(long, default_value = "/api/teams")]
    pub path: String,
    /// Number of simultaneous requests to send.
    #[arg(long, default_value_t = 1)]
    pub concurrent: usize,
    /// Renew interactively when automatic renewal gives up, then retry once.
    #[arg(long)]
    pub renew: bool,
}
