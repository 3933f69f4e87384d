// CLI argument definitions using clap

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "kvwatch")]
#[command(author = "hatlonely <hatlonely@foxmail.com>")]
#[command(version = "0.1.0")]
#[command(about = "Watch keys through a storage driver and print every batch as JSON", long_about = None)]
pub struct Cli {
    /// Storage config file: {type: <driver>, options: {...}} (json/json5/yaml/toml)
    #[arg(short, long)]
    pub config: String,

    /// Keys to watch, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub keys: Vec<String>,

    /// Stop after this many batches (default: run until Ctrl-C)
    #[arg(long)]
    pub cycles: Option<usize>,

    /// Log level for driver logs written to stderr
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Pretty print batches
    #[arg(long)]
    pub pretty: bool,
}
