use clap::{Parser, Subcommand};

mod bitio;
mod codec;
mod commands;
mod huffman;

#[derive(Parser)]
#[command(version, about = "Huffman file compressor")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a file
    Compress {
        input: String,
        output: String,
        /// Print input/output sizes and the compression ratio
        #[arg(long)]
        stats: bool,
    },
    /// Decompress a file produced by `compress`
    Decompress { input: String, output: String },
    /// Print the header summary of a compressed file
    Inspect { file: String },
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().command {
        Command::Compress {
            input,
            output,
            stats,
        } => commands::compress(&input, &output, stats),
        Command::Decompress { input, output } => commands::decompress(&input, &output),
        Command::Inspect { file } => commands::inspect(&file),
    }
}
