// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{
    args::Args, op::Op, Boards, Browse, Content, Health, Init, Login, Logout, Quote, Serve, Upload,
    Version,
};

command_enum! {
    (Init, Init),
    (Serve, Serve),
    (Health, Health),
    (Version, Version),
    (Login, Login),
    (Logout, Logout),
    (Boards, Boards),
    (Browse, Browse),
    (Quote, Quote),
    (Content, Content),
    (Upload, Upload),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Resolve remote URL: explicit flag > config api_url > http://localhost:3000
    let remote = cli::op::resolve_remote(args.remote, args.config_path.clone());

    let ctx = match cli::op::OpContext::new(remote, args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
