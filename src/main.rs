// Entrypoint for the CLI application.
// - Keeps `main` small: create an API client and hand it to the UI loop.
// - Returns `anyhow::Result` to simplify error handling.

use metamedia_cli::{api::MetaMediaClient, ui::main_menu};

fn main() -> anyhow::Result<()> {
    // Log verbosity is controlled through RUST_LOG.
    env_logger::init();

    // Create the client configured by the `METAMEDIA_*` environment
    // variables, or fall back to a stock local install. See
    // `api::MetaMediaClient::from_env`.
    let api = MetaMediaClient::from_env()?;

    // Start the interactive menu. This call blocks until the user exits.
    main_menu(api)?;
    Ok(())
}
