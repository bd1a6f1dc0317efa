//! CLI command implementations.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the grid endpoint over a `SQLite` database |
//! | `fetch` | Load a grid from a running endpoint and print it |
//! | `config` | Show the server config, export or import grid configs |
//!
//! # Example Usage
//!
//! ```bash
//! # Serve the tables listed in config.toml
//! tablegrid --config config.toml serve --bind 0.0.0.0:8080
//!
//! # Render page 2 of the users grid
//! tablegrid fetch --url http://127.0.0.1:8080/api/table --table users --page 2
//!
//! # Hand a grid config to a front end
//! tablegrid --config config.toml config export --table users --out users.json
//! ```

mod config;
mod fetch;
mod serve;

pub use config::{cmd_config_export, cmd_config_import, cmd_config_show, export_grid_config};
pub use fetch::{FetchOptions, OutputFormat, cmd_fetch, fetch_view};
pub use serve::{ServeOptions, build_app, cmd_serve};
