//! `myapp`: a demonstration application for the cmdtree crate.
//!
//! ```bash
//! myapp hello --message rust
//! echo text | myapp cmd cat --stderr
//! myapp help cmd
//! RUST_LOG=debug myapp cmd echo a b
//! ```

mod app;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let (tree, root) = app::build()?;
    tree.main(root)
}
