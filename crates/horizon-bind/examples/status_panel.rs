//! A status panel whose markup follows a model.
//!
//! Run with `RUST_LOG=horizon_bind=debug` to watch the binder wire up.

use std::sync::Arc;

use horizon_bind::prelude::*;
use tracing_subscriber::EnvFilter;

const PANEL: &str = r#"<section class="panel" data-mcp-source="panel">
    <h2 data-mcp-target="=title">Loading</h2>
    <span class="badge state-unknown" data-mcp-target=".state"></span>
    <progress data-mcp-target="^progress"></progress>
    <input data-mcp-source="title"/>
</section>"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let model = Arc::new(Model::new());
    model.set_many([
        ("title", Value::from("Nightly build")),
        ("state", Value::from("queued")),
    ]);

    let view = BasicView::from_markup(PANEL, model.clone())?;
    let mut binder = view.bind("title")?;
    binder.add_targets("state")?;
    binder.add_targets("progress")?;

    println!("inputs: {}, targets: {}", binder.inputs().len(), binder.targets().len());
    println!("{}\n", view.html(view.el())?);

    for (state, progress) in [("running", 40), ("running", 80), ("passed", 100)] {
        model.set("state", state);
        model.set("progress", progress);
        println!("{}\n", view.html(view.el())?);
    }

    binder.destroy();
    model.set("title", "ignored after destroy");
    println!("{}", view.html(view.el())?);
    Ok(())
}
