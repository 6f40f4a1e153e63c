//! zonal - terminal walkthrough of the zone audio engine
//!
//! Walk an avatar along a strip of zones and watch debounce, fades and the
//! voice pools react. Run with: cargo run

mod app;
mod scene;
mod ui;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    app::run()
}
