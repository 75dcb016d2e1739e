use fltk::{app, prelude::*};
use tracing_subscriber::EnvFilter;

use ferris_play::app::domain::{AppSettings, Message};
use ferris_play::app::state::AppState;
use ferris_play::ui::main_window::build_main_window;
use ferris_play::ui::menu::build_menu;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app = app::App::default();
    let (sender, receiver) = app::channel::<Message>();

    let settings = AppSettings::load();
    let mut widgets = build_main_window(&settings, &sender);
    build_menu(&mut widgets.menu, &sender, &settings);

    // Closing the window goes through the dispatch loop so the project is saved first
    widgets.wind.set_callback({
        let s = sender;
        move |_| {
            if app::event() == fltk::enums::Event::Close {
                s.send(Message::WindowClose);
            }
        }
    });
    widgets.wind.show();

    let mut state = AppState::new(widgets, sender, settings);
    state.start();

    while app.wait() {
        if let Some(msg) = receiver.recv()
            && state.handle(msg)
        {
            tracing::info!("Shutting down");
            app.quit();
        }
    }
}
