mod app;
mod models;
mod preload;
mod scene;
mod scroll;
mod ui;

use app::ArcspotApp;

fn main() {
    // Prefer C numeric locale up-front; GTK may later adjust locale again.
    std::env::set_var("LC_NUMERIC", "C");
    unsafe {
        libc::setlocale(libc::LC_NUMERIC, b"C\0".as_ptr().cast());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("arcspot=info".parse().unwrap()),
        )
        .init();

    let app = ArcspotApp::new();
    std::process::exit(app.run());
}
