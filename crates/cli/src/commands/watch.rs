//! Live view of cart and like changes, including those made by other
//! sessions sharing the data directory.

use rooicell_storefront::AppState;
use rooicell_storefront::notify::EventKind;

/// Print a summary line on every change until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the Ctrl-C handler cannot be installed.
#[allow(clippy::print_stdout)]
pub async fn run(state: &AppState) -> Result<(), Box<dyn std::error::Error>> {
    let store = state.store().clone();
    let cart = state.store().subscribe(EventKind::CartChanged, move |_| {
        println!(
            "Корзина: {} поз., {} шт.",
            store.cart_line_count(),
            store.cart_total_quantity()
        );
    });

    let store = state.store().clone();
    let likes = state.store().subscribe(EventKind::LikesChanged, move |_| {
        println!("Избранное: {}", store.read_likes().len());
    });

    let handle = state.spawn_watch();
    tracing::info!(
        data_dir = %state.config().data_dir.display(),
        interval_ms = state.config().watch_interval.as_millis(),
        "Watching for changes, press Ctrl-C to stop"
    );

    let result = tokio::signal::ctrl_c().await;

    handle.stop();
    cart.unsubscribe();
    likes.unsubscribe();
    result?;
    Ok(())
}
