use actix_web::{dev::Server, web, App, HttpServer};
use std::future::Future;
use std::io;
use std::net::TcpListener;

use crate::{api, AppContext};

/// Seconds in-flight requests get to finish after a shutdown signal.
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

/// Start serving the webhook and health routes on `listener`. Signal handling
/// is left to [`serve_until`] so that SIGINT and SIGTERM both drain in-flight
/// requests.
pub fn run(listener: TcpListener, ctx: web::Data<AppContext>) -> io::Result<Server> {
    let server = HttpServer::new(move || {
        App::new()
            .wrap(tracing_actix_web::TracingLogger::default())
            .app_data(ctx.clone())
            .service(api::health::routes())
            .service(api::routes::routes())
    })
    .disable_signals()
    .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
    .listen(listener)?
    .run();

    Ok(server)
}

/// Serve until `shutdown` resolves, then stop accepting connections and wait
/// for in-flight requests up to the server's shutdown timeout.
pub async fn serve_until<F>(server: Server, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    let handle = server.handle();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => return result,
        _ = shutdown => {}
    }

    log::info!("Shutdown requested, draining connections");
    handle.stop(true).await;
    server.await
}

/// Resolves on the first SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => log::info!("SIGINT received"),
        _ = terminate => log::info!("SIGTERM received"),
    }
}
