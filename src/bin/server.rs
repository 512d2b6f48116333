use common::cli::{init_logging, resolve_address, validate_address};
use common::database::{seed, sqlite::SQLiteConnection};
use common::endpoints::create_http_router;
use common::http::{HttpServer, Response};
use std::sync::{Arc, Mutex};

type BoxedError = Box<dyn std::error::Error>;

/// Local food service for development: `server [<host>:<port>] [<seed.json>]`
fn run() -> Result<(), BoxedError> {
    let mut address = None;
    let mut seed_file = None;
    for arg in std::env::args().skip(1) {
        if address.is_none() && validate_address(&arg).is_ok() {
            address = Some(arg);
        } else {
            seed_file = Some(arg);
        }
    }
    let address = resolve_address(address.as_deref())?;

    let mut db = SQLiteConnection::open_in_memory()?;
    if let Some(path) = seed_file {
        let count = seed(&mut db, &std::fs::read_to_string(&path)?)?;
        log::info!("Seeded {} foods from {}", count, path);
    }

    let router = Arc::new(create_http_router()?);
    let db = Arc::new(Mutex::new(db));
    let server = HttpServer::new(&address)?;
    log::info!("Serving foods on http://{}", server.local_addr()?);

    server.serve(move |request| match db.lock() {
        Ok(mut db) => router.respond(request, &mut *db),
        Err(_) => {
            log::error!("Database lock poisoned");
            Response::internal_server_error()
        }
    });
    Ok(())
}

fn main() {
    init_logging();

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}
