//! Print "hello" as a RAW job on the default printer, then dump what the
//! spooler reports about that printer.
//!
//! Usage: RUST_LOG=crab_winspool=debug cargo run -p crab-winspool --example print_hello

#[cfg(windows)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use crab_winspool::PrintSpool;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crab_winspool=info".into()),
        )
        .init();

    let spool = PrintSpool::system();
    let name = spool.default_printer_name()?;
    let port = spool.printer_port(&name)?;
    tracing::info!(printer = %name, port = %port, "default printer");

    for printer in spool.list_printers()? {
        println!("{:<40} {}", printer.name, printer.port);
    }

    println!("media:       {:?}", spool.media_names(&name, &port)?);
    println!("sizes:       {:?}", spool.media_sizes(&name, &port)?);
    println!("ids:         {:?}", spool.media_ids(&name, &port)?);
    println!("resolutions: {:?}", spool.resolutions(&name, &port)?);
    let settings = spool.default_settings(&name, &port)?;
    println!("settings:    {}", serde_json::to_string(&settings)?);
    println!("flattened:   {:?}", settings.to_array());

    let mut printer = spool.open(&name)?;
    printer.start_document("test", "RAW")?;
    printer.start_page()?;
    let data = b"hello";
    let mut written = 0;
    while written < data.len() {
        match printer.write_bytes(&data[written..])? {
            0 => return Err("spooler accepted no bytes".into()),
            n => written += n,
        }
    }
    printer.end_page()?;
    printer.end_document()?;
    printer.close()?;

    println!("sent {written} bytes to {name}");
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("print_hello needs the Windows print spooler");
}
