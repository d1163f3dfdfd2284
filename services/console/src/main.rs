use finapp_console::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("finapp error: {err}");
        std::process::exit(1);
    }
}
