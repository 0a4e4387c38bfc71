use appstore_backend::infra::config::BackendConfig;
use appstore_backend::{AppConfig, AppService};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight -- [--create-index-if-missing]\n\
         \n\
         Requires env vars (BACKEND=remote, the default):\n\
           ES_URL, GCS_BUCKET, GCS_ACCESS_TOKEN, STRIPE_SECRET_KEY\n\
         Optional:\n\
           ES_USERNAME, ES_PASSWORD, ES_APP_INDEX, GCS_BASE_URL, STRIPE_BASE_URL,\n\
           STRIPE_CURRENCY, HTTP_TIMEOUT_SECS\n"
    );
    std::process::exit(2);
}

fn report(name: &str, result: &Result<(), String>) {
    match result {
        Ok(()) => println!("  {}: ok", name),
        Err(e) => println!("  {}: UNREACHABLE ({})", name, e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let create_index = args.iter().any(|a| a == "--create-index-if-missing");

    // Force-read config (nice error messages if missing)
    let config = AppConfig::from_env()?;

    println!("> Preflight:");
    println!("  APP_INDEX={}", config.app_index);
    println!("  HTTP_TIMEOUT={}s", config.http_timeout.as_secs());
    match &config.backends {
        BackendConfig::Memory => println!("  BACKEND=memory (nothing remote to check)"),
        BackendConfig::Remote {
            elasticsearch,
            gcs,
            stripe,
        } => {
            println!("  ES_URL={}", elasticsearch.url);
            println!("  GCS_BUCKET={} ({})", gcs.bucket, gcs.base_url);
            println!("  STRIPE_BASE_URL={} currency={}", stripe.base_url, stripe.currency);
        }
    }

    let service = AppService::from_config(&config)?;
    let health = service.health().await;
    println!("> Backends:");
    report("search index", &health.index);
    report("object store", &health.object_store);
    report("payment gateway", &health.payment_gateway);

    if !health.is_healthy() {
        return Err(anyhow::anyhow!("preflight failed: one or more backends are unreachable"));
    }

    if create_index {
        if service.ensure_index().await? {
            println!("> Created index '{}'.", service.collection());
        } else {
            println!("> Index '{}' already exists.", service.collection());
        }
    }

    println!("> Preflight OK.");
    Ok(())
}
