use crate::commands::list::print_snapshot;
use crate::core::{
    config::AppConfig,
    engine::{CheckoutRequest, Engine},
    error::Result,
    print_success,
};

pub async fn execute_checkout(
    config: &AppConfig,
    project: String,
    tag: Option<String>,
    branch: Option<String>,
) -> Result<()> {
    let engine = Engine::from_config(config);
    let request = CheckoutRequest {
        project,
        tag,
        branch,
    };

    let outcome = engine.checkout(request).await;
    engine.shutdown(true).await;
    let outcome = outcome?;

    print_success(&outcome.message);
    println!();
    print_snapshot(&outcome.snapshot);
    Ok(())
}
