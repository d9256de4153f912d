//! Service status command.

use console::style;

use degreepath_client::TutorClient;

/// Print a health summary for the Tutor Service.
pub async fn status(client: &TutorClient, json: bool) -> anyhow::Result<()> {
    match client.health().await {
        Ok(health) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&health)?);
                return Ok(());
            }

            let check_mark = |ok: bool| {
                if ok {
                    format!("{}", style("✓").green())
                } else {
                    format!("{}", style("✗").red())
                }
            };

            println!();
            println!(
                "  {} Tutor Service at {}",
                style("◆").cyan().bold(),
                style(client.base_url()).bold()
            );
            println!();
            println!(
                "  {} Service status: {}",
                check_mark(health.status == "healthy"),
                health.status
            );
            println!(
                "  {} AI backend: {}",
                check_mark(health.lm_studio),
                if health.lm_studio {
                    "LM Studio"
                } else {
                    "rule-based fallback"
                }
            );
            if let Some(part1) = &health.part1_api {
                println!("  {} Unit data API: {}", style("·").dim(), part1);
            }
            println!();
        }
        Err(err) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({ "status": "unreachable", "error": err.to_string() })
                );
            } else {
                println!();
                println!(
                    "  {} Tutor Service at {} is unreachable: {err}",
                    style("✗").red().bold(),
                    style(client.base_url()).bold()
                );
                println!();
            }
        }
    }
    Ok(())
}
