//! Provider settings command handlers.

use super::Session;
use super::commands::SettingsCommands;
use atelier::{AtelierResult, ImageSettings, JsonError};

/// Handle provider settings commands.
pub async fn handle_settings_command(session: &Session, cmd: SettingsCommands) -> AtelierResult<()> {
    match cmd {
        SettingsCommands::Show { json } => {
            let settings = session.workflow().load_settings().await?.redacted();
            if json {
                let text = serde_json::to_string_pretty(&settings)
                    .map_err(|e| JsonError::new(e.to_string()))?;
                println!("{}", text);
                return Ok(());
            }

            println!("LLM provider:   {}", settings.llm.provider);
            println!(
                "LLM key:        {}",
                settings.llm.api_key.as_deref().unwrap_or("(not set)")
            );
            println!("Image provider: {}", settings.image.provider_name());
            if let ImageSettings::AdobeFirefly {
                client_id, org_id, ..
            } = &settings.image
            {
                println!("Firefly client: {}", client_id);
                println!("Firefly org:    {}", org_id);
            }
            for (platform, credentials) in &settings.platforms {
                println!("{:<15} {}", format!("{}:", platform), credentials.username);
            }
        }
    }
    Ok(())
}
