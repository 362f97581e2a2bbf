use clap::{Args, Subcommand};

use erx_sync::models::{Consent, ConsentCategory};
use erx_sync::ErxTaskRepository;

#[derive(Args)]
pub struct ConsentCommand {
    #[command(subcommand)]
    pub command: ConsentSubcommand,
}

#[derive(Subcommand)]
pub enum ConsentSubcommand {
    /// List consents granted on the server
    List,

    /// Grant a consent
    Grant {
        /// Consent category, e.g. CHARGCONS
        category: ConsentCategory,

        /// Insurance ID of the profile granting the consent
        #[arg(long)]
        insurance_id: String,
    },

    /// Revoke a consent
    Revoke {
        /// Consent category, e.g. CHARGCONS
        category: ConsentCategory,
    },
}

impl ConsentCommand {
    pub async fn run(&self, repo: &ErxTaskRepository) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConsentSubcommand::List => {
                let consents = repo.fetch_consents().await?;
                if consents.is_empty() {
                    println!("No consents granted");
                    return Ok(());
                }
                for consent in &consents {
                    println!(
                        "{:<12}  {:<12}  {}",
                        consent.category.to_string(),
                        consent.insurance_id,
                        consent.timestamp.as_deref().unwrap_or("-")
                    );
                }
                Ok(())
            }

            ConsentSubcommand::Grant {
                category,
                insurance_id,
            } => {
                let consent = Consent::new(category.clone(), insurance_id.clone());
                match repo.grant_consent(&consent).await? {
                    Some(granted) => println!(
                        "Granted consent {} ({})",
                        granted.category,
                        granted.identifier.as_deref().unwrap_or("-")
                    ),
                    None => println!("Granted consent {}", category),
                }
                Ok(())
            }

            ConsentSubcommand::Revoke { category } => {
                repo.revoke_consent(category).await?;
                println!("Revoked consent {}", category);
                Ok(())
            }
        }
    }
}
