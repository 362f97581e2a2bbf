use clap::Args;

use erx_sync::models::CommunicationProfile;
use erx_sync::ErxTaskRepository;

/// Count unread messages and charge items
#[derive(Debug, Args)]
pub struct UnreadCommand {
    /// Communication profile to count (reply, dispense-request, ..., all)
    #[arg(long, default_value = "all")]
    profile: CommunicationProfile,
}

impl UnreadCommand {
    pub async fn run(&self, repo: &ErxTaskRepository) -> Result<(), Box<dyn std::error::Error>> {
        let count = repo
            .count_all_unread_communications_and_charge_items(self.profile)
            .await?;
        println!("{}", count);
        Ok(())
    }
}
