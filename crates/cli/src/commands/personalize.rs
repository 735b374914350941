//! Run the personalization chain for one customer and print the payload.

use shop_persona_proxy::config::PersonalizationDefaults;
use shop_persona_proxy::personalize::Personalizer;

use super::{Target, connect};

/// Print the personalization payload for `user_id` as JSON.
///
/// # Errors
///
/// Returns an error if configuration is missing, the id is invalid, the
/// customer does not exist or the upstream call fails.
#[allow(clippy::print_stdout)]
pub async fn run(target: &Target, user_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (client, session) = connect(target)?;
    let personalizer = Personalizer::new(client, PersonalizationDefaults::default());

    let result = personalizer.personalize(&session, Some(user_id)).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
