use super::App;
use anyhow::Result;
use chrono::Utc;

pub async fn patients(app: &App) -> Result<()> {
    let patients = app.api.my_patients().await?;
    if patients.is_empty() {
        println!("No linked patients. Ask a patient for a code and run `relive connect CODE`.");
    }
    for patient in patients {
        let relation = if patient.relation.is_empty() {
            String::new()
        } else {
            format!(" ({})", patient.relation)
        };
        println!("{:>6}  {}{}", patient.id, patient.display_name(), relation);
    }
    Ok(())
}

pub async fn connect(app: &App, code: &str) -> Result<()> {
    let patient = app.api.connect_with_code(code).await?;
    println!(
        "Connected to {}. Use --patient-id {} to add memories for them.",
        patient.display_name(),
        patient.id
    );
    Ok(())
}

/// Shows, issues, or revokes the patient's connect code.
pub async fn code(app: &App, new: bool, revoke: bool) -> Result<()> {
    if revoke {
        app.api.revoke_connect_code().await?;
        println!("Connect code revoked");
        return Ok(());
    }

    let code = if new {
        Some(app.api.create_connect_code().await?)
    } else {
        app.api.active_connect_code().await?
    };
    match code {
        Some(code) => {
            let minutes = (code.expires_at - Utc::now()).num_minutes().max(0);
            println!("{}  (expires in {} min)", code.code, minutes);
        }
        None => println!("No active code. Run `relive code --new` to issue one."),
    }
    Ok(())
}
