use super::App;
use anyhow::Result;
use relive_application::AuthUseCase;
use relive_core::user::Role;

pub async fn login(app: &App, email: &str, password: &str) -> Result<()> {
    let auth = AuthUseCase::new(app.api.clone());
    auth.login(email, password).await?;
    let profile = auth.current_user().await?;
    println!("Logged in as {} ({})", profile.username, profile.role);
    Ok(())
}

pub async fn register(
    app: &App,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<()> {
    AuthUseCase::new(app.api.clone())
        .register(username, email, password, role)
        .await?;
    println!("Registered {} as {}", username, role);
    Ok(())
}

pub async fn whoami(app: &App) -> Result<()> {
    match AuthUseCase::new(app.api.clone()).restore().await? {
        Some(profile) => println!("{} ({})", profile.username, profile.role),
        None => println!("Not logged in. Run `relive login` first."),
    }
    Ok(())
}

pub async fn logout(app: &App) -> Result<()> {
    AuthUseCase::new(app.api.clone()).logout().await?;
    println!("Logged out");
    Ok(())
}
