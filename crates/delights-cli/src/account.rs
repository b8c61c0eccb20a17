//! Session command handlers: `login`, `signup`, `logout`, `status`.

use delights_api::{ErrorKind, NewAccount, RestaurantClient, SessionStore};

/// # Errors
///
/// Returns an error if the credentials are rejected or the service fails.
pub(crate) async fn run_login(
    client: &RestaurantClient,
    session: &SessionStore,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    client
        .login(session, email, password)
        .await
        .map_err(|e| anyhow::anyhow!(e.display_message()))?;
    println!("logged in as {}", email.trim());
    Ok(())
}

/// # Errors
///
/// Returns an error if registration is rejected or the service fails.
pub(crate) async fn run_signup(
    client: &RestaurantClient,
    session: &SessionStore,
    account: &NewAccount,
) -> anyhow::Result<()> {
    client
        .signup(session, account)
        .await
        .map_err(|e| anyhow::anyhow!(e.display_message()))?;
    println!("account created for {}", account.email.trim());
    Ok(())
}

/// # Errors
///
/// Returns an error if the session file cannot be written.
pub(crate) fn run_logout(session: &SessionStore) -> anyhow::Result<()> {
    session.clear()?;
    println!("logged out");
    Ok(())
}

/// Reports whether the stored credential is still accepted.
///
/// A rejected or missing session is a normal outcome and is printed, not
/// returned as an error.
///
/// # Errors
///
/// Returns an error for failures other than an unauthorized session.
pub(crate) async fn run_status(
    client: &RestaurantClient,
    session: &SessionStore,
) -> anyhow::Result<()> {
    match client.verify_session(session).await {
        Ok(()) => println!("logged in"),
        Err(e) if e.kind() == ErrorKind::Unauthorized => {
            println!("not logged in ({})", e.display_message());
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
