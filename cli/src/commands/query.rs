use colored::*;
use portgate_core::Gateway;

pub async fn status(gateway: &Gateway) -> anyhow::Result<()> {
    let username = gateway.user_name().await?;
    let password = gateway.password().await?;

    println!("Gateway:  {}", gateway.addr().to_string().bold());
    println!("Username: {username}");
    println!("Password: {password}");
    Ok(())
}

pub async fn external_ip(gateway: &Gateway) -> anyhow::Result<()> {
    let ip = gateway.external_ip().await?;
    println!("{ip}");
    Ok(())
}

pub async fn creds(gateway: &Gateway) -> anyhow::Result<()> {
    let username = gateway.user_name().await?;
    let password = gateway.password().await?;
    println!("{username}:{password}");
    Ok(())
}
