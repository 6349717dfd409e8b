use xeno::XenoClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let client = XenoClient::new(None)?;

    println!("Listing available models...");

    match client.models().list().await {
        Ok(models) => {
            for model in models.data {
                println!("{:<24} {}", model.id, model.owned_by);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}
