use aro_network_validate::azure::AzCliClient;
use aro_network_validate::models::ResourceIdentifier;
use aro_network_validate::{read_cluster_config, AppConfig, Sources, Validator};
use std::error::Error;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default()).expect("Error initializing log4rs");
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let config = AppConfig::from_env()?;
    let cluster = read_cluster_config(&config.cluster_file)?;
    let vnet = ResourceIdentifier::vnet_of_subnet(&cluster.master_subnet_id)?;

    let client = Arc::new(AzCliClient::new(&vnet.subscription_id));
    let sources = Sources {
        permissions: client.clone(),
        networks: client.clone(),
        providers: client,
    };
    let validator = Validator::new(cluster, config.principal, sources)?;

    if let Err(e) = validator.validate_all().await {
        match e.as_validation() {
            Some(v) => {
                println!("{}", serde_json::to_string_pretty(&v.to_cloud_error())?);
                std::process::exit(1);
            }
            None => return Err(e.into()),
        }
    }
    println!("Network validation passed");
    Ok(())
}
