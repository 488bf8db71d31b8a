use std::path::PathBuf;

use swisscom_heatmaps::credentials::{CredentialLines, Credentials};
use swisscom_heatmaps::HeatmapsApi;

fn main() {
    let secrets = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("secrets/swisscom.txt"));
    let credentials = Credentials::from_file(&secrets, CredentialLines::default())
        .expect("Failed to read credentials");

    let mut api = HeatmapsApi::new(credentials);
    println!("api: {:?}", api);

    api.authenticate().expect("Failed to authenticate");

    let token = api.token().expect("no token");
    println!("token expires at: {:?}", token.expires_at);
}
