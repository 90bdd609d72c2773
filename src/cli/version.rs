/// Display version information
pub fn execute() {
    println!("nft-catalog {}", env!("CARGO_PKG_VERSION"));
    println!("Operator CLI for the curated NFT collection catalog");
    println!("State schema v{}", nft_catalog::catalog::state::SCHEMA_VERSION);
}
