// Identity module - Ed25519 keypairs and ledger DIDs

mod did;
mod keypair;

pub use did::*;
pub use keypair::*;
