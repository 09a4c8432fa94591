// lifeledger CLI - record and verify life events against a local store
//
// Each command loads the ledger state from the sled store, performs one
// operation as the locally stored identity, saves, and prints the result.

use clap::{Parser, Subcommand};
use lifeledger::identity::{Did, Keypair};
use lifeledger::ledger::{Ledger, LedgerState};
use lifeledger::storage::LedgerStore;
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lifeledger")]
#[command(about = "Append-only life-event ledger with verifier attestation")]
struct Cli {
    /// Directory for the local ledger database
    #[arg(long, default_value = "./lifeledger-data")]
    data_dir: String,

    /// Act as a labeled identity instead of the primary one
    #[arg(long, global = true)]
    r#as: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the ledger; the local primary identity becomes the admin
    Init,
    /// Generate a labeled identity
    Keygen {
        /// Label for the new identity
        label: String,
    },
    /// Print the acting identity's DID
    Whoami,
    /// Record a new life event owned by the acting identity
    Record {
        /// Event classification, e.g. "birth" or "marriage"
        #[arg(long)]
        event_type: String,
        /// Free-text description
        #[arg(long)]
        description: String,
        /// Opaque reference to an external document
        #[arg(long, default_value = "")]
        document_ref: String,
    },
    /// Attest to an event as the acting identity
    Verify {
        /// Event id
        id: u64,
    },
    /// Show an identity's event ids in creation order
    Timeline {
        /// Owner DID (defaults to the acting identity)
        did: Option<String>,
    },
    /// Show full event details
    Get {
        /// Event id
        id: u64,
    },
    /// Enroll a verifier (admin only)
    AddVerifier {
        /// Verifier DID
        did: String,
    },
    /// Remove a verifier (admin only)
    RemoveVerifier {
        /// Verifier DID
        did: String,
    },
    /// Check whether an identity holds the verifier role
    IsVerifier {
        /// DID to check
        did: String,
    },
    /// Show aggregate ledger counts
    Stats,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let store = LedgerStore::open(&cli.data_dir)?;

    match cli.command {
        Commands::Init => {
            if store.load_state()?.is_some() {
                return Err("ledger already initialized".into());
            }
            let keypair = match store.load_keypair()? {
                Some(kp) => kp,
                None => {
                    let kp = Keypair::generate();
                    store.save_keypair(&kp)?;
                    kp
                }
            };
            let admin = Did::from_public_key(&keypair.public_key());
            store.save_state(&LedgerState::new(admin.clone()))?;
            store.flush()?;
            println!("Ledger created. Admin: {}", admin);
        }
        Commands::Keygen { label } => {
            if store.load_keypair_with_label(&label)?.is_some() {
                return Err(format!("identity '{}' already exists", label).into());
            }
            let kp = Keypair::generate();
            store.save_keypair_with_label(&kp, &label)?;
            store.flush()?;
            println!("{}", Did::from_public_key(&kp.public_key()));
        }
        Commands::Whoami => {
            let caller = acting_identity(&store, cli.r#as.as_deref())?;
            println!("{}", caller);
        }
        Commands::Record {
            event_type,
            description,
            document_ref,
        } => {
            let caller = acting_identity(&store, cli.r#as.as_deref())?;
            let ledger = open_ledger(&store)?;
            let mut rx = ledger.subscribe();
            let id = ledger.record_event(&caller, &event_type, &description, &document_ref)?;
            drain_notifications(&mut rx);
            persist(&store, &ledger)?;
            println!("Recorded event {}", id);
        }
        Commands::Verify { id } => {
            let caller = acting_identity(&store, cli.r#as.as_deref())?;
            let ledger = open_ledger(&store)?;
            let mut rx = ledger.subscribe();
            ledger.verify_event(&caller, id)?;
            drain_notifications(&mut rx);
            persist(&store, &ledger)?;
            println!("Event {} verified by {}", id, caller);
        }
        Commands::Timeline { did } => {
            let owner = match did {
                Some(s) => Did::parse(&s)?,
                None => acting_identity(&store, cli.r#as.as_deref())?,
            };
            let ledger = open_ledger(&store)?;
            let ids = ledger.timeline(&owner);
            if ids.is_empty() {
                println!("No events recorded by {}", owner);
            }
            for id in ids {
                let event = ledger.event(id)?;
                let status = if event.verified() { "verified" } else { "unverified" };
                println!(
                    "{}  {}  [{}]  {}  ({})",
                    event.id(),
                    event.created_at().to_rfc3339(),
                    event.event_type(),
                    event.description(),
                    status
                );
            }
        }
        Commands::Get { id } => {
            let ledger = open_ledger(&store)?;
            let event = ledger.event(id)?;
            println!("id:           {}", event.id());
            println!("owner:        {}", event.owner());
            println!("type:         {}", event.event_type());
            println!("description:  {}", event.description());
            println!("created:      {}", event.created_at().to_rfc3339());
            println!("verified:     {}", event.verified());
            match event.verifier() {
                Some(v) => println!("verifier:     {}", v),
                None => println!("verifier:     -"),
            }
            if !event.document_ref().is_empty() {
                println!("document:     {}", event.document_ref());
            }
        }
        Commands::AddVerifier { did } => {
            let caller = acting_identity(&store, cli.r#as.as_deref())?;
            let identity = Did::parse(&did)?;
            let ledger = open_ledger(&store)?;
            let mut rx = ledger.subscribe();
            ledger.add_verifier(&caller, &identity)?;
            drain_notifications(&mut rx);
            persist(&store, &ledger)?;
            println!("Verifier added: {}", identity);
        }
        Commands::RemoveVerifier { did } => {
            let caller = acting_identity(&store, cli.r#as.as_deref())?;
            let identity = Did::parse(&did)?;
            let ledger = open_ledger(&store)?;
            let mut rx = ledger.subscribe();
            ledger.remove_verifier(&caller, &identity)?;
            drain_notifications(&mut rx);
            persist(&store, &ledger)?;
            println!("Verifier removed: {}", identity);
        }
        Commands::IsVerifier { did } => {
            let identity = Did::parse(&did)?;
            let ledger = open_ledger(&store)?;
            println!("{}", ledger.is_verifier(&identity));
        }
        Commands::Stats => {
            let ledger = open_ledger(&store)?;
            let stats = ledger.stats();
            println!("admin:           {}", ledger.admin());
            println!("total events:    {}", stats.total_events);
            println!("verified events: {}", stats.verified_events);
            println!("unique owners:   {}", stats.unique_owners);
            println!("verifiers:       {}", stats.verifier_count);
            for verifier in ledger.verifiers() {
                println!("  {}", verifier);
            }
        }
    }

    Ok(())
}

/// Resolve the acting identity: a labeled keypair if `--as` was given,
/// otherwise the primary one.
fn acting_identity(store: &LedgerStore, label: Option<&str>) -> Result<Did, Box<dyn Error>> {
    let keypair = match label {
        Some(label) => store
            .load_keypair_with_label(label)?
            .ok_or_else(|| format!("no identity labeled '{}'; run keygen first", label))?,
        None => store
            .load_keypair()?
            .ok_or("no local identity; run init first")?,
    };
    Ok(Did::from_public_key(&keypair.public_key()))
}

fn open_ledger(store: &LedgerStore) -> Result<Ledger, Box<dyn Error>> {
    let state = store
        .load_state()?
        .ok_or("ledger not initialized; run init first")?;
    Ok(Ledger::from_state(state))
}

fn persist(store: &LedgerStore, ledger: &Ledger) -> Result<(), Box<dyn Error>> {
    store.save_state(&ledger.snapshot())?;
    store.flush()?;
    Ok(())
}

/// Log committed notifications to the audit trail
fn drain_notifications(rx: &mut tokio::sync::broadcast::Receiver<lifeledger::Notification>) {
    while let Ok(notification) = rx.try_recv() {
        info!(?notification, "ledger notification");
    }
}
