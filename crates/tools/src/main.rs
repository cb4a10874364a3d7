use anyhow::Result;
use clap::Parser;
use mapgen::floor::generate_floor;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for the run; omitted picks a time-derived seed here at the
    /// call site (the deterministic core never invents entropy)
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 20)]
    width: usize,
    #[arg(long, default_value_t = 15)]
    height: usize,
    /// Dump the generated floor as JSON instead of the summary report
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(runtime_seed);

    let floor = generate_floor(seed, args.width, args.height)
        .map_err(|e| anyhow::anyhow!("generation failed on seed {seed}: {e}"))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&floor.snapshot())?);
        return Ok(());
    }

    println!("Generation complete.");
    println!("Seed: {seed}");
    println!("Size: {}x{}", floor.width(), floor.height());
    println!("Rooms: {}", floor.rooms().len());
    println!("Placed Items: {}", floor.placed_items().count());
    println!("Snapshot Hash: {}", floor.snapshot_hash());
    Ok(())
}

fn runtime_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now_nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0_u128, |duration| duration.as_nanos());
    let pid = u64::from(std::process::id());
    let entropy = (now_nanos as u64) ^ ((now_nanos >> 64) as u64) ^ pid.rotate_left(17);
    mix_seed(entropy)
}

fn mix_seed(mut value: u64) -> u64 {
    value ^= value >> 30;
    value = value.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    value ^= value >> 27;
    value = value.wrapping_mul(0x94D0_49BB_1331_11EB);
    value ^ (value >> 31)
}
