//! Prints the bcrypt hash of a caller key, for use as `KEY_HASH`.
//!
//! Usage: `hash-key <caller-key>`

use anyhow::{bail, Result};

const COST: u32 = 10;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [key] = args.as_slice() else {
        bail!("need exactly one argument: the caller key to hash");
    };

    let hashed = bcrypt::hash(key, COST)?;
    println!("{}", hashed);
    Ok(())
}
