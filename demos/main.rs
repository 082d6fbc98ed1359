// Copyright 2023 IPQualityScore LLC
use iploc::{Database, Variant};
use std::net::Ipv4Addr;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    //----------------------
    //--------- .dat -------
    let mut path_buf = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path_buf.push("resources/17monipdb.dat");

    let db = Database::open(&path_buf, Variant::Standard)?;
    let location = db.locate("8.8.8.8")?;
    println!("8.8.8.8 -> {}", location);

    // numeric lookups skip address parsing
    let ip = Ipv4Addr::new(114, 114, 114, 114);
    println!("{} -> {}", ip, db.locate_numeric(u32::from(ip))?);

    // Location implements serde::Serialize
    #[cfg(feature = "json")]
    {
        let serialized = serde_json::to_string_pretty(&location)?;
        println!("{}", serialized);
    }

    db.close();

    //----------------------
    //--------- .datx ------
    let mut path_buf = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path_buf.push("resources/17monipdb.datx");

    // the extension selects the extended layout
    let db = Database::open_inferred(&path_buf)?;
    let location = db.locate("8.8.8.8")?;
    for (n, field) in location.fields().enumerate() {
        println!("field {}: {}", n, field);
    }

    for entry in db.entries().take(5) {
        println!("{}", entry?);
    }

    Ok(())
}
