//! Detect command implementation.

use packjar_archive::PackFormat;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn cmd_detect(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let f = File::open(file)?;
    let mut reader = BufReader::new(f);

    let (format, magic) = PackFormat::detect(&mut reader)?;

    println!("File: {}", file.display());
    println!("Format: {}", format);
    if !format.extension().is_empty() {
        println!("Extension: .{}", format.extension());
    }
    println!("MIME type: {}", format.mime_type());
    println!("Magic bytes: {:02X?}", &magic[..magic.len().min(16)]);

    match format {
        PackFormat::Xz => println!("Hint: run 'packjar inspect' to check the SIGN trailer"),
        PackFormat::Pack200 => println!("Hint: raw pack200 body, expand it with unpack200"),
        PackFormat::Jar => println!("Hint: run 'packjar list' to show its entries"),
        PackFormat::Unknown => {}
    }

    Ok(())
}
